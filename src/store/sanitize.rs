//! Filesystem-safe names

/// Characters that are rejected in path segments on common filesystems
pub const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replacement used by [`sanitize`]
pub const DEFAULT_REPLACEMENT: &str = "#";

/// Replace every forbidden character in `name` with `#`
pub fn sanitize(name: &str) -> String {
    sanitize_with(name, DEFAULT_REPLACEMENT)
}

/// Replace every forbidden character in `name` with `replacement`
///
/// Idempotent as long as `replacement` contains no forbidden character.
pub fn sanitize_with(name: &str, replacement: &str) -> String {
    name.replace(FORBIDDEN_CHARS, replacement)
}
