//! Shallow record comparison

use crate::model::{display_value, Record};

/// Describe how `new` differs from `old`, one line per top-level key.
///
/// Keys of `old` are visited first (removed or changed), then keys only found
/// in `new` (added), each in the record's own order. Nested values are not
/// descended into: a changed list or object shows up as a single line.
pub fn diff(old: &Record, new: &Record) -> Vec<String> {
    let mut changes = Vec::new();

    for (key, old_value) in old {
        match new.get(key) {
            None => changes.push(format!(
                "Removed key: {}, value was {}",
                key,
                display_value(old_value)
            )),
            Some(new_value) if new_value != old_value => changes.push(format!(
                "Changed key: {}, from {} to {}",
                key,
                display_value(old_value),
                display_value(new_value)
            )),
            Some(_) => {}
        }
    }

    for (key, new_value) in new {
        if !old.contains_key(key) {
            changes.push(format!(
                "Added key: {}, value is {}",
                key,
                display_value(new_value)
            ));
        }
    }

    changes
}
