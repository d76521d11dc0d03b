//! Collection configuration

use std::path::PathBuf;

/// Data directory used when none is given
pub const DEFAULT_DATA_DIR: &str = "data";

/// Configuration for a collection run
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Root of the snapshot tree; one subdirectory per user
    pub data_dir: PathBuf,

    /// Users to collect, in order
    pub user_ids: Vec<String>,
}

impl CollectConfig {
    /// Create a configuration with no users
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            user_ids: Vec::new(),
        }
    }

    /// Set the users to collect
    pub fn with_users(mut self, user_ids: Vec<String>) -> Self {
        self.user_ids = user_ids;
        self
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_DATA_DIR))
    }
}
