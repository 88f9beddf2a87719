use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_db_path() -> PathBuf {
    PathBuf::from("db").join("trans.sqlite3")
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file holding `t_translations`
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}
