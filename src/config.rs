use dotenvy::dotenv;
use std::env;

/// Runtime settings, loaded from the environment with defaults that suit a
/// single-school deployment.
#[derive(Clone, Debug)]
pub struct Config {
    /// Store collection holding the leave requests.
    pub leave_collection: String,
    /// When set, logs also go to a daily-rolling file under this directory.
    pub log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            leave_collection: env::var("LEAVE_COLLECTION")
                .unwrap_or_else(|_| "leave_requests".to_string()),
            log_dir: env::var("LOG_DIR").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leave_collection: "leave_requests".to_string(),
            log_dir: None,
        }
    }
}
