// src/utils/env.rs
use log::{debug, info};

/// Loads variables from a `.env` file if one is present. Variables already
/// set in the environment win.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}
