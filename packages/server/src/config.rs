use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables.
///
/// Both flags default to `false`, matching a locked-down deployment; an
/// operator opts into category validation and open registration explicitly.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// When set, `CreateGroup` enforces the category-count bounds.
    pub categories_active: bool,
    /// When set, anyone may sign up without an invite.
    pub public_registration: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenv();

        Self {
            categories_active: env_flag("CATEGORIES_ACTIVE"),
            public_registration: env_flag("PUBLIC_REGISTRATION"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}
