//! Application configuration

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Database
    pub database_url: String,

    // Redis (session store)
    pub redis_url: String,

    // Sessions
    pub session_secret: String,
    pub session_ttl_seconds: u64,

    // Feature flags
    pub enable_signup: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,

            // Redis
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            // Sessions
            session_secret: {
                let secret = env::var("SESSION_SECRET")
                    .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
                // Cookie signatures are only as strong as this key
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "SESSION_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },
            session_ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap_or(600),

            // Feature flags
            enable_signup: env::var("ENABLE_SIGNUP")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure config tests run serially (they modify shared env vars)
    static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set required env vars for testing
    fn setup_minimal_config() {
        env::set_var("DATABASE_URL", "postgres://test");
        // Must be at least 32 characters
        env::set_var(
            "SESSION_SECRET",
            "test-session-secret-at-least-32-chars",
        );
    }

    /// Helper to clear env vars after tests
    fn cleanup_config() {
        env::remove_var("DATABASE_URL");
        env::remove_var("SESSION_SECRET");
        env::remove_var("SESSION_TTL_SECONDS");
        env::remove_var("ENABLE_SIGNUP");
    }

    /// Combined session secret validation tests - runs serially to avoid env var races
    #[test]
    fn test_session_secret_validation() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();

        // === Test 1: Missing secret ===
        cleanup_config();
        env::set_var("DATABASE_URL", "postgres://test");

        let result = Config::from_env();
        assert!(result.is_err(), "Missing SESSION_SECRET should fail");
        match result {
            Err(ConfigError::Missing("SESSION_SECRET")) => {}
            other => panic!("Expected Missing error for SESSION_SECRET, got: {:?}", other),
        }

        // === Test 2: Short secret rejected ===
        env::set_var("SESSION_SECRET", "too-short");
        let result = Config::from_env();
        assert!(result.is_err(), "Short secret should be rejected");
        assert!(
            matches!(result, Err(ConfigError::WeakSecret(_))),
            "Short secret should return WeakSecret error"
        );

        // === Test 3: Valid configuration with defaults ===
        setup_minimal_config();
        let config = Config::from_env().expect("Valid config should load");
        assert_eq!(config.session_ttl_seconds, 600);
        assert!(config.enable_signup);
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.bind_address, "0.0.0.0:8080");

        // === Test 4: Overrides are honored ===
        env::set_var("SESSION_TTL_SECONDS", "60");
        env::set_var("ENABLE_SIGNUP", "false");
        let config = Config::from_env().expect("Valid config should load");
        assert_eq!(config.session_ttl_seconds, 60);
        assert!(!config.enable_signup);

        // === Test 5: Unparseable TTL falls back to the default ===
        env::set_var("SESSION_TTL_SECONDS", "not-a-number");
        let config = Config::from_env().expect("Valid config should load");
        assert_eq!(config.session_ttl_seconds, 600);

        cleanup_config();
    }

    /// Missing DATABASE_URL is a hard error
    #[test]
    fn test_database_url_required() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();

        cleanup_config();
        env::set_var(
            "SESSION_SECRET",
            "test-session-secret-at-least-32-chars",
        );

        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));

        cleanup_config();
    }
}
