use anyhow::Context;
use rand::Rng;

/// Runtime configuration, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct Config {
    /// `development` relaxes cookie security for plain-HTTP local runs
    pub environment: String,
    pub port: u16,
    /// HMAC key for session cookies
    pub session_secret: String,
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
    /// Argon2 memory cost in KiB; None keeps the library default
    pub password_memory_kib: Option<u32>,
    /// Argon2 iteration count; None keeps the library default
    pub password_iterations: Option<u32>,
}

impl Config {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is normal outside local development
        let _ = dotenvy::dotenv();

        let environment = env_var("ENVIRONMENT").unwrap_or_else(|| "production".to_string());

        let port = match env_var("PORT") {
            Some(p) => p.parse::<u16>().with_context(|| format!("invalid PORT {:?}", p))?,
            None => 8000,
        };

        let session_secret = match env_var("SESSION_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
                generate_secret()
            }
        };

        let allowed_origins = env_var("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:8000".to_string()]);

        let password_memory_kib = parse_optional("PASSWORD_MEMORY_KIB")?;
        let password_iterations = parse_optional("PASSWORD_ITERATIONS")?;

        Ok(Self {
            environment,
            port,
            session_secret,
            allowed_origins,
            password_memory_kib,
            password_iterations,
        })
    }

    pub fn is_development(&self) -> bool {
        matches!(
            self.environment.to_ascii_lowercase().as_str(),
            "development" | "dev"
        )
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_optional(name: &str) -> anyhow::Result<Option<u32>> {
    env_var(name)
        .map(|v| {
            v.parse::<u32>()
                .with_context(|| format!("invalid {} {:?}", name, v))
        })
        .transpose()
}

/// Random 64-character alphanumeric signing key
fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str) -> Config {
        Config {
            environment: environment.to_string(),
            port: 8000,
            session_secret: "secret".to_string(),
            allowed_origins: vec![],
            password_memory_kib: None,
            password_iterations: None,
        }
    }

    #[test]
    fn test_is_development() {
        assert!(config("development").is_development());
        assert!(config("Dev").is_development());
        assert!(!config("production").is_development());
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, generate_secret());
    }
}
