use std::env;

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Supabase,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: BackendMode,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub jwt_secret: String,
    pub backend_timeout_secs: u64,
    /// Empty means every domain is accepted.
    pub allowed_email_domains: Vec<String>,
    pub oauth_provider: String,
    pub oauth_redirect_url: String,
    pub min_rental_days: i64,
    pub max_rental_days: i64,
    pub max_image_bytes: usize,
    pub max_request_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("BACKEND")
            .unwrap_or_else(|_| "supabase".to_string())
            .as_str()
        {
            "memory" => BackendMode::Memory,
            "supabase" => BackendMode::Supabase,
            other => anyhow::bail!("unknown BACKEND {other:?}, expected supabase or memory"),
        };

        let (supabase_url, supabase_anon_key) = match backend {
            BackendMode::Supabase => (
                env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?,
                env::var("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY is not set")?,
            ),
            BackendMode::Memory => (
                env::var("SUPABASE_URL").unwrap_or_else(|_| "http://localhost:54321".to_string()),
                env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            ),
        };
        let jwt_secret = env::var("SUPABASE_JWT_SECRET").context("SUPABASE_JWT_SECRET is not set")?;

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let allowed_email_domains = parse_domains(
            &env::var("ALLOWED_EMAIL_DOMAINS").unwrap_or_else(|_| "berkeley.edu".to_string()),
        );

        let config = Self {
            host,
            port,
            backend,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            jwt_secret,
            backend_timeout_secs: parse_or("BACKEND_TIMEOUT_SECS", 30),
            allowed_email_domains,
            oauth_provider: env::var("OAUTH_PROVIDER").unwrap_or_else(|_| "google".to_string()),
            oauth_redirect_url: env::var("OAUTH_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
            min_rental_days: parse_or("MIN_RENTAL_DAYS", 1),
            max_rental_days: parse_or("MAX_RENTAL_DAYS", 7),
            max_image_bytes: parse_or("MAX_IMAGE_BYTES", 10 * 1024 * 1024),
            max_request_bytes: parse_or("MAX_REQUEST_BYTES", 50 * 1024 * 1024),
        };

        if config.min_rental_days < 0 || config.min_rental_days > config.max_rental_days {
            anyhow::bail!(
                "invalid rental window: MIN_RENTAL_DAYS={} MAX_RENTAL_DAYS={}",
                config.min_rental_days,
                config.max_rental_days
            );
        }

        Ok(config)
    }

    /// Configuration for the in-memory backend, used by tests and local runs.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            backend: BackendMode::Memory,
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            jwt_secret: jwt_secret.into(),
            backend_timeout_secs: 30,
            allowed_email_domains: vec!["berkeley.edu".to_string()],
            oauth_provider: "google".to_string(),
            oauth_redirect_url: "http://localhost:3000/auth/callback".to_string(),
            min_rental_days: 1,
            max_rental_days: 7,
            max_image_bytes: 10 * 1024 * 1024,
            max_request_bytes: 50 * 1024 * 1024,
        }
    }

    pub fn email_allowed(&self, email: &str) -> bool {
        if self.allowed_email_domains.is_empty() {
            return true;
        }
        let email = email.to_ascii_lowercase();
        self.allowed_email_domains
            .iter()
            .any(|domain| email.ends_with(&format!("@{domain}")))
    }
}

fn parse_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().trim_start_matches('@').to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
