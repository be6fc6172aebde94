use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgConnectOptions;

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/chat";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration, built once at startup and handed to each
/// component's constructor.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub auth: AuthSettings,
    pub upload_dir: PathBuf,
    /// External command used to pull text out of legacy `.doc` files.
    pub doc_extractor: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Either a full `DATABASE_URL` or the discrete `DB_*` parts.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Primary provider is skipped entirely when unset.
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let database = DatabaseSettings {
            url: get("DATABASE_URL"),
            host: get("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or("DB_PORT", get("DB_PORT"), 5432)?,
            user: get("DB_USER").unwrap_or_else(|| "postgres".to_string()),
            password: get("DB_PASSWORD").unwrap_or_default(),
            name: get("DB_NAME").unwrap_or_else(|| "iacmt".to_string()),
        };

        let llm = LlmSettings {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_api_url: get("OPENAI_API_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            request_timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                120,
            )?),
        };

        let auth = AuthSettings {
            jwt_secret: require("JWT_SECRET")?,
            token_ttl: parse_ttl(&get("JWT_EXPIRES_IN").unwrap_or_else(|| "1d".to_string()))
                .context("JWT_EXPIRES_IN must look like 30m, 12h or 1d")?,
        };

        Ok(Config {
            database,
            llm,
            auth,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            doc_extractor: get("DOC_EXTRACTOR").unwrap_or_else(|| "antiword".to_string()),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            port: parse_or("PORT", get("PORT"), 3000)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url
                .parse::<PgConnectOptions>()
                .context("DATABASE_URL is not a valid Postgres URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

/// Parses `<n>[smhd]` (a bare number means seconds).
fn parse_ttl(raw: &str) -> Result<chrono::Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], c),
        _ => (raw, 's'),
    };
    let amount: i64 = digits.parse().context("TTL amount is not a number")?;
    if amount <= 0 {
        bail!("TTL must be positive");
    }
    match unit {
        's' => Ok(chrono::Duration::seconds(amount)),
        'm' => Ok(chrono::Duration::minutes(amount)),
        'h' => Ok(chrono::Duration::hours(amount)),
        'd' => Ok(chrono::Duration::days(amount)),
        other => bail!("unknown TTL unit '{other}'"),
    }
}
