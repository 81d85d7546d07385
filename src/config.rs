use serde::Deserialize;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Missing key is not fatal at startup; every generation fails instead.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When absent the key-value store lives in process memory.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub gemini: GeminiConfig,
    pub history_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = non_empty_var("DATABASE_URL");
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "stylesense".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "stylesense-users".into()),
            ttl_minutes: parsed_var("JWT_TTL_MINUTES").unwrap_or(60 * 24),
        };
        let gemini = GeminiConfig {
            api_key: non_empty_var("GEMINI_API_KEY"),
            model: non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            api_base: non_empty_var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.into()),
            timeout_secs: parsed_var("GEMINI_TIMEOUT_SECS").unwrap_or(120),
        };
        let history_limit = parsed_var("HISTORY_LIMIT").unwrap_or(50);

        if gemini.api_key.is_none() {
            tracing::error!("GEMINI_API_KEY is not defined in environment variables");
        }

        Ok(Self {
            database_url,
            jwt,
            gemini,
            history_limit,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}
