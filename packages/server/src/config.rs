use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Key material for credential encryption at rest.
#[derive(Debug, Deserialize, Clone)]
pub struct CryptoConfig {
    /// Base64-encoded 32-byte AES-256 key.
    pub secrets_key: String,
}

/// Outbound probe settings. Base URLs are overridable so tests can point
/// the probes at a local stub server.
#[derive(Debug, Deserialize, Clone)]
pub struct ProbesConfig {
    pub timeout_secs: u64,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub deepgram_base_url: String,
    pub gemini_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub crypto: CryptoConfig,
    pub probes: ProbesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("probes.timeout_secs", 10)?
            .set_default("probes.openai_base_url", "https://api.openai.com")?
            .set_default("probes.anthropic_base_url", "https://api.anthropic.com")?
            .set_default("probes.deepgram_base_url", "https://api.deepgram.com")?
            .set_default(
                "probes.gemini_base_url",
                "https://generativelanguage.googleapis.com",
            )?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SWITCHBOARD__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SWITCHBOARD").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
