use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub virustotal: VirusTotalConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

/// VirusTotal is disabled when no API key is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct VirusTotalConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_virustotal_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for VirusTotalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_virustotal_base_url(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Gemini is disabled when no API key is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_connections() -> u32 {
    10
}

fn default_expiry_hours() -> u64 {
    24 * 7
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_virustotal_base_url() -> String {
    "https://www.virustotal.com/api/v3".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    6 * 60 * 60
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "postgres://localhost/scamwatch")?
            .set_default("database.max_connections", 10)?
            .set_default("redis.url", "redis://localhost:6379")?
            .set_default("jwt.secret", "development-secret-change-in-production")?
            .set_default("jwt.expiry_hours", 24 * 7)?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.trim().is_empty() {
            anyhow::bail!("jwt.secret must not be empty");
        }
        if !matches!(self.log.format.as_str(), "pretty" | "json") {
            anyhow::bail!("log.format must be `pretty` or `json`, got `{}`", self.log.format);
        }
        Ok(())
    }

    pub fn virustotal_enabled(&self) -> bool {
        self.virustotal
            .api_key
            .as_deref()
            .map_or(false, |k| !k.trim().is_empty())
    }

    pub fn gemini_enabled(&self) -> bool {
        self.gemini
            .api_key
            .as_deref()
            .map_or(false, |k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_without_environment() {
        let config = Config::load().expect("defaults should deserialize");
        assert!(!config.jwt.secret.is_empty());
        assert!(config.database.max_connections > 0);
        assert_eq!(config.virustotal.base_url, "https://www.virustotal.com/api/v3");
    }

    #[test]
    fn blank_api_keys_disable_collaborators() {
        let mut config = Config::load().unwrap();
        config.virustotal.api_key = Some("   ".to_string());
        config.gemini.api_key = None;
        assert!(!config.virustotal_enabled());
        assert!(!config.gemini_enabled());

        config.gemini.api_key = Some("key".to_string());
        assert!(config.gemini_enabled());
    }
}
