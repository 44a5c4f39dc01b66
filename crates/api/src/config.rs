use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    /// Operator notification on recorded RSVPs
    #[serde(default)]
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Take the client IP from X-Forwarded-For (only behind a trusted proxy)
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// RSVP submissions allowed per (ip, code) within the window. 0 disables.
    #[serde(default = "default_rsvp_max_attempts")]
    pub rsvp_max_attempts: u32,

    #[serde(default = "default_rsvp_window_secs")]
    pub rsvp_window_secs: u64,

    /// Admin logins allowed per (ip, username) within the window. 0 disables.
    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u32,

    #[serde(default = "default_login_window_secs")]
    pub login_window_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            trust_forwarded_for: false,
            rsvp_max_attempts: default_rsvp_max_attempts(),
            rsvp_window_secs: default_rsvp_window_secs(),
            login_max_attempts: default_login_max_attempts(),
            login_window_secs: default_login_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Session lifetime in seconds (default: 43200 = 12 hours)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    /// Account created on startup when no admin exists yet
    #[serde(default)]
    pub bootstrap_username: String,

    #[serde(default)]
    pub bootstrap_password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            bootstrap_username: String::new(),
            bootstrap_password: String::new(),
        }
    }
}

/// Operator email settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// console, smtp or sendgrid
    #[serde(default = "default_notification_provider")]
    pub provider: String,

    /// Tried when the primary provider fails
    #[serde(default)]
    pub fallback_provider: Option<String>,

    /// Where RSVP notices go
    #[serde(default)]
    pub notify_email: String,

    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Per-attempt delivery timeout in milliseconds
    #[serde(default = "default_notification_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_notification_provider(),
            fallback_provider: None,
            notify_email: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            sendgrid_api_key: String::new(),
            timeout_ms: default_notification_timeout_ms(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rsvp_max_attempts() -> u32 {
    10
}
fn default_rsvp_window_secs() -> u64 {
    600
}
fn default_login_max_attempts() -> u32 {
    5
}
fn default_login_window_secs() -> u64 {
    300
}
fn default_session_ttl() -> i64 {
    43200
}
fn default_notification_provider() -> String {
    "console".to_string()
}
fn default_sender_email() -> String {
    "noreply@example.com".to_string()
}
fn default_sender_name() -> String {
    "Wedding RSVP".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_notification_timeout_ms() -> u64 {
    10000
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RSVP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("RSVP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides, without
    /// touching the file system or environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            trust_forwarded_for = false
            rsvp_max_attempts = 10
            rsvp_window_secs = 600
            login_max_attempts = 5
            login_window_secs = 300

            [admin]
            session_ttl_secs = 43200

            [notification]
            enabled = false
            provider = "console"
            sender_email = "test@example.com"
            sender_name = "Test"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is skipped so tests can use partial configs
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.notification.enabled && self.notification.notify_email.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "notification.notify_email must be set when notifications are enabled".to_string(),
            ));
        }

        if self.admin.session_ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "admin.session_ttl_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
