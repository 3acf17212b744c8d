use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub mongodb_url: Option<String>,
    pub mongodb_database: Option<String>,
    pub admin_password: String,
    pub admin_email: String,
    pub jwt_secret: String,
    pub admin_token_ttl_seconds: i64,
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
    pub mail_to: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            mongodb_url: env::var("MONGODB_URL").ok(),
            mongodb_database: env::var("MONGODB_DATABASE").ok(),
            admin_password: read_var("ADMIN_PASSWORD")?,
            admin_email: read_optional_string("ADMIN_EMAIL", "admin@example.com"),
            jwt_secret: read_var("JWT_SECRET")?,
            admin_token_ttl_seconds: read_optional_i64("ADMIN_TOKEN_TTL_SECONDS", 24 * 60 * 60)?,
            mail_relay_url: env::var("MAIL_RELAY_URL").ok(),
            mail_from: read_optional_string("MAIL_FROM", "noreply@example.com"),
            mail_to: read_optional_string("MAIL_TO", "admin@example.com"),
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_i64(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<i64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv_layers() {
    for path in [".env", "../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
