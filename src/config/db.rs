use crate::config::environment::AppConfig;

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

impl MongoConfig {
    pub fn from_app(app: &AppConfig) -> Option<Self> {
        let url = app.mongodb_url.clone()?;
        Some(Self {
            url,
            database: app
                .mongodb_database
                .clone()
                .unwrap_or_else(|| "resident_registry".to_string()),
        })
    }
}
