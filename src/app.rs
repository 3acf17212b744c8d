use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::record::crud::RecordStore;
use crate::module::record::route::register_routes;
use crate::service::mail_service::MailClient;
use axum::Router;
use axum::http::Method;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<RecordStore>,
    pub infra: Option<InfraClients>,
    pub mailer: Option<MailClient>,
}

impl AppState {
    pub fn new(config: AppConfig, infra: Option<InfraClients>) -> Self {
        let mailer = MailClient::from_config(&config);
        Self {
            config,
            store: Arc::new(RecordStore::default()),
            infra,
            mailer,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    register_routes(state).layer(cors)
}
