pub mod admin_auth_service;
pub mod export_service;
pub mod mail_service;
pub mod masking_service;
pub mod metrics_service;
pub mod stats_service;
pub mod validation_service;
