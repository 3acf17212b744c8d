use crate::app::AppState;
use crate::module::record::crud;
use crate::module::record::schema::SubmitRecordRequest;
use crate::service::admin_auth_service::verify_password;
use crate::service::validation_service;
use chrono::Local;
use serde_json::json;
use std::collections::HashMap;
use tracing::error;

/// Serverless deployment variant: one function handles CORS preflight, public
/// submission and the password-in-query admin listing. It is a thin
/// translation layer over the same crud calls as the HTTP router.
#[derive(Debug, Clone, Default)]
pub struct FunctionEvent {
    pub http_method: String,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub async fn handle_event(state: &AppState, event: FunctionEvent) -> FunctionResponse {
    match event.http_method.to_ascii_uppercase().as_str() {
        "OPTIONS" => respond(200, String::new()),
        "POST" => handle_submit(state, event).await,
        "GET" => handle_admin_list(state, &event),
        _ => respond(405, error_body("Method not allowed")),
    }
}

async fn handle_submit(state: &AppState, event: FunctionEvent) -> FunctionResponse {
    let Some(body) = event.body.as_deref() else {
        return respond(400, error_body("必須項目が不足しています"));
    };
    let req: SubmitRecordRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(_) => return respond(400, error_body("必須項目が不足しています")),
    };

    let violations = validation_service::validate_submission(&req, Local::now().date_naive());
    if let Some(first) = violations.first() {
        return respond(400, error_body(&first.message));
    }

    let ip_address = event.source_ip.unwrap_or_else(|| "unknown".to_string());
    let user_agent = event.user_agent.unwrap_or_else(|| "unknown".to_string());
    match crud::submit_record(state, req, ip_address, user_agent).await {
        Ok(created) => respond(
            200,
            json!({ "message": "データが正常に保存されました", "id": created.id }).to_string(),
        ),
        Err(err) if err.status.is_client_error() => respond(400, error_body(&err.message)),
        Err(err) => {
            error!(error_code = err.code, reason = %err.message, "function submit failed");
            respond(500, error_body("Internal server error"))
        }
    }
}

fn handle_admin_list(state: &AppState, event: &FunctionEvent) -> FunctionResponse {
    let supplied = event.query.get("password").map(String::as_str).unwrap_or("");
    if !verify_password(supplied, &state.config.admin_password) {
        return respond(401, error_body("認証に失敗しました"));
    }

    match crud::list_all_views(state) {
        Ok(views) => {
            let total = views.len();
            respond(200, json!({ "data": views, "total": total }).to_string())
        }
        Err(err) => {
            error!(error_code = err.code, reason = %err.message, "function listing failed");
            respond(500, error_body("Internal server error"))
        }
    }
}

fn respond(status_code: u16, body: String) -> FunctionResponse {
    FunctionResponse {
        status_code,
        headers: cors_headers(),
        body,
    }
}

fn error_body(message: &str) -> String {
    json!({ "error": message }).to_string()
}

fn cors_headers() -> Vec<(String, String)> {
    vec![
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        (
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type".to_string(),
        ),
        (
            "Access-Control-Allow-Methods".to_string(),
            "POST, GET, OPTIONS".to_string(),
        ),
    ]
}
