use crate::service::stats_service::StatsSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitRecordRequest {
    pub name: String,
    pub birthdate: String,
    pub mynumber: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub building: Option<String>,
    #[serde(default)]
    pub privacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldErrorView {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecordView {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRecordResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub errors: Option<Vec<FieldErrorView>>,
    pub data: Option<CreatedRecordView>,
}

/// Admin-facing record projection. `mynumber` is always masked and `age` is
/// derived from the birthdate at render time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: String,
    pub name: String,
    pub birthdate: String,
    pub age: i64,
    pub mynumber: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub building: Option<String>,
    pub privacy: bool,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationView {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListView {
    pub users: Vec<RecordView>,
    pub pagination: PaginationView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecordsResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub data: Option<RecordListView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicStatsView {
    pub total: i64,
    pub today: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicStatsResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub data: Option<PublicStatsView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatsResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub data: Option<StatsSnapshot>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRecordResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub data: Option<StatsSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub mongo_available: bool,
    pub mail_relay_configured: bool,
    pub metrics: HealthMetricsView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetricsView {
    pub submissions_accepted: u64,
    pub submissions_rejected: u64,
    pub records_deleted: u64,
    pub notifications_failed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
