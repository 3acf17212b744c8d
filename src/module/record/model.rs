use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One natural-person submission. Created once, deleted at most once, never
/// updated. `mynumber` is held unmasked here; every read boundary masks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub record_id: String,
    pub name: String,
    pub birthdate: NaiveDate,
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
