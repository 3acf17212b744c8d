use super::error::AppError;
use super::model::PersonalRecord;
use super::schema::{
    CreatedRecordView, PaginationView, PublicStatsView, RecordListView, RecordView,
    SubmitRecordRequest,
};
use crate::app::AppState;
use crate::infra::RECORDS_COLLECTION;
use crate::service::mail_service;
use crate::service::masking_service::mask_mynumber;
use crate::service::metrics_service;
use crate::service::stats_service;
use crate::service::validation_service::parse_birthdate;
use chrono::{Datelike, Local, NaiveDate, Utc};
use mongodb::Collection;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Authoritative in-process store. The duplicate check and the insert run
/// under one lock, and the Mongo mirror carries a unique index on `mynumber`
/// whose write conflict is treated as the canonical duplicate error.
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: Mutex<RecordStoreInner>,
}

#[derive(Debug, Default)]
struct RecordStoreInner {
    records_by_id: HashMap<String, PersonalRecord>,
    id_by_mynumber: HashMap<String, String>,
    insertion_order: Vec<String>,
}

pub async fn submit_record(
    state: &AppState,
    req: SubmitRecordRequest,
    ip_address: String,
    user_agent: String,
) -> Result<CreatedRecordView, AppError> {
    // The validation pipeline ran before this point; the parse here only
    // converts the already-accepted wire value.
    let birthdate = parse_birthdate(&req.birthdate)
        .ok_or_else(|| AppError::bad_request("VALIDATION_FAILED", "生年月日は必須です"))?;

    let now = Utc::now().timestamp();
    let record = PersonalRecord {
        record_id: format!("rec-{}", Uuid::now_v7().simple()),
        name: req.name.trim().to_string(),
        birthdate,
        mynumber: req.mynumber.clone(),
        email: normalize_email(req.email),
        phone: normalize(req.phone),
        address: normalize(req.address),
        postal: normalize(req.postal),
        prefecture: normalize(req.prefecture),
        city: normalize(req.city),
        building: normalize(req.building),
        privacy: req.privacy,
        ip_address,
        user_agent,
        created_at: now,
    };

    {
        let mut inner = lock_store(&state.store)?;
        if inner.id_by_mynumber.contains_key(&record.mynumber) {
            return Err(AppError::bad_request(
                "DUPLICATE_MYNUMBER",
                "このマイナンバーは既に登録されています",
            ));
        }
        inner
            .id_by_mynumber
            .insert(record.mynumber.clone(), record.record_id.clone());
        inner
            .records_by_id
            .insert(record.record_id.clone(), record.clone());
        inner.insertion_order.push(record.record_id.clone());
    }

    if let Err(err) = persist_record(state, &record).await {
        remove_entry(state, &record.record_id)?;
        return Err(err);
    }

    metrics_service::inc_submissions_accepted();
    let view = to_view(&record, Local::now().date_naive());
    mail_service::dispatch_submission_notice(state.mailer.clone(), view);

    Ok(CreatedRecordView {
        id: record.record_id,
        name: record.name,
        created_at: record.created_at,
    })
}

pub fn list_records(state: &AppState, page: i64, limit: i64) -> Result<RecordListView, AppError> {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    let today = Local::now().date_naive();

    let snapshot = newest_first(state)?;
    let total = snapshot.len() as i64;
    // A page number past the data (or past i64 offset range) is an empty page,
    // never an arithmetic overflow.
    let start = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(limit))
        .map(|offset| offset as usize)
        .unwrap_or(usize::MAX);
    let users = snapshot
        .iter()
        .skip(start)
        .take(limit as usize)
        .map(|record| to_view(record, today))
        .collect();

    Ok(RecordListView {
        users,
        pagination: PaginationView {
            page,
            limit,
            total,
            pages: if total == 0 { 0 } else { (total + limit - 1) / limit },
        },
    })
}

pub fn list_all_views(state: &AppState) -> Result<Vec<RecordView>, AppError> {
    let today = Local::now().date_naive();
    Ok(newest_first(state)?
        .iter()
        .map(|record| to_view(record, today))
        .collect())
}

pub fn public_stats(state: &AppState) -> Result<PublicStatsView, AppError> {
    let stats = admin_stats(state)?;
    Ok(PublicStatsView {
        total: stats.total,
        today: stats.today,
    })
}

pub fn admin_stats(state: &AppState) -> Result<stats_service::StatsSnapshot, AppError> {
    let created_ats: Vec<i64> = {
        let inner = lock_store(&state.store)?;
        inner.records_by_id.values().map(|r| r.created_at).collect()
    };
    Ok(stats_service::compute(&created_ats, Local::now()))
}

pub async fn delete_record(state: &AppState, record_id: &str) -> Result<(), AppError> {
    let removed = {
        let mut inner = lock_store(&state.store)?;
        match inner.records_by_id.remove(record_id) {
            Some(record) => {
                inner.id_by_mynumber.remove(&record.mynumber);
                inner.insertion_order.retain(|id| id != record_id);
                true
            }
            None => false,
        }
    };
    if !removed {
        return Err(AppError::not_found(
            "RECORD_NOT_FOUND",
            "ユーザーが見つかりません",
        ));
    }

    if let Some(infra) = &state.infra {
        let collection: Collection<PersonalRecord> =
            infra.mongo_db.collection(RECORDS_COLLECTION);
        if let Err(e) = collection.delete_one(doc! { "record_id": record_id }).await {
            warn!(record_id = %record_id, error = %e, "mongodb delete failed; memory entry removed");
        }
    }

    metrics_service::inc_records_deleted();
    Ok(())
}

pub fn to_view(record: &PersonalRecord, today: NaiveDate) -> RecordView {
    RecordView {
        id: record.record_id.clone(),
        name: record.name.clone(),
        birthdate: record.birthdate.format("%Y-%m-%d").to_string(),
        age: compute_age(record.birthdate, today),
        mynumber: mask_mynumber(&record.mynumber),
        email: record.email.clone(),
        phone: record.phone.clone(),
        address: record.address.clone(),
        postal: record.postal.clone(),
        prefecture: record.prefecture.clone(),
        city: record.city.clone(),
        building: record.building.clone(),
        privacy: record.privacy,
        ip_address: record.ip_address.clone(),
        user_agent: record.user_agent.clone(),
        created_at: record.created_at,
    }
}

fn compute_age(birthdate: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = i64::from(today.year() - birthdate.year());
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}

fn newest_first(state: &AppState) -> Result<Vec<PersonalRecord>, AppError> {
    let inner = lock_store(&state.store)?;
    Ok(inner
        .insertion_order
        .iter()
        .rev()
        .filter_map(|id| inner.records_by_id.get(id).cloned())
        .collect())
}

fn remove_entry(state: &AppState, record_id: &str) -> Result<(), AppError> {
    let mut inner = lock_store(&state.store)?;
    if let Some(record) = inner.records_by_id.remove(record_id) {
        inner.id_by_mynumber.remove(&record.mynumber);
        inner.insertion_order.retain(|id| id != record_id);
    }
    Ok(())
}

async fn persist_record(state: &AppState, record: &PersonalRecord) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let collection: Collection<PersonalRecord> = infra.mongo_db.collection(RECORDS_COLLECTION);
    collection.insert_one(record).await.map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::bad_request("DUPLICATE_MYNUMBER", "このマイナンバーは既に登録されています")
        } else {
            AppError::internal("PERSISTENCE_ERROR", format!("mongodb insert failed: {e}"))
        }
    })?;
    Ok(())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

fn lock_store(store: &RecordStore) -> Result<MutexGuard<'_, RecordStoreInner>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_POISONED", "record store lock poisoned"))
}

fn normalize(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_email(field: Option<String>) -> Option<String> {
    normalize(field).map(|v| v.to_ascii_lowercase())
}
