use super::crud;
use super::error::AppError;
use super::schema::{
    AdminStatsResponse, DeleteRecordResponse, HealthMetricsView, HealthResponse,
    ListQuery, ListRecordsResponse, LoginRequest, LoginResponse, MessageResponse,
    PublicStatsResponse, ReportResponse, SubmitRecordRequest, SubmitRecordResponse,
};
use crate::app::AppState;
use crate::service::admin_auth_service::{
    ADMIN_ROLE, AdminClaims, issue_admin_token, verify_admin_token, verify_password,
};
use crate::service::export_service;
use crate::service::mail_service;
use crate::service::metrics_service;
use crate::service::validation_service;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Local;
use tracing::{error, info};

pub async fn submit_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitRecordRequest>,
) -> impl IntoResponse {
    let started = metrics_service::start_timer();
    let today = Local::now().date_naive();

    let violations = validation_service::validate_submission(&req, today);
    if !violations.is_empty() {
        metrics_service::inc_submissions_rejected();
        error!(
            violation_count = violations.len(),
            elapsed_ms = metrics_service::elapsed_ms(started),
            "submission rejected by validation"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(SubmitRecordResponse {
                success: false,
                message: "バリデーションエラー".to_string(),
                error_code: Some("VALIDATION_FAILED".to_string()),
                errors: Some(violations),
                data: None,
            }),
        );
    }

    let ip_address = client_ip(&headers);
    let user_agent = client_user_agent(&headers);
    match crud::submit_record(&state, req, ip_address, user_agent).await {
        Ok(created) => {
            info!(
                record_id = %created.id,
                elapsed_ms = metrics_service::elapsed_ms(started),
                "submission accepted"
            );
            (
                StatusCode::CREATED,
                Json(SubmitRecordResponse {
                    success: true,
                    message: "データが正常に保存されました".to_string(),
                    error_code: None,
                    errors: None,
                    data: Some(created),
                }),
            )
        }
        Err(err) => {
            metrics_service::inc_submissions_rejected();
            error!(
                error_code = err.code,
                reason = %err.message,
                elapsed_ms = metrics_service::elapsed_ms(started),
                "submission rejected"
            );
            (
                err.status,
                Json(SubmitRecordResponse {
                    success: false,
                    message: public_message(&err),
                    error_code: Some(err.code.to_string()),
                    errors: None,
                    data: None,
                }),
            )
        }
    }
}

pub async fn public_stats(State(state): State<AppState>) -> impl IntoResponse {
    match crud::public_stats(&state) {
        Ok(stats) => (
            StatusCode::OK,
            Json(PublicStatsResponse {
                success: true,
                message: String::new(),
                error_code: None,
                data: Some(stats),
            }),
        ),
        Err(err) => {
            error!(error_code = err.code, reason = %err.message, "public stats failed");
            (
                err.status,
                Json(PublicStatsResponse {
                    success: false,
                    message: "統計情報の取得に失敗しました".to_string(),
                    error_code: Some(err.code.to_string()),
                    data: None,
                }),
            )
        }
    }
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) else {
        return error_login(AppError::bad_request(
            "AUTH_PASSWORD_REQUIRED",
            "パスワードが必要です",
        ));
    };

    if !verify_password(password, &state.config.admin_password) {
        return error_login(AppError::unauthorized(
            "AUTH_INCORRECT_PASSWORD",
            "パスワードが正しくありません",
        ));
    }

    match issue_admin_token(
        &state.config.admin_email,
        &state.config.jwt_secret,
        state.config.admin_token_ttl_seconds,
    ) {
        Ok((token, exp)) => {
            info!(expires_at = exp, "admin login succeeded");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    message: "ログインに成功しました".to_string(),
                    error_code: None,
                    token: Some(token),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "admin token issue failed");
            error_login(AppError::internal(
                "AUTH_TOKEN_ISSUE_FAILED",
                "ログイン処理中にエラーが発生しました",
            ))
        }
    }
}

pub async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    if let Err(err) = verify_admin(&state, &headers) {
        return error_list(err);
    }

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(crud::DEFAULT_PAGE_LIMIT);
    match crud::list_records(&state, page, limit) {
        Ok(listing) => (
            StatusCode::OK,
            Json(ListRecordsResponse {
                success: true,
                message: String::new(),
                error_code: None,
                data: Some(listing),
            }),
        ),
        Err(err) => error_list(err),
    }
}

pub async fn admin_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(err) = verify_admin(&state, &headers) {
        return error_stats(err);
    }

    match crud::admin_stats(&state) {
        Ok(stats) => (
            StatusCode::OK,
            Json(AdminStatsResponse {
                success: true,
                message: String::new(),
                error_code: None,
                data: Some(stats),
            }),
        ),
        Err(err) => error_stats(err),
    }
}

pub async fn delete_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> impl IntoResponse {
    if let Err(err) = verify_admin(&state, &headers) {
        return error_delete(err);
    }

    match crud::delete_record(&state, &record_id).await {
        Ok(()) => {
            info!(record_id = %record_id, "record deleted");
            (
                StatusCode::OK,
                Json(DeleteRecordResponse {
                    success: true,
                    message: "ユーザーデータを削除しました".to_string(),
                    error_code: None,
                }),
            )
        }
        Err(err) => error_delete(err),
    }
}

pub async fn export_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = verify_admin(&state, &headers) {
        return error_delete(err).into_response();
    }

    let views = match crud::list_all_views(&state) {
        Ok(v) => v,
        Err(err) => return error_delete(err).into_response(),
    };
    match export_service::records_to_csv(&views) {
        Ok(csv) => {
            let filename = format!("user_data_{}.csv", Local::now().format("%Y-%m-%d"));
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        "text/csv; charset=utf-8".to_string(),
                    ),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "csv export failed");
            error_delete(AppError::internal(
                "EXPORT_FAILED",
                "エクスポートに失敗しました",
            ))
            .into_response()
        }
    }
}

pub async fn send_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(err) = verify_admin(&state, &headers) {
        return error_report(err);
    }

    let stats = match crud::admin_stats(&state) {
        Ok(s) => s,
        Err(err) => return error_report(err),
    };
    let Some(mailer) = &state.mailer else {
        return error_report(AppError::internal(
            "MAIL_NOT_CONFIGURED",
            "メール送信が設定されていません",
        ));
    };

    let html = mail_service::render_report_email(&stats);
    match mailer.send("個人情報管理システム - 日次レポート", &html).await {
        Ok(()) => {
            info!(total = stats.total, "report email sent");
            (
                StatusCode::OK,
                Json(ReportResponse {
                    success: true,
                    message: "レポートメールを送信しました".to_string(),
                    error_code: None,
                    data: Some(stats),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "report email failed");
            error_report(AppError::internal(
                "MAIL_SEND_FAILED",
                "レポートメールの送信に失敗しました",
            ))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let m = metrics_service::snapshot();
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            mongo_available: state.infra.is_some(),
            mail_relay_configured: state.mailer.is_some(),
            metrics: HealthMetricsView {
                submissions_accepted: m.submissions_accepted,
                submissions_rejected: m.submissions_rejected,
                records_deleted: m.records_deleted,
                notifications_failed: m.notifications_failed,
            },
        }),
    )
}

pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse {
            success: false,
            message: "Route not found".to_string(),
        }),
    )
}

fn verify_admin(state: &AppState, headers: &HeaderMap) -> Result<AdminClaims, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::unauthorized("AUTH_TOKEN_REQUIRED", "認証トークンが必要です"))?;

    let claims = verify_admin_token(token, &state.config.jwt_secret)
        .map_err(|_| AppError::unauthorized("AUTH_INVALID_TOKEN", "無効なトークンです"))?;
    if claims.role != ADMIN_ROLE {
        return Err(AppError::forbidden(
            "AUTH_ROLE_REQUIRED",
            "管理者権限が必要です",
        ));
    }
    Ok(claims)
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("unknown")
        .to_string()
}

fn client_user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

// Internal store errors keep their real text in the log only; the client sees
// a generic message.
fn public_message(err: &AppError) -> String {
    if err.status == StatusCode::INTERNAL_SERVER_ERROR {
        "サーバーエラーが発生しました".to_string()
    } else {
        err.message.clone()
    }
}

fn error_login(err: AppError) -> (StatusCode, Json<LoginResponse>) {
    error!(error_code = err.code, reason = %err.message, "admin login rejected");
    (
        err.status,
        Json(LoginResponse {
            success: false,
            message: public_message(&err),
            error_code: Some(err.code.to_string()),
            token: None,
        }),
    )
}

fn error_list(err: AppError) -> (StatusCode, Json<ListRecordsResponse>) {
    error!(error_code = err.code, reason = %err.message, "record listing rejected");
    (
        err.status,
        Json(ListRecordsResponse {
            success: false,
            message: public_message(&err),
            error_code: Some(err.code.to_string()),
            data: None,
        }),
    )
}

fn error_stats(err: AppError) -> (StatusCode, Json<AdminStatsResponse>) {
    error!(error_code = err.code, reason = %err.message, "admin stats rejected");
    (
        err.status,
        Json(AdminStatsResponse {
            success: false,
            message: public_message(&err),
            error_code: Some(err.code.to_string()),
            data: None,
        }),
    )
}

fn error_delete(err: AppError) -> (StatusCode, Json<DeleteRecordResponse>) {
    error!(error_code = err.code, reason = %err.message, "admin record operation rejected");
    (
        err.status,
        Json(DeleteRecordResponse {
            success: false,
            message: public_message(&err),
            error_code: Some(err.code.to_string()),
        }),
    )
}

fn error_report(err: AppError) -> (StatusCode, Json<ReportResponse>) {
    error!(error_code = err.code, reason = %err.message, "report email rejected");
    (
        err.status,
        Json(ReportResponse {
            success: false,
            message: public_message(&err),
            error_code: Some(err.code.to_string()),
            data: None,
        }),
    )
}
