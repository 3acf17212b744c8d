use crate::config::environment::AppConfig;
use crate::module::record::schema::RecordView;
use crate::service::stats_service::StatsSnapshot;
use chrono::Local;
use serde_json::json;
use tracing::{error, info};

/// HTTP mail-relay client. The relay owns SMTP delivery; this side only posts
/// `{from, to, subject, html}` and treats any non-success as a send failure.
#[derive(Debug, Clone)]
pub struct MailClient {
    http: reqwest::Client,
    relay_url: String,
    from: String,
    to: String,
}

impl MailClient {
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let relay_url = config.mail_relay_url.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            relay_url,
            from: config.mail_from.clone(),
            to: config.mail_to.clone(),
        })
    }

    pub async fn send(&self, subject: &str, html: &str) -> Result<(), String> {
        let response = self
            .http
            .post(&self.relay_url)
            .json(&json!({
                "from": self.from,
                "to": self.to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| format!("mail relay request failed: {e}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("mail relay returned status {}", status.as_u16()));
        }
        Ok(())
    }
}

/// Fire-and-forget submission alert. Failures are logged and never reach the
/// submission response.
pub fn dispatch_submission_notice(mailer: Option<MailClient>, record: RecordView) {
    let Some(mailer) = mailer else {
        info!(record_id = %record.id, "mail relay not configured; notification skipped");
        return;
    };
    tokio::spawn(async move {
        let html = render_submission_email(&record);
        match mailer.send("新しい個人情報が登録されました", &html).await {
            Ok(()) => info!(record_id = %record.id, "notification email sent"),
            Err(e) => {
                crate::service::metrics_service::inc_notifications_failed();
                error!(record_id = %record.id, error = %e, "notification email failed");
            }
        }
    });
}

/// Pure rendering. The record view arrives with the mynumber already masked;
/// this function never sees the unmasked value.
pub fn render_submission_email(record: &RecordView) -> String {
    let registered_at = Local::now().format("%Y/%m/%d %H:%M:%S");
    let mut rows = String::new();
    info_row(&mut rows, "お名前", &record.name);
    info_row(&mut rows, "生年月日", &record.birthdate);
    info_row(&mut rows, "マイナンバー", &record.mynumber);
    if let Some(email) = &record.email {
        info_row(&mut rows, "メールアドレス", email);
    }
    if let Some(phone) = &record.phone {
        info_row(&mut rows, "電話番号", phone);
    }
    if let Some(address) = &record.address {
        info_row(&mut rows, "住所", address);
    }

    let mut system_rows = String::new();
    info_row(&mut system_rows, "IPアドレス", &record.ip_address);
    info_row(&mut system_rows, "ユーザーエージェント", &record.user_agent);

    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="UTF-8">
<title>新しい個人情報登録</title>
<style>
body {{ font-family: 'Hiragino Kaku Gothic ProN', 'Yu Gothic', 'Meiryo', sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
.header {{ background-color: #8B4513; color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
.content {{ background-color: #f9f9f9; padding: 20px; border-radius: 0 0 8px 8px; }}
.info-row {{ display: flex; margin-bottom: 10px; border-bottom: 1px solid #eee; padding-bottom: 10px; }}
.label {{ font-weight: bold; width: 120px; color: #8B4513; }}
.value {{ flex: 1; }}
.alert {{ background-color: #fff3cd; border: 1px solid #ffeaa7; color: #856404; padding: 10px; border-radius: 4px; margin: 10px 0; }}
.footer {{ margin-top: 20px; padding-top: 20px; border-top: 2px solid #8B4513; font-size: 0.9em; color: #666; }}
</style>
</head>
<body>
<div class="header">
<h1>新しい個人情報が登録されました</h1>
<p>登録日時: {registered_at}</p>
</div>
<div class="content">
<div class="alert"><strong>注意:</strong> このメールには個人情報が含まれています。適切に管理してください。</div>
<h2>登録者情報</h2>
{rows}
<h3>システム情報</h3>
{system_rows}
<div class="footer">
<p>このメールは個人情報管理システムから自動送信されました。</p>
<p>ご不明な点がございましたら、システム管理者までお問い合わせください。</p>
</div>
</div>
</body>
</html>
"#
    )
}

pub fn render_report_email(stats: &StatsSnapshot) -> String {
    let report_date = Local::now().format("%Y/%m/%d");
    let cards = [
        (stats.total, "総登録数"),
        (stats.today, "今日の登録"),
        (stats.last7_days, "過去7日間"),
        (stats.last30_days, "過去30日間"),
    ]
    .iter()
    .map(|(number, label)| {
        format!(
            r#"<div class="stat-card"><div class="stat-number">{number}</div><div class="stat-label">{label}</div></div>"#
        )
    })
    .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="UTF-8">
<title>日次レポート</title>
<style>
body {{ font-family: 'Hiragino Kaku Gothic ProN', 'Yu Gothic', 'Meiryo', sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
.header {{ background-color: #8B4513; color: white; padding: 20px; text-align: center; border-radius: 8px 8px 0 0; }}
.content {{ background-color: #f9f9f9; padding: 20px; border-radius: 0 0 8px 8px; }}
.stats-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 15px; margin: 20px 0; }}
.stat-card {{ background-color: white; padding: 15px; border-radius: 8px; text-align: center; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }}
.stat-number {{ font-size: 2em; font-weight: bold; color: #8B4513; }}
.stat-label {{ font-size: 0.9em; color: #666; margin-top: 5px; }}
</style>
</head>
<body>
<div class="header">
<h1>個人情報管理システム - 日次レポート</h1>
<p>{report_date}</p>
</div>
<div class="content">
<h2>統計情報</h2>
<div class="stats-grid">{cards}</div>
<p>システムは正常に動作しています。</p>
</div>
</body>
</html>
"#
    )
}

fn info_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        r#"<div class="info-row"><div class="label">{label}:</div><div class="value">{value}</div></div>
"#
    ));
}
