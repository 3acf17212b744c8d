use crate::module::record::schema::{FieldErrorView, SubmitRecordRequest};
use chrono::NaiveDate;

/// Runs every field rule and collects all violations; an empty result means
/// the submission passes. Rules are independent of each other.
pub fn validate_submission(req: &SubmitRecordRequest, today: NaiveDate) -> Vec<FieldErrorView> {
    let mut errors = Vec::new();

    let name = req.name.trim();
    if name.is_empty() {
        push(&mut errors, "name", "お名前は必須です");
    } else if name.chars().count() < 2 {
        push(&mut errors, "name", "お名前は2文字以上で入力してください");
    } else if name.chars().count() > 100 {
        push(&mut errors, "name", "お名前は100文字以内で入力してください");
    }

    match parse_birthdate(&req.birthdate) {
        None => push(&mut errors, "birthdate", "生年月日は必須です"),
        Some(date) if date > today => {
            push(&mut errors, "birthdate", "未来の日付は入力できません");
        }
        Some(_) => {}
    }

    if !is_valid_mynumber(&req.mynumber) {
        push(
            &mut errors,
            "mynumber",
            "マイナンバーは12桁の数字で入力してください",
        );
    }

    if let Some(email) = non_empty(&req.email) {
        if !is_valid_email(email) {
            push(&mut errors, "email", "有効なメールアドレスを入力してください");
        }
    }

    if let Some(phone) = non_empty(&req.phone) {
        if !is_valid_phone(phone) {
            push(&mut errors, "phone", "有効な電話番号を入力してください");
        }
    }

    if !req.privacy {
        push(
            &mut errors,
            "privacy",
            "個人情報の取り扱いについて同意が必要です",
        );
    }

    errors
}

pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn is_valid_mynumber(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit())
}

// Permissive mailbox grammar: one '@', non-empty local part, domain with a
// dot-separated tld of at least two characters.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_valid_phone(value: &str) -> bool {
    (10..=15).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit() || b == b'-')
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn push(errors: &mut Vec<FieldErrorView>, field: &str, message: &str) {
    errors.push(FieldErrorView {
        field: field.to_string(),
        message: message.to_string(),
    });
}
