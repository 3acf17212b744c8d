use crate::module::record::schema::RecordView;
use chrono::{Local, TimeZone};

const EXPORT_HEADERS: [&str; 8] = [
    "お名前",
    "生年月日",
    "マイナンバー",
    "メールアドレス",
    "電話番号",
    "都道府県",
    "市区町村",
    "登録日時",
];

/// Builds the admin CSV export from already-masked record views. Every field
/// is quoted and embedded quotes are escaped by the writer.
pub fn records_to_csv(records: &[RecordView]) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| format!("csv header write failed: {e}"))?;
    for record in records {
        let registered_at = format_registered_at(record.created_at);
        writer
            .write_record([
                record.name.as_str(),
                record.birthdate.as_str(),
                record.mynumber.as_str(),
                record.email.as_deref().unwrap_or_default(),
                record.phone.as_deref().unwrap_or_default(),
                record.prefecture.as_deref().unwrap_or_default(),
                record.city.as_deref().unwrap_or_default(),
                registered_at.as_str(),
            ])
            .map_err(|e| format!("csv row write failed: {e}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| format!("csv flush failed: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("csv encoding failed: {e}"))
}

fn format_registered_at(created_at: i64) -> String {
    match Local.timestamp_opt(created_at, 0).earliest() {
        Some(t) => t.format("%Y/%m/%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}
