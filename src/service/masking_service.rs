/// Presentation-layer redaction for the 12-digit mynumber. Anything that is
/// not exactly 12 ASCII characters masks to a fixed placeholder.
pub fn mask_mynumber(value: &str) -> String {
    if value.len() != 12 || !value.is_ascii() {
        return "-".to_string();
    }
    format!("{}****{}", &value[..4], &value[8..])
}
