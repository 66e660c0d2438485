//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// `None` when the key is absent or blank. A present but unparsable value
    /// yields `Some(NaN)` so validation can reject it instead of silently
    /// falling back to an adaptive default.
    fn get_optional_double(&self, section: &str, key: &str) -> Option<f64> {
        let raw = self.get_string(section, key)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(raw.parse().unwrap_or(f64::NAN))
    }
}

/// Accepted boolean spellings, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
