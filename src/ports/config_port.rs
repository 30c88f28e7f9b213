//! Read access to `[section] key` settings.

/// Typed getters fall back to `default` when a key is absent or does not
/// parse. Numbers that must not fall back silently are read through
/// [`crate::domain::config_validation::optional_number`].
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Trimmed value; blank counts as absent.
    fn get_text(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
