/// Key names the drill never counts: modifiers and navigation keys delivered
/// by the platform as separate key events.
pub const IGNORED_KEYS: &[&str] = &["Shift", "Control", "Alt", "Meta", "Tab", "Escape"];

pub const SPACE: &str = " ";

pub fn is_ignored_key(key: &str) -> bool {
    IGNORED_KEYS.contains(&key)
}

/// Human-readable name for a key binding, e.g. for "press Space".
pub fn key_display_name(binding: &str) -> String {
    match binding {
        SPACE => "Space".to_string(),
        b if b.chars().count() == 1 && b.chars().all(|c| c.is_ascii_uppercase()) => {
            format!("Shift+{}", b.to_ascii_lowercase())
        }
        b => b.to_string(),
    }
}
