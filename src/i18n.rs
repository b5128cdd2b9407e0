//! Internationalization (i18n) module for MatPack.
//!
//! Uses a simple key→string HashMap loaded at runtime from embedded translation data.
//! The `t!("key")` macro looks up the current language, falling back to English.
//! Language can be switched at runtime via `set_language()`.

use std::collections::HashMap;
use std::sync::Mutex;

/// Global translation state.
static I18N: Mutex<Option<I18nState>> = Mutex::new(None);

struct I18nState {
    current_lang: String,
    /// lang_code → (key → translated_string)
    translations: HashMap<String, HashMap<String, String>>,
}

/// Supported languages: (code, native_name)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
];

/// Initialize the i18n system with embedded translations.
/// Call once at startup.
pub fn init() {
    let mut translations: HashMap<String, HashMap<String, String>> = HashMap::new();
    translations.insert("en".to_string(), parse_translations(include_str!("../locales/en.txt")));
    translations.insert("es".to_string(), parse_translations(include_str!("../locales/es.txt")));
    translations.insert("fr".to_string(), parse_translations(include_str!("../locales/fr.txt")));
    translations.insert("de".to_string(), parse_translations(include_str!("../locales/de.txt")));

    let state = I18nState {
        current_lang: "en".to_string(),
        translations,
    };
    if let Ok(mut guard) = I18N.lock() {
        *guard = Some(state);
    }
}

/// Set the active language. If `code` is not a known language, falls back to "en".
pub fn set_language(code: &str) {
    if let Ok(mut guard) = I18N.lock()
        && let Some(ref mut state) = *guard
    {
        if state.translations.contains_key(code) {
            state.current_lang = code.to_string();
        } else {
            state.current_lang = "en".to_string();
        }
    }
}

/// Get the current language code.
pub fn current_language() -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        return state.current_lang.clone();
    }
    "en".to_string()
}

/// Look up a translation key. Returns the translated string if found,
/// or falls back to English, or returns the key itself as last resort.
pub fn translate(key: &str) -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        if let Some(map) = state.translations.get(&state.current_lang)
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
        if state.current_lang != "en"
            && let Some(map) = state.translations.get("en")
            && let Some(val) = map.get(key)
        {
            return val.clone();
        }
    }
    key.to_string()
}

/// Detect the system language and return the best matching language code.
/// Returns "en" if no match is found.
pub fn detect_system_language() -> String {
    for var in &["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"] {
        if let Ok(val) = std::env::var(var)
            && let Some(lang) = match_system_locale(&val)
        {
            return lang;
        }
    }
    "en".to_string()
}

/// Match a system locale string (e.g. "en_US.UTF-8", "fr-FR", "de_DE@euro") to our supported languages.
fn match_system_locale(locale: &str) -> Option<String> {
    let normalized = locale.to_lowercase().replace('_', "-");
    let lang_part = normalized.split('.').next().unwrap_or(&normalized);
    let lang_part = lang_part.split('@').next().unwrap_or(lang_part);
    let primary = lang_part.split('-').next().unwrap_or(lang_part);

    LANGUAGES
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(code, _)| code.to_string())
}

/// Parse a simple key=value translation file.
/// Format: one `key=value` per line. Lines starting with `#` are comments. Empty lines ignored.
/// A literal `\n` in a value becomes a line break.
fn parse_translations(data: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(key.trim().to_string(), val.trim().replace("\\n", "\n"));
        }
    }
    map
}

/// Translation macro. Usage: `t!("menu.file")` or `t!("hint.blender_name", name = "Brick")`
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_strings_map_to_supported_codes() {
        assert_eq!(match_system_locale("de_DE.UTF-8"), Some("de".to_string()));
        assert_eq!(match_system_locale("fr-CA"), Some("fr".to_string()));
        assert_eq!(match_system_locale("es_ES@euro"), Some("es".to_string()));
        assert_eq!(match_system_locale("ja_JP"), None);
    }

    #[test]
    fn parser_skips_comments_and_unescapes_newlines() {
        let map = parse_translations("# c\n\nzone.drop = Drop {label}\\nImage Here\nbad line\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["zone.drop"], "Drop {label}\nImage Here");
    }

    #[test]
    fn every_locale_defines_every_english_key() {
        let en = parse_translations(include_str!("../locales/en.txt"));
        for (code, data) in [
            ("es", include_str!("../locales/es.txt")),
            ("fr", include_str!("../locales/fr.txt")),
            ("de", include_str!("../locales/de.txt")),
        ] {
            let map = parse_translations(data);
            for key in en.keys() {
                assert!(map.contains_key(key), "{} is missing {}", code, key);
            }
        }
    }

    #[test]
    fn translate_falls_back_to_key_and_english() {
        init();
        assert_eq!(translate("no.such.key"), "no.such.key");
        assert!(t!("hint.blender_name", name = "Brick_UIO").contains("\"Brick_UIO\""));
    }
}
