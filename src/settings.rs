use std::path::PathBuf;

use crate::material::MaterialType;
use crate::theme::ThemeMode;

/// Application settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Theme mode (Light or Dark)
    pub theme_mode: ThemeMode,
    /// Language code (e.g. "en", "es"). Empty string = auto-detect system language.
    pub language: String,
    /// Material type selected when the window opens
    pub last_material_type: MaterialType,
    /// Folder the output picker starts in
    pub last_output_dir: Option<PathBuf>,
    pub remember_output_dir: bool,
    /// Ask before replacing files that already exist in the output folder.
    pub confirm_overwrite: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::Dark,
            language: String::new(), // empty = auto-detect on first boot
            last_material_type: MaterialType::Standard,
            last_output_dir: None,
            remember_output_dir: true,
            confirm_overwrite: true,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/matpack/matpack_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\MatPack\matpack_settings.cfg
    /// On macOS:   ~/Library/Application Support/MatPack/matpack_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("matpack");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("matpack_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_else(|_| {
                    std::env::current_exe()
                        .ok()
                        .and_then(|p| p.parent().map(|d| d.to_string_lossy().into_owned()))
                        .unwrap_or_default()
                });
            let config_dir = PathBuf::from(appdata).join("MatPack");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("matpack_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("MatPack");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("matpack_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("matpack_settings.cfg")))
        }
    }

    /// Serialize to the `key=value` file format.
    pub fn to_config_string(&self) -> String {
        let mode_str = match self.theme_mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        let out_dir = if self.remember_output_dir {
            self.last_output_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        } else {
            String::new()
        };
        format!(
            "theme_mode={mode_str}\n\
             language={}\n\
             last_material_type={}\n\
             last_output_dir={out_dir}\n\
             remember_output_dir={}\n\
             confirm_overwrite={}\n",
            self.language,
            self.last_material_type.key(),
            self.remember_output_dir,
            self.confirm_overwrite,
        )
    }

    /// Parse the `key=value` format. Unknown keys and bad values keep their defaults.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "theme_mode" => {
                    s.theme_mode = match val {
                        "light" => ThemeMode::Light,
                        _ => ThemeMode::Dark,
                    };
                }
                "language" => {
                    s.language = val.to_string();
                }
                "last_material_type" => {
                    s.last_material_type = MaterialType::from_key(val).unwrap_or_default();
                }
                "last_output_dir" => {
                    s.last_output_dir = (!val.is_empty()).then(|| PathBuf::from(val));
                }
                "remember_output_dir" => {
                    s.remember_output_dir = val == "true";
                }
                "confirm_overwrite" => {
                    s.confirm_overwrite = val != "false";
                }
                _ => {}
            }
        }
        s
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            crate::log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::from_config_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trip_keeps_fields() {
        let s = AppSettings {
            theme_mode: ThemeMode::Light,
            language: "fr".to_string(),
            last_material_type: MaterialType::Transparent,
            last_output_dir: Some(PathBuf::from("/tmp/out dir")),
            remember_output_dir: true,
            confirm_overwrite: false,
        };
        assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
    }

    #[test]
    fn output_dir_is_not_written_when_not_remembered() {
        let s = AppSettings {
            last_output_dir: Some(PathBuf::from("/secret")),
            remember_output_dir: false,
            ..AppSettings::default()
        };
        assert!(s.to_config_string().contains("last_output_dir=\n"));
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let s = AppSettings::from_config_str(
            "theme_mode=purple\nlast_material_type=glossy\nnonsense\nconfirm_overwrite=maybe\n",
        );
        assert_eq!(s.theme_mode, ThemeMode::Dark);
        assert_eq!(s.last_material_type, MaterialType::Standard);
        assert!(s.confirm_overwrite);
    }
}
