use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::Result;

/// User preferences toggled from the settings dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigFlags {
    pub auto_fit_in_view: bool,
    pub file_path_in_title: bool,
    pub keep_aspect_ratio_choice: bool,
    pub last_location_opened: bool,
}

impl Default for ConfigFlags {
    fn default() -> Self {
        Self { auto_fit_in_view: true, file_path_in_title: false, keep_aspect_ratio_choice: false, last_location_opened: true }
    }
}

/// Values remembered between sessions rather than chosen explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Behavior {
    pub location: PathBuf,
    /// Last state of the resize dialog's "keep aspect ratio" box.
    pub choice: bool,
}

impl Default for Behavior {
    fn default() -> Self { Self { location: PathBuf::new(), choice: true } }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub config: ConfigFlags,
    pub behavior: Behavior,
}

impl EditorSettings {
    pub fn load() -> Self { Self::load_from(&Self::get_config_path()) }

    /// Missing or unreadable files fall back to the defaults.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(s) = fs::read_to_string(path) {
            match serde_json::from_str(&s) {
                Ok(settings) => return settings,
                Err(e) => warn!("ignoring malformed settings {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<()> { self.save_to(&Self::get_config_path()) }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(p) = path.parent() { fs::create_dir_all(p)?; }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        let mut p: PathBuf = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("image_spell");
        p.push("settings.json");
        p
    }

    /// Directory the open dialog should start in.
    pub fn location(&self) -> PathBuf {
        if self.config.last_location_opened && !self.behavior.location.as_os_str().is_empty() {
            return self.behavior.location.clone();
        }
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn remember_location(&mut self, location: &Path) {
        self.behavior.location = if self.config.last_location_opened { location.to_path_buf() } else { PathBuf::new() };
    }

    /// The remembered aspect-ratio choice, if the user asked for it to be kept.
    pub fn aspect_choice(&self) -> Option<bool> {
        self.config.keep_aspect_ratio_choice.then_some(self.behavior.choice)
    }

    pub fn remember_aspect_choice(&mut self, choice: bool) { self.behavior.choice = choice; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults_for_missing_keys() {
        let s: EditorSettings = serde_json::from_str(r#"{"config":{"filePathInTitle":true}}"#).unwrap();
        assert!(s.config.file_path_in_title);
        assert!(s.config.auto_fit_in_view);
        assert!(s.behavior.choice);
    }

    #[test]
    fn location_is_only_remembered_when_enabled() {
        let mut s = EditorSettings::default();
        s.remember_location(Path::new("/srv/pictures"));
        assert_eq!(s.location(), PathBuf::from("/srv/pictures"));

        s.config.last_location_opened = false;
        s.remember_location(Path::new("/srv/other"));
        assert_eq!(s.behavior.location, PathBuf::new());
        assert_ne!(s.location(), PathBuf::from("/srv/other"));
    }

    #[test]
    fn aspect_choice_requires_opt_in() {
        let mut s = EditorSettings::default();
        s.remember_aspect_choice(false);
        assert_eq!(s.aspect_choice(), None);
        s.config.keep_aspect_ratio_choice = true;
        assert_eq!(s.aspect_choice(), Some(false));
    }

    #[test]
    fn round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = EditorSettings::default();
        s.config.auto_fit_in_view = false;
        s.save_to(&path).unwrap();
        assert_eq!(EditorSettings::load_from(&path), s);
    }

    #[test]
    fn unwritable_location_is_a_settings_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let err = EditorSettings::default().save_to(&blocker.join("settings.json")).unwrap_err();
        assert!(matches!(err, crate::error::EditorError::SettingsIo(_)));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(EditorSettings::load_from(&path), EditorSettings::default());
    }
}
