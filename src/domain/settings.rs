use crate::domain::ibeacon::IBeaconSettings;
use crate::domain::models::MAX_ADVERTISE_TIMEOUT;
use crate::domain::preset::{Preset, PresetList};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "ble_beacon".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// Options applied to every broadcast, independent of the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedAdvertising {
    #[serde(default = "default_false")]
    pub connectable: bool,
    /// 0 advertises until stopped.
    #[serde(default)]
    pub timeout_secs: u32,
    #[serde(default = "default_false")]
    pub include_device_name: bool,
    #[serde(default)]
    pub ibeacon: IBeaconSettings,
}

impl Default for AdvancedAdvertising {
    fn default() -> Self {
        Self {
            connectable: false,
            timeout_secs: 0,
            include_device_name: false,
            ibeacon: IBeaconSettings::default(),
        }
    }
}

impl AdvancedAdvertising {
    /// Timeout clamped to what the platform accepts.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.timeout_secs)).min(MAX_ADVERTISE_TIMEOUT))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub presets: PresetList,

    /// Preset selected when the app was last closed.
    #[serde(default)]
    pub last_preset: Option<String>,

    #[serde(default)]
    pub advertising: AdvancedAdvertising,

    #[serde(default)]
    pub log_settings: LogSettings,
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::with_path(settings_path))
    }

    /// Load from `path`, falling back to defaults if it is missing or unreadable.
    pub fn with_path(settings_path: PathBuf) -> Self {
        let settings = match Self::load_from_file(&settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                if settings_path.exists() {
                    tracing::warn!(
                        "Ignoring unreadable settings at {}: {}",
                        settings_path.display(),
                        e
                    );
                }
                Settings::default()
            }
        };

        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BleBeaconBroadcaster");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn presets(&self) -> &PresetList {
        &self.settings.presets
    }

    /// Upsert a preset by name and persist. Returns its position.
    pub fn save_preset(&mut self, preset: Preset) -> anyhow::Result<usize> {
        let name = preset.name.clone();
        let index = self.settings.presets.upsert(preset);
        self.settings.last_preset = Some(name);
        self.save()?;
        Ok(index)
    }

    /// Add and persist the `Default` preset when none exist.
    pub fn seed_default_preset(&mut self) -> anyhow::Result<bool> {
        let seeded = self.settings.presets.ensure_default();
        if seeded {
            tracing::info!("No presets found, seeded the default preset");
            self.save()?;
        }
        Ok(seeded)
    }

    pub fn set_last_preset(&mut self, name: Option<String>) -> anyhow::Result<()> {
        if self.settings.last_preset != name {
            self.settings.last_preset = name;
            self.save()?;
        }
        Ok(())
    }
}
