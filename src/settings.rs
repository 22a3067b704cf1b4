use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// What a single reselect does when the list is already near the top.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NearTopAction {
    #[default]
    Refresh,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReselectConfig {
    /// Offsets strictly above this count as "far from top".
    pub top_threshold: f64,
    pub cooldown_ms: u64,
    pub haptics: bool,
    pub near_top_action: NearTopAction,
}

impl Default for ReselectConfig {
    fn default() -> Self {
        Self {
            top_threshold: 120.0,
            cooldown_ms: 700,
            haptics: true,
            near_top_action: NearTopAction::Refresh,
        }
    }
}

impl ReselectConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TabStateDefaults {
    /// Layout settle delay before a restored scroll offset is applied.
    pub restore_delay_ms: u64,
    pub preserve_scroll: bool,
    pub preserve_filters: bool,
    pub preserve_form_data: bool,
}

impl Default for TabStateDefaults {
    fn default() -> Self {
        Self {
            restore_delay_ms: 100,
            preserve_scroll: true,
            preserve_filters: true,
            preserve_form_data: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TabBarConfig {
    pub double_tap_window_ms: u64,
}

impl Default for TabBarConfig {
    fn default() -> Self {
        Self {
            double_tap_window_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub reselect: ReselectConfig,
    pub tab_state: TabStateDefaults,
    pub tab_bar: TabBarConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let tmp_path = path.with_extension("tmp");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        // Atomic Write Strategy: Write to tmp, then rename.
        fs::write(&tmp_path, json).map_err(|e| e.to_string())?;
        fs::rename(tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }
}
