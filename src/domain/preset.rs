use crate::domain::models::{AdvertiseMode, TxPowerLevel};
use crate::domain::service_uuid::DEFAULT_SERVICE_UUID;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRESET_NAME: &str = "Default";

/// A named bundle of broadcast parameters.
///
/// The UUID is kept as typed; it is only validated when a broadcast starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub uuid: String,
    pub power_level: TxPowerLevel,
    pub advertise_mode: AdvertiseMode,
}

impl Preset {
    pub fn default_preset() -> Self {
        Self {
            name: DEFAULT_PRESET_NAME.to_string(),
            uuid: DEFAULT_SERVICE_UUID.to_string(),
            power_level: TxPowerLevel::High,
            advertise_mode: AdvertiseMode::LowLatency,
        }
    }
}

/// Ordered presets, unique by name.
///
/// Loading goes through `upsert`, so a later entry with a repeated name
/// replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Preset>", into = "Vec<Preset>")]
pub struct PresetList {
    presets: Vec<Preset>,
}

impl PresetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name. Returns the preset's position.
    pub fn upsert(&mut self, preset: Preset) -> usize {
        match self.position(&preset.name) {
            Some(index) => {
                self.presets[index] = preset;
                index
            }
            None => {
                self.presets.push(preset);
                self.presets.len() - 1
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.presets.iter().position(|p| p.name == name)
    }

    pub fn first(&self) -> Option<&Preset> {
        self.presets.first()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Seed the `Default` preset into an empty list.
    pub fn ensure_default(&mut self) -> bool {
        if !self.is_empty() {
            return false;
        }
        self.presets.push(Preset::default_preset());
        true
    }
}

impl FromIterator<Preset> for PresetList {
    fn from_iter<T: IntoIterator<Item = Preset>>(iter: T) -> Self {
        let mut list = PresetList::new();
        for preset in iter {
            list.upsert(preset);
        }
        list
    }
}

impl From<Vec<Preset>> for PresetList {
    fn from(presets: Vec<Preset>) -> Self {
        presets.into_iter().collect()
    }
}

impl From<PresetList> for Vec<Preset> {
    fn from(list: PresetList) -> Self {
        list.presets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(name: &str, uuid: &str) -> Preset {
        Preset {
            name: name.to_string(),
            uuid: uuid.to_string(),
            power_level: TxPowerLevel::Low,
            advertise_mode: AdvertiseMode::Balanced,
        }
    }

    #[test]
    fn test_save_with_existing_name_overwrites() {
        let mut list = PresetList::new();
        list.upsert(preset("Office", "11111111-2222-3333-4444-555555555555"));
        list.upsert(preset("Lab", "22222222-2222-3333-4444-555555555555"));

        let index = list.upsert(preset("Office", "33333333-2222-3333-4444-555555555555"));

        assert_eq!(index, 0);
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.get("Office").unwrap().uuid,
            "33333333-2222-3333-4444-555555555555"
        );
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["Office", "Lab"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut list = PresetList::new();
        list.upsert(preset("office", "a"));
        list.upsert(preset("Office", "b"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_json_shape() {
        let list: PresetList = vec![preset("Office", "11111111-2222-3333-4444-555555555555")]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "Office",
                "uuid": "11111111-2222-3333-4444-555555555555",
                "powerLevel": 1,
                "advertiseMode": 1
            }])
        );
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let list: PresetList = vec![preset("b", "1"), preset("a", "2"), preset("c", "3")]
            .into_iter()
            .collect();
        let text = serde_json::to_string(&list).unwrap();
        let back: PresetList = serde_json::from_str(&text).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn test_loading_repeated_names_keeps_one() {
        let text = r#"[
            {"name": "A", "uuid": "1", "powerLevel": 0, "advertiseMode": 0},
            {"name": "B", "uuid": "2", "powerLevel": 1, "advertiseMode": 1},
            {"name": "A", "uuid": "3", "powerLevel": 3, "advertiseMode": 2}
        ]"#;

        let list: PresetList = serde_json::from_str(text).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(list.get("A").unwrap().uuid, "3");
        assert_eq!(list.get("A").unwrap().power_level, TxPowerLevel::High);
    }

    #[test]
    fn test_ensure_default_only_seeds_empty_list() {
        let mut list = PresetList::new();
        assert!(list.ensure_default());
        assert_eq!(list.first(), Some(&Preset::default_preset()));
        assert!(!list.ensure_default());
        assert_eq!(list.len(), 1);
    }
}
