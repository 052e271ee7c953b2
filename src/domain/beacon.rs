//! Screen state for the broadcast form.
//!
//! Holds everything the broadcast panel shows and turns user actions into
//! advertiser requests. It has no UI or Bluetooth dependencies so the whole
//! flow can be driven from tests.

use crate::domain::capability::Readiness;
use crate::domain::errors::{AdvertiseError, InputError, StartError};
use crate::domain::models::{
    AdvertiseData, AdvertiseMode, AdvertiseRequest, AdvertiseSettings, AppEvent, MessageSeverity,
    StatusMessage, TxPowerLevel,
};
use crate::domain::preset::{Preset, PresetList};
use crate::domain::service_uuid::{format_service_uuid, parse_service_uuid, DEFAULT_SERVICE_UUID};
use crate::domain::settings::AdvancedAdvertising;
use tracing::{debug, info, warn};

/// Which widgets accept input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    /// UUID field, power/mode selectors and the preset picker.
    pub inputs_enabled: bool,
    pub save_enabled: bool,
}

impl ControlState {
    pub fn new(is_advertising: bool, blocked: bool) -> Self {
        Self {
            start_enabled: !is_advertising && !blocked,
            stop_enabled: is_advertising && !blocked,
            inputs_enabled: !is_advertising,
            save_enabled: !is_advertising && !blocked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconForm {
    pub uuid_input: String,
    pub tx_power: TxPowerLevel,
    pub mode: AdvertiseMode,
}

impl Default for BeaconForm {
    fn default() -> Self {
        Self {
            uuid_input: DEFAULT_SERVICE_UUID.to_string(),
            tx_power: TxPowerLevel::High,
            mode: AdvertiseMode::LowLatency,
        }
    }
}

pub struct BeaconController {
    pub form: BeaconForm,
    selected_preset: Option<String>,
    is_advertising: bool,
    status_text: String,
    readiness: Option<Readiness>,
    toast: Option<StatusMessage>,
}

impl Default for BeaconController {
    fn default() -> Self {
        Self::new()
    }
}

impl BeaconController {
    pub fn new() -> Self {
        Self {
            form: BeaconForm::default(),
            selected_preset: None,
            is_advertising: false,
            status_text: "Not broadcasting".to_string(),
            readiness: None,
            toast: None,
        }
    }

    pub fn with_presets(presets: &PresetList, last: Option<&str>) -> Self {
        let mut controller = Self::new();
        controller.restore(presets, last);
        controller
    }

    /// Select `last` if it still exists, otherwise the first preset.
    pub fn restore(&mut self, presets: &PresetList, last: Option<&str>) {
        let preset = last
            .and_then(|name| presets.get(name))
            .or_else(|| presets.first());
        if let Some(preset) = preset {
            self.load_preset(preset);
        }
    }

    pub fn is_advertising(&self) -> bool {
        self.is_advertising
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    pub fn readiness(&self) -> Option<Readiness> {
        self.readiness
    }

    pub fn take_toast(&mut self) -> Option<StatusMessage> {
        self.toast.take()
    }

    pub fn controls(&self) -> ControlState {
        let blocked = self.readiness.is_some_and(Readiness::is_blocking);
        ControlState::new(self.is_advertising, blocked)
    }

    /// Copy a preset into the form. Ignored while broadcasting.
    pub fn load_preset(&mut self, preset: &Preset) -> bool {
        if self.is_advertising {
            debug!("Ignoring preset '{}' while broadcasting", preset.name);
            return false;
        }
        self.form = BeaconForm {
            uuid_input: preset.uuid.clone(),
            tx_power: preset.power_level,
            mode: preset.advertise_mode,
        };
        self.selected_preset = Some(preset.name.clone());
        true
    }

    /// Snapshot of the form under `name`.
    pub fn preset_from_form(&mut self, name: &str) -> Result<Preset, InputError> {
        let name = name.trim();
        if name.is_empty() {
            self.toast(InputError::EmptyPresetName.to_string(), MessageSeverity::Error);
            return Err(InputError::EmptyPresetName);
        }
        Ok(Preset {
            name: name.to_string(),
            uuid: self.form.uuid_input.clone(),
            power_level: self.form.tx_power,
            advertise_mode: self.form.mode,
        })
    }

    /// Record that a preset was written; the picker follows it.
    pub fn preset_saved(&mut self, name: &str) {
        self.selected_preset = Some(name.trim().to_string());
        self.toast("Preset saved", MessageSeverity::Success);
    }

    /// Validate the form and build the request to send to the advertiser.
    pub fn prepare_start(
        &mut self,
        advanced: &AdvancedAdvertising,
    ) -> Result<AdvertiseRequest, StartError> {
        if let Err(e) = self.check_can_start() {
            self.toast(e.user_message(), MessageSeverity::Error);
            return Err(e.into());
        }

        if self.form.uuid_input.trim().is_empty() {
            self.form.uuid_input = DEFAULT_SERVICE_UUID.to_string();
        }

        let uuid = match parse_service_uuid(&self.form.uuid_input) {
            Ok(uuid) => uuid,
            Err(e) => {
                warn!("Rejected UUID input '{}'", self.form.uuid_input);
                self.toast(e.to_string(), MessageSeverity::Error);
                return Err(e.into());
            }
        };

        let request = AdvertiseRequest {
            settings: AdvertiseSettings {
                mode: self.form.mode,
                tx_power: self.form.tx_power,
                connectable: advanced.connectable,
                timeout: advanced.timeout(),
            },
            data: AdvertiseData {
                service_uuid: uuid,
                include_device_name: advanced.include_device_name,
                ibeacon: advanced.ibeacon.frame_for(uuid),
            },
        };

        info!(
            "Requesting broadcast of {} ({:?}, {:?})",
            uuid, request.settings.tx_power, request.settings.mode
        );
        self.status_text = "Starting broadcast...".to_string();
        Ok(request)
    }

    fn check_can_start(&self) -> Result<(), AdvertiseError> {
        if self.is_advertising {
            return Err(AdvertiseError::AlreadyStarted);
        }
        match self.readiness {
            Some(Readiness::NoAdapter) => Err(AdvertiseError::AdapterUnavailable),
            Some(Readiness::AdvertisingUnsupported) => Err(AdvertiseError::FeatureUnsupported),
            Some(Readiness::PermissionDenied) => Err(AdvertiseError::PermissionDenied),
            // Radio state can change at any time; the advertiser reports it.
            _ => Ok(()),
        }
    }

    /// Record the probed readiness. Blocking states replace the status text.
    pub fn set_blocked(&mut self, readiness: Readiness) {
        self.readiness = Some(readiness);
        match readiness {
            Readiness::Ready => {}
            Readiness::RadioOff => {
                self.toast(readiness.message(), MessageSeverity::Warning);
            }
            blocking => {
                warn!("Broadcasting unavailable: {}", blocking.message());
                self.status_text = blocking.message().to_string();
            }
        }
    }

    /// Whether a stop command should be sent.
    pub fn request_stop(&mut self) -> bool {
        self.is_advertising
    }

    pub fn apply(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Capabilities(report) => self.set_blocked(report.readiness()),
            AppEvent::AdvertiseStarted(request) => {
                self.is_advertising = true;
                self.status_text = format!(
                    "Broadcasting: {}\nPower: {}\nMode: {}",
                    format_service_uuid(&request.data.service_uuid),
                    request.settings.tx_power.label(),
                    request.settings.mode.label()
                );
                self.toast("Broadcasting started", MessageSeverity::Success);
            }
            AppEvent::AdvertiseFailed(error) => {
                if *error == AdvertiseError::AlreadyStarted && self.is_advertising {
                    // The running broadcast is unaffected.
                    self.toast(error.user_message(), MessageSeverity::Warning);
                    return;
                }
                self.is_advertising = false;
                self.status_text = format!("Failed to start broadcasting: {}", error.user_message());
                self.toast("Failed to start broadcasting", MessageSeverity::Error);
            }
            AppEvent::AdvertiseStopped { timed_out } => {
                self.is_advertising = false;
                self.status_text = if *timed_out {
                    "Broadcasting stopped (timeout reached)".to_string()
                } else {
                    "Broadcasting stopped".to_string()
                };
                self.toast("Broadcasting stopped", MessageSeverity::Info);
            }
            AppEvent::LogMessage(message) => {
                self.toast = Some(message.clone());
            }
        }
    }

    fn toast(&mut self, message: impl Into<String>, severity: MessageSeverity) {
        self.toast = Some(StatusMessage::new(message, severity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capability::{CapabilityReport, PermissionSet};
    use crate::domain::service_uuid::default_service_uuid;

    fn started(controller: &mut BeaconController) {
        let request = controller
            .prepare_start(&AdvancedAdvertising::default())
            .unwrap();
        controller.apply(&AppEvent::AdvertiseStarted(request));
    }

    fn report(powered: bool, supported: bool, granted: bool) -> CapabilityReport {
        CapabilityReport {
            adapter_present: true,
            powered,
            advertising_supported: supported,
            permissions: PermissionSet::radio_access(granted),
        }
    }

    #[test]
    fn test_controls_disabled_iff_advertising() {
        for is_advertising in [false, true] {
            let controls = ControlState::new(is_advertising, false);
            assert_eq!(controls.inputs_enabled, !is_advertising);
            assert_eq!(controls.save_enabled, !is_advertising);
            assert_eq!(controls.start_enabled, !is_advertising);
            assert_eq!(controls.stop_enabled, is_advertising);
        }
    }

    #[test]
    fn test_controls_follow_advertiser_events() {
        let mut controller = BeaconController::new();
        assert!(controller.controls().inputs_enabled);

        started(&mut controller);
        assert!(controller.is_advertising());
        assert!(!controller.controls().inputs_enabled);
        assert!(controller.controls().stop_enabled);

        controller.apply(&AppEvent::AdvertiseStopped { timed_out: false });
        assert!(controller.controls().inputs_enabled);
        assert!(!controller.controls().stop_enabled);
    }

    #[test]
    fn test_blocked_device_disables_actions_but_not_inputs() {
        let mut controller = BeaconController::new();
        controller.apply(&AppEvent::Capabilities(report(true, false, true)));

        let controls = controller.controls();
        assert!(!controls.start_enabled);
        assert!(!controls.save_enabled);
        assert!(controls.inputs_enabled);
        assert_eq!(
            controller.status_text(),
            "Bluetooth LE advertising is not supported on this device"
        );
        assert_eq!(
            controller.prepare_start(&AdvancedAdvertising::default()),
            Err(StartError::Bluetooth(AdvertiseError::FeatureUnsupported))
        );
    }

    #[test]
    fn test_permission_denied_blocks_start() {
        let mut controller = BeaconController::new();
        controller.set_blocked(Readiness::PermissionDenied);
        assert!(!controller.controls().start_enabled);
        assert_eq!(controller.status_text(), "Required permissions not granted");
    }

    #[test]
    fn test_radio_off_is_not_blocking() {
        let mut controller = BeaconController::new();
        controller.apply(&AppEvent::Capabilities(report(false, true, true)));
        assert!(controller.controls().start_enabled);
        assert_eq!(
            controller.take_toast().unwrap().message,
            "Bluetooth is not enabled"
        );
        assert!(controller
            .prepare_start(&AdvancedAdvertising::default())
            .is_ok());
    }

    #[test]
    fn test_empty_uuid_falls_back_to_default() {
        let mut controller = BeaconController::new();
        controller.form.uuid_input = "   ".to_string();

        let request = controller
            .prepare_start(&AdvancedAdvertising::default())
            .unwrap();

        assert_eq!(request.data.service_uuid, default_service_uuid());
        assert_eq!(controller.form.uuid_input, DEFAULT_SERVICE_UUID);
        assert_eq!(controller.status_text(), "Starting broadcast...");
    }

    #[test]
    fn test_invalid_uuid_is_rejected() {
        let mut controller = BeaconController::new();
        controller.form.uuid_input = "1234".to_string();

        let result = controller.prepare_start(&AdvancedAdvertising::default());

        assert_eq!(result, Err(StartError::Input(InputError::InvalidUuid)));
        assert_eq!(controller.take_toast().unwrap().message, "Invalid UUID format");
        assert!(!controller.is_advertising());
    }

    #[test]
    fn test_request_carries_form_and_advanced_options() {
        let mut controller = BeaconController::new();
        controller.form.tx_power = TxPowerLevel::Low;
        controller.form.mode = AdvertiseMode::Balanced;
        let mut advanced = AdvancedAdvertising::default();
        advanced.timeout_secs = 10;
        advanced.ibeacon.enabled = true;

        let request = controller.prepare_start(&advanced).unwrap();

        assert_eq!(request.settings.tx_power, TxPowerLevel::Low);
        assert_eq!(request.settings.mode, AdvertiseMode::Balanced);
        assert!(!request.settings.connectable);
        assert_eq!(
            request.settings.timeout,
            Some(std::time::Duration::from_secs(10))
        );
        let frame = request.data.ibeacon.unwrap();
        assert_eq!(frame.proximity_uuid, request.data.service_uuid);
    }

    #[test]
    fn test_started_status_text() {
        let mut controller = BeaconController::new();
        controller.form.tx_power = TxPowerLevel::Medium;
        controller.form.mode = AdvertiseMode::LowPower;
        started(&mut controller);

        assert_eq!(
            controller.status_text(),
            "Broadcasting: 11111111-2222-3333-4444-555555555555\nPower: Medium\nMode: Low Power"
        );
        assert_eq!(
            controller.take_toast().unwrap().message,
            "Broadcasting started"
        );
    }

    #[test]
    fn test_failure_reports_platform_message() {
        let mut controller = BeaconController::new();
        controller
            .prepare_start(&AdvancedAdvertising::default())
            .unwrap();
        controller.apply(&AppEvent::AdvertiseFailed(AdvertiseError::from_code(2)));

        assert!(!controller.is_advertising());
        assert_eq!(
            controller.status_text(),
            "Failed to start broadcasting: Too many advertisers already exist"
        );
        assert!(controller.controls().start_enabled);
    }

    #[test]
    fn test_status_names_the_request_that_started() {
        let mut controller = BeaconController::new();
        let first = controller
            .prepare_start(&AdvancedAdvertising::default())
            .unwrap();

        // Second click before the first start is confirmed
        controller.form.uuid_input = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa".to_string();
        controller.form.tx_power = TxPowerLevel::UltraLow;
        controller
            .prepare_start(&AdvancedAdvertising::default())
            .unwrap();

        controller.apply(&AppEvent::AdvertiseStarted(first));
        controller.apply(&AppEvent::AdvertiseFailed(AdvertiseError::AlreadyStarted));

        assert!(controller.is_advertising());
        assert_eq!(
            controller.status_text(),
            "Broadcasting: 11111111-2222-3333-4444-555555555555\nPower: High\nMode: Low Latency"
        );
    }

    #[test]
    fn test_already_started_keeps_running_broadcast() {
        let mut controller = BeaconController::new();
        started(&mut controller);
        controller.apply(&AppEvent::AdvertiseFailed(AdvertiseError::AlreadyStarted));
        assert!(controller.is_advertising());
    }

    #[test]
    fn test_preset_load_ignored_while_advertising() {
        let mut controller = BeaconController::new();
        started(&mut controller);

        let other = Preset {
            name: "Other".to_string(),
            uuid: "aaaaaaaa-2222-3333-4444-555555555555".to_string(),
            power_level: TxPowerLevel::UltraLow,
            advertise_mode: AdvertiseMode::LowPower,
        };
        assert!(!controller.load_preset(&other));
        assert_eq!(controller.form, BeaconForm::default());

        controller.apply(&AppEvent::AdvertiseStopped { timed_out: true });
        assert_eq!(
            controller.status_text(),
            "Broadcasting stopped (timeout reached)"
        );
        assert!(controller.load_preset(&other));
        assert_eq!(controller.form.uuid_input, other.uuid);
        assert_eq!(controller.selected_preset(), Some("Other"));
    }

    #[test]
    fn test_preset_from_form_trims_and_overwrites() {
        let mut controller = BeaconController::new();
        let mut presets = PresetList::new();

        let first = controller.preset_from_form("  Office ").unwrap();
        assert_eq!(first.name, "Office");
        assert_eq!(presets.upsert(first), 0);

        controller.form.tx_power = TxPowerLevel::Low;
        assert_eq!(presets.upsert(controller.preset_from_form("Office").unwrap()), 0);
        controller.preset_saved("  Office ");

        assert_eq!(presets.len(), 1);
        assert_eq!(presets.get("Office").unwrap().power_level, TxPowerLevel::Low);
        assert_eq!(controller.selected_preset(), Some("Office"));
        assert_eq!(controller.take_toast().unwrap().message, "Preset saved");
    }

    #[test]
    fn test_preset_from_form_rejects_blank_name() {
        let mut controller = BeaconController::new();
        assert_eq!(
            controller.preset_from_form("   "),
            Err(InputError::EmptyPresetName)
        );
        assert_eq!(
            controller.take_toast().unwrap().message,
            "Preset name cannot be empty"
        );
    }

    #[test]
    fn test_restore_prefers_last_preset() {
        let mut presets = PresetList::new();
        presets.ensure_default();
        presets.upsert(Preset {
            name: "Lab".to_string(),
            uuid: "bbbbbbbb-2222-3333-4444-555555555555".to_string(),
            power_level: TxPowerLevel::Low,
            advertise_mode: AdvertiseMode::Balanced,
        });

        let controller = BeaconController::with_presets(&presets, Some("Lab"));
        assert_eq!(controller.selected_preset(), Some("Lab"));
        assert_eq!(controller.form.tx_power, TxPowerLevel::Low);

        let mut controller = BeaconController::new();
        controller.restore(&presets, Some("Gone"));
        assert_eq!(controller.selected_preset(), Some("Default"));
    }
}
