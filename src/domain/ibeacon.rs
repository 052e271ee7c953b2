//! iBeacon manufacturer frame.
//!
//! Layout (23 bytes, carried under company id 0x004C):
//! `02 15 | proximity uuid (16, BE) | major (2, BE) | minor (2, BE) | measured power (1)`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bluetooth SIG company identifier for Apple.
#[cfg_attr(
    not(any(target_os = "windows", all(target_os = "linux", feature = "bluez"))),
    allow(dead_code)
)]
pub const IBEACON_COMPANY_ID: u16 = 0x004C;

/// Beacon type + remaining length.
pub const IBEACON_PREFIX: [u8; 2] = [0x02, 0x15];

pub const IBEACON_FRAME_LEN: usize = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IBeaconFrame {
    pub proximity_uuid: Uuid,
    pub major: u16,
    pub minor: u16,
    /// Calibrated RSSI at 1 m.
    pub measured_power: i8,
}

impl IBeaconFrame {
    #[cfg_attr(
        not(any(target_os = "windows", all(target_os = "linux", feature = "bluez"))),
        allow(dead_code)
    )]
    pub fn to_bytes(&self) -> [u8; IBEACON_FRAME_LEN] {
        let mut bytes = [0u8; IBEACON_FRAME_LEN];
        bytes[0..2].copy_from_slice(&IBEACON_PREFIX);
        bytes[2..18].copy_from_slice(self.proximity_uuid.as_bytes());
        bytes[18..20].copy_from_slice(&self.major.to_be_bytes());
        bytes[20..22].copy_from_slice(&self.minor.to_be_bytes());
        bytes[22] = self.measured_power as u8;
        bytes
    }
}

/// Persisted iBeacon options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IBeaconSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_major")]
    pub major: u16,
    #[serde(default = "default_minor")]
    pub minor: u16,
    #[serde(default = "default_measured_power")]
    pub measured_power: i8,
}

impl Default for IBeaconSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            major: default_major(),
            minor: default_minor(),
            measured_power: default_measured_power(),
        }
    }
}

impl IBeaconSettings {
    /// Frame for `uuid`, or `None` when iBeacon mode is off.
    pub fn frame_for(&self, uuid: Uuid) -> Option<IBeaconFrame> {
        self.enabled.then_some(IBeaconFrame {
            proximity_uuid: uuid,
            major: self.major,
            minor: self.minor,
            measured_power: self.measured_power,
        })
    }
}

fn default_major() -> u16 {
    1
}
fn default_minor() -> u16 {
    100
}
fn default_measured_power() -> i8 {
    -59
}
