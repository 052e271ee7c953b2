use crate::domain::capability::CapabilityReport;
use crate::domain::errors::AdvertiseError;
use crate::domain::ibeacon::IBeaconFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Longest advertising timeout the platform accepts (3 minutes).
pub const MAX_ADVERTISE_TIMEOUT: Duration = Duration::from_secs(180);

/// Transmit power level, persisted as the platform's integer constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TxPowerLevel {
    UltraLow,
    Low,
    Medium,
    High,
}

impl TxPowerLevel {
    pub const ALL: [TxPowerLevel; 4] = [Self::UltraLow, Self::Low, Self::Medium, Self::High];

    pub fn code(self) -> u8 {
        match self {
            Self::UltraLow => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::UltraLow => "Ultra Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Nominal radiated power for this level.
    pub fn dbm(self) -> i16 {
        match self {
            Self::UltraLow => -21,
            Self::Low => -15,
            Self::Medium => -7,
            Self::High => 0,
        }
    }
}

impl fmt::Display for TxPowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} dBm)", self.label(), self.dbm())
    }
}

impl From<TxPowerLevel> for u8 {
    fn from(level: TxPowerLevel) -> Self {
        level.code()
    }
}

impl TryFrom<u8> for TxPowerLevel {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown tx power level {}", code))
    }
}

/// Advertising mode, trading latency against battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdvertiseMode {
    LowPower,
    Balanced,
    LowLatency,
}

impl AdvertiseMode {
    pub const ALL: [AdvertiseMode; 3] = [Self::LowPower, Self::Balanced, Self::LowLatency];

    pub fn code(self) -> u8 {
        match self {
            Self::LowPower => 0,
            Self::Balanced => 1,
            Self::LowLatency => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LowPower => "Low Power",
            Self::Balanced => "Balanced",
            Self::LowLatency => "Low Latency",
        }
    }

    /// Advertising interval the mode corresponds to.
    pub fn interval(self) -> Duration {
        match self {
            Self::LowPower => Duration::from_millis(1000),
            Self::Balanced => Duration::from_millis(250),
            Self::LowLatency => Duration::from_millis(100),
        }
    }
}

impl fmt::Display for AdvertiseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}ms)", self.label(), self.interval().as_millis())
    }
}

impl From<AdvertiseMode> for u8 {
    fn from(mode: AdvertiseMode) -> Self {
        mode.code()
    }
}

impl TryFrom<u8> for AdvertiseMode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown advertise mode {}", code))
    }
}

/// Radio-side parameters of an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertiseSettings {
    pub mode: AdvertiseMode,
    pub tx_power: TxPowerLevel,
    pub connectable: bool,
    /// `None` advertises until stopped.
    pub timeout: Option<Duration>,
}

impl Default for AdvertiseSettings {
    fn default() -> Self {
        Self {
            mode: AdvertiseMode::LowLatency,
            tx_power: TxPowerLevel::High,
            connectable: false,
            timeout: None,
        }
    }
}

/// Payload of an advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertiseData {
    pub service_uuid: Uuid,
    pub include_device_name: bool,
    /// When set, the iBeacon manufacturer frame is sent instead of the
    /// service UUID list.
    pub ibeacon: Option<IBeaconFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertiseRequest {
    pub settings: AdvertiseSettings,
    pub data: AdvertiseData,
}

#[derive(Debug, Clone)]
pub enum AdvertiserCommand {
    CheckCapabilities,
    Start(AdvertiseRequest),
    Stop,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Capabilities(CapabilityReport),
    /// The request the backend accepted.
    AdvertiseStarted(AdvertiseRequest),
    AdvertiseFailed(AdvertiseError),
    AdvertiseStopped { timed_out: bool },
    LogMessage(StatusMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Broadcast,
    Settings,
}
