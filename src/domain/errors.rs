//! Error types surfaced to the user.
//!
//! `AdvertiseError` carries the platform's advertise-failure codes; the
//! backends translate their native errors into it. `InputError` covers local
//! form validation.

use thiserror::Error;

/// Failure reported by the platform advertiser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvertiseError {
    #[error("Advertising data is too large")]
    DataTooLarge,

    #[error("Too many advertisers already exist")]
    TooManyAdvertisers,

    #[error("Advertising is already started")]
    AlreadyStarted,

    #[error("Internal error in the Bluetooth stack: {0}")]
    InternalError(String),

    #[error("Advertising is not supported on this device")]
    FeatureUnsupported,

    #[error("Bluetooth is not enabled")]
    #[cfg_attr(
        not(any(target_os = "windows", all(target_os = "linux", feature = "bluez"))),
        allow(dead_code)
    )]
    BluetoothDisabled,

    #[error("Bluetooth advertise permission not granted")]
    PermissionDenied,

    #[error("Bluetooth adapter not available")]
    AdapterUnavailable,

    #[error("Unknown error code: {0}")]
    Unknown(i32),
}

impl AdvertiseError {
    pub const DATA_TOO_LARGE: i32 = 1;
    pub const TOO_MANY_ADVERTISERS: i32 = 2;
    pub const ALREADY_STARTED: i32 = 3;
    pub const INTERNAL_ERROR: i32 = 4;
    pub const FEATURE_UNSUPPORTED: i32 = 5;

    /// Map a platform failure code onto an error.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::DATA_TOO_LARGE => Self::DataTooLarge,
            Self::TOO_MANY_ADVERTISERS => Self::TooManyAdvertisers,
            Self::ALREADY_STARTED => Self::AlreadyStarted,
            Self::INTERNAL_ERROR => Self::InternalError(String::new()),
            Self::FEATURE_UNSUPPORTED => Self::FeatureUnsupported,
            other => Self::Unknown(other),
        }
    }

    /// Platform failure code, if this error has one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::DataTooLarge => Some(Self::DATA_TOO_LARGE),
            Self::TooManyAdvertisers => Some(Self::TOO_MANY_ADVERTISERS),
            Self::AlreadyStarted => Some(Self::ALREADY_STARTED),
            Self::InternalError(_) => Some(Self::INTERNAL_ERROR),
            Self::FeatureUnsupported => Some(Self::FEATURE_UNSUPPORTED),
            Self::Unknown(code) => Some(*code),
            Self::BluetoothDisabled | Self::PermissionDenied | Self::AdapterUnavailable => None,
        }
    }

    /// Short text for the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::InternalError(detail) if detail.is_empty() => {
                "Internal error in the Bluetooth stack".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Rejected form input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid UUID format")]
    InvalidUuid,

    #[error("Preset name cannot be empty")]
    EmptyPresetName,
}

/// Why a start request never reached the advertiser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Bluetooth(#[from] AdvertiseError),
}
