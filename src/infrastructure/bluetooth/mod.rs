//! Bluetooth Module
//!
//! Drives the host's Bluetooth LE advertiser.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    AdvertiserService                      │
//! │   (worker thread - owns the backend, talks to the UI)     │
//! └─────────────────────┬────────────────────────────────────┘
//!                       │ dyn Advertiser
//!         ┌─────────────┼──────────────┐
//!         │             │              │
//!         ▼             ▼              ▼
//! ┌─────────────┐ ┌────────────┐ ┌────────────┐
//! │    WinRT    │ │   BlueZ    │ │  Fallback  │
//! │  publisher  │ │ (bluez     │ │ (always    │
//! │             │ │  feature)  │ │ unsupported│
//! └─────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] - Advertising payload sizing
//! - [`service`] - Worker thread and command loop
//! - [`fallback`] - Backend for hosts without a supported stack

#[cfg(all(target_os = "linux", feature = "bluez"))]
pub mod bluez;
#[cfg(not(any(target_os = "windows", all(target_os = "linux", feature = "bluez"))))]
pub mod fallback;
pub mod protocol;
pub mod service;
#[cfg(target_os = "windows")]
pub mod winrt;

pub use service::AdvertiserHandle;

use crate::domain::capability::CapabilityReport;
use crate::domain::errors::AdvertiseError;
use crate::domain::models::AdvertiseRequest;
use async_trait::async_trait;

/// A platform Bluetooth LE advertiser.
///
/// One advertisement at a time; `start` while one is running fails with
/// [`AdvertiseError::AlreadyStarted`].
#[async_trait]
pub trait Advertiser: Send {
    /// Human readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Probe adapter presence, radio state, advertising support and permissions.
    async fn capabilities(&mut self) -> CapabilityReport;

    /// Start broadcasting. Resolves once the stack has accepted or rejected it.
    async fn start(&mut self, request: &AdvertiseRequest) -> Result<(), AdvertiseError>;

    /// Stop broadcasting. A no-op when idle.
    async fn stop(&mut self) -> Result<(), AdvertiseError>;

    fn is_advertising(&self) -> bool;
}

/// The advertiser for the host this binary was built for.
pub fn platform_advertiser() -> Box<dyn Advertiser> {
    #[cfg(target_os = "windows")]
    {
        Box::new(winrt::WinRtAdvertiser::new())
    }
    #[cfg(all(target_os = "linux", feature = "bluez"))]
    {
        Box::new(bluez::BluezAdvertiser::new())
    }
    #[cfg(not(any(target_os = "windows", all(target_os = "linux", feature = "bluez"))))]
    {
        Box::new(fallback::FallbackAdvertiser::new())
    }
}
