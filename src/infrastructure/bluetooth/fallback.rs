//! Backend for hosts without a supported advertising stack.

use super::Advertiser;
use crate::domain::capability::{CapabilityReport, PermissionSet};
use crate::domain::errors::AdvertiseError;
use crate::domain::models::AdvertiseRequest;
use async_trait::async_trait;
use tracing::warn;

#[derive(Debug, Default)]
pub struct FallbackAdvertiser;

impl FallbackAdvertiser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Advertiser for FallbackAdvertiser {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn capabilities(&mut self) -> CapabilityReport {
        CapabilityReport {
            adapter_present: true,
            powered: true,
            advertising_supported: false,
            permissions: PermissionSet::radio_access(true),
        }
    }

    async fn start(&mut self, _request: &AdvertiseRequest) -> Result<(), AdvertiseError> {
        warn!("BLE advertising is not available in this build");
        Err(AdvertiseError::FeatureUnsupported)
    }

    async fn stop(&mut self) -> Result<(), AdvertiseError> {
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        false
    }
}
