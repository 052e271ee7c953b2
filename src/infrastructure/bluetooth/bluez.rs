//! BlueZ advertiser using bluer
//!
//! Registers an LE advertisement with bluetoothd over D-Bus. Dropping the
//! advertisement handle unregisters it.

use super::{protocol, Advertiser};
use crate::domain::capability::{CapabilityReport, PermissionSet};
use crate::domain::errors::AdvertiseError;
use crate::domain::ibeacon::IBEACON_COMPANY_ID;
use crate::domain::models::AdvertiseRequest;
use async_trait::async_trait;
use bluer::adv::{Advertisement, AdvertisementHandle, Type};
use tracing::{debug, info, warn};

fn map_bluer_error(err: bluer::Error) -> AdvertiseError {
    match err.kind {
        bluer::ErrorKind::AlreadyExists => AdvertiseError::AlreadyStarted,
        bluer::ErrorKind::InvalidLength => AdvertiseError::DataTooLarge,
        bluer::ErrorKind::NotSupported => AdvertiseError::FeatureUnsupported,
        bluer::ErrorKind::NotAuthorized | bluer::ErrorKind::NotPermitted => {
            AdvertiseError::PermissionDenied
        }
        bluer::ErrorKind::NotReady => AdvertiseError::BluetoothDisabled,
        bluer::ErrorKind::NotFound => AdvertiseError::AdapterUnavailable,
        _ => AdvertiseError::InternalError(err.message),
    }
}

pub struct BluezAdvertiser {
    session: Option<bluer::Session>,
    adapter: Option<bluer::Adapter>,
    handle: Option<AdvertisementHandle>,
}

impl BluezAdvertiser {
    pub fn new() -> Self {
        Self {
            session: None,
            adapter: None,
            handle: None,
        }
    }

    async fn adapter(&mut self) -> Result<bluer::Adapter, AdvertiseError> {
        if let Some(adapter) = &self.adapter {
            return Ok(adapter.clone());
        }

        let session = bluer::Session::new().await.map_err(|e| {
            warn!("BlueZ session unavailable: {}", e);
            AdvertiseError::AdapterUnavailable
        })?;
        let adapter = session.default_adapter().await.map_err(|e| {
            warn!("No default BlueZ adapter: {}", e);
            AdvertiseError::AdapterUnavailable
        })?;

        info!("Using Bluetooth adapter {}", adapter.name());
        self.session = Some(session);
        self.adapter = Some(adapter.clone());
        Ok(adapter)
    }

    fn build_advertisement(request: &AdvertiseRequest, local_name: Option<String>) -> Advertisement {
        let settings = &request.settings;
        let data = &request.data;

        let (service_uuids, manufacturer_data) = match &data.ibeacon {
            Some(frame) => (
                Vec::new(),
                vec![(IBEACON_COMPANY_ID, frame.to_bytes().to_vec())],
            ),
            None => (vec![data.service_uuid], Vec::new()),
        };

        Advertisement {
            advertisement_type: if settings.connectable {
                Type::Peripheral
            } else {
                Type::Broadcast
            },
            service_uuids: service_uuids.into_iter().collect(),
            manufacturer_data: manufacturer_data.into_iter().collect(),
            local_name,
            min_interval: Some(settings.mode.interval()),
            max_interval: Some(settings.mode.interval()),
            tx_power: Some(settings.tx_power.dbm()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Advertiser for BluezAdvertiser {
    fn name(&self) -> &'static str {
        "bluez"
    }

    async fn capabilities(&mut self) -> CapabilityReport {
        let adapter = match self.adapter().await {
            Ok(adapter) => adapter,
            Err(_) => return CapabilityReport::no_adapter(),
        };

        let powered = adapter.is_powered().await.unwrap_or(false);
        let (advertising_supported, granted) = match adapter.supported_advertising_instances().await
        {
            Ok(instances) => (instances > 0, true),
            Err(e) => match map_bluer_error(e) {
                AdvertiseError::PermissionDenied => (true, false),
                other => {
                    debug!("Advertising instances unknown: {}", other);
                    (false, true)
                }
            },
        };

        let report = CapabilityReport {
            adapter_present: true,
            powered,
            advertising_supported,
            permissions: PermissionSet::radio_access(granted),
        };
        info!("Bluetooth capabilities: {:?}", report);
        report
    }

    async fn start(&mut self, request: &AdvertiseRequest) -> Result<(), AdvertiseError> {
        if self.handle.is_some() {
            return Err(AdvertiseError::AlreadyStarted);
        }

        let adapter = self.adapter().await?;
        if !adapter.is_powered().await.map_err(map_bluer_error)? {
            return Err(AdvertiseError::BluetoothDisabled);
        }

        let active = adapter
            .active_advertising_instances()
            .await
            .map_err(map_bluer_error)?;
        let supported = adapter
            .supported_advertising_instances()
            .await
            .map_err(map_bluer_error)?;
        if supported == 0 {
            return Err(AdvertiseError::FeatureUnsupported);
        }
        if active >= supported {
            return Err(AdvertiseError::TooManyAdvertisers);
        }

        let local_name = if request.data.include_device_name {
            Some(adapter.alias().await.map_err(map_bluer_error)?)
        } else {
            None
        };
        let name_len = local_name.as_ref().map_or(0, String::len);
        protocol::check_legacy_payload(&request.data, name_len)?;

        let advertisement = Self::build_advertisement(request, local_name);
        debug!("Registering advertisement: {:?}", advertisement);
        let handle = adapter
            .advertise(advertisement)
            .await
            .map_err(map_bluer_error)?;

        info!("BlueZ advertisement registered on {}", adapter.name());
        self.handle = Some(handle);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), AdvertiseError> {
        if let Some(handle) = self.handle.take() {
            drop(handle);
            info!("BlueZ advertisement removed");
        }
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.handle.is_some()
    }
}
