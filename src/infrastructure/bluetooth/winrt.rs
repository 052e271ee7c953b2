//! WinRT advertiser
//!
//! Broadcasts through `BluetoothLEAdvertisementPublisher`. The publisher is
//! non-connectable and cannot carry a local name; the radio picks the
//! advertising interval, so the requested mode only shows up in the logs.

use super::Advertiser;
use crate::domain::capability::{CapabilityReport, PermissionSet};
use crate::domain::errors::AdvertiseError;
use crate::domain::ibeacon::IBEACON_COMPANY_ID;
use crate::domain::models::AdvertiseRequest;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use windows::core::{Interface, GUID};
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementPublisher, BluetoothLEAdvertisementPublisherStatus,
    BluetoothLEAdvertisementPublisherStatusChangedEventArgs, BluetoothLEManufacturerData,
};
use windows::Devices::Bluetooth::{BluetoothAdapter, BluetoothError};
use windows::Devices::Radios::{Radio, RadioAccessStatus, RadioState};
use windows::Foundation::{IReference, PropertyValue, TypedEventHandler};
use windows::Storage::Streams::DataWriter;

/// How long the publisher may sit in `Waiting` before we give up.
const START_TIMEOUT: Duration = Duration::from_secs(5);

fn internal(e: windows::core::Error) -> AdvertiseError {
    AdvertiseError::InternalError(e.message().to_string())
}

/// Translate the error attached to an aborted publisher.
fn map_bluetooth_error(error: BluetoothError) -> AdvertiseError {
    match error {
        BluetoothError::RadioNotAvailable => AdvertiseError::BluetoothDisabled,
        BluetoothError::ResourceInUse => AdvertiseError::TooManyAdvertisers,
        BluetoothError::NotSupported | BluetoothError::TransportNotSupported => {
            AdvertiseError::FeatureUnsupported
        }
        BluetoothError::DisabledByPolicy
        | BluetoothError::DisabledByUser
        | BluetoothError::ConsentRequired => AdvertiseError::PermissionDenied,
        BluetoothError::DeviceNotConnected => AdvertiseError::AdapterUnavailable,
        other => AdvertiseError::InternalError(format!("{:?}", other)),
    }
}

pub struct WinRtAdvertiser {
    publisher: Option<BluetoothLEAdvertisementPublisher>,
}

impl WinRtAdvertiser {
    pub fn new() -> Self {
        Self { publisher: None }
    }

    async fn default_adapter(&self) -> Option<BluetoothAdapter> {
        match BluetoothAdapter::GetDefaultAsync() {
            Ok(op) => op.await.ok(),
            Err(e) => {
                warn!("Could not query default Bluetooth adapter: {}", e);
                None
            }
        }
    }

    fn build_publisher(
        &self,
        request: &AdvertiseRequest,
    ) -> Result<BluetoothLEAdvertisementPublisher, AdvertiseError> {
        let publisher = BluetoothLEAdvertisementPublisher::new().map_err(internal)?;
        let advertisement = publisher.Advertisement().map_err(internal)?;

        match &request.data.ibeacon {
            Some(frame) => {
                let writer = DataWriter::new().map_err(internal)?;
                writer.WriteBytes(&frame.to_bytes()).map_err(internal)?;
                let buffer = writer.DetachBuffer().map_err(internal)?;
                let manufacturer_data =
                    BluetoothLEManufacturerData::Create(IBEACON_COMPANY_ID, &buffer)
                        .map_err(internal)?;
                advertisement
                    .ManufacturerData()
                    .map_err(internal)?
                    .Append(&manufacturer_data)
                    .map_err(internal)?;
            }
            None => {
                let guid = GUID::from_u128(request.data.service_uuid.as_u128());
                advertisement
                    .ServiceUuids()
                    .map_err(internal)?
                    .Append(&guid)
                    .map_err(internal)?;
            }
        }

        let dbm = request.settings.tx_power.dbm();
        let power = PropertyValue::CreateInt16(dbm)
            .and_then(|value| value.cast::<IReference<i16>>())
            .map_err(internal)?;
        publisher
            .SetPreferredTransmitPowerLevelInDBm(&power)
            .map_err(internal)?;

        debug!(
            "Publisher configured: {} dBm, requested interval {:?} (chosen by the radio)",
            dbm,
            request.settings.mode.interval()
        );
        Ok(publisher)
    }
}

#[async_trait]
impl Advertiser for WinRtAdvertiser {
    fn name(&self) -> &'static str {
        "winrt"
    }

    async fn capabilities(&mut self) -> CapabilityReport {
        let Some(adapter) = self.default_adapter().await else {
            return CapabilityReport::no_adapter();
        };

        let advertising_supported = adapter.IsPeripheralRoleSupported().unwrap_or(false);

        let powered = match adapter.GetRadioAsync() {
            Ok(op) => match op.await {
                Ok(radio) => radio.State().map(|s| s == RadioState::On).unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        };

        let granted = match Radio::RequestAccessAsync() {
            Ok(op) => match op.await {
                Ok(status) => status != RadioAccessStatus::DeniedByUser
                    && status != RadioAccessStatus::DeniedBySystem,
                Err(_) => true,
            },
            Err(_) => true,
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
        if self.publisher.is_some() {
            return Err(AdvertiseError::AlreadyStarted);
        }
        if request.settings.connectable || request.data.include_device_name {
            warn!("Connectable or named advertisements need a GATT service provider");
            return Err(AdvertiseError::FeatureUnsupported);
        }
        let publisher = self.build_publisher(request)?;

        let (status_tx, mut status_rx) = mpsc::unbounded_channel();
        let handler = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementPublisher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementPublisherStatusChangedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let _ = status_tx.send((args.Status()?, args.Error()?));
                }
                Ok(())
            },
        );
        publisher.StatusChanged(&handler).map_err(internal)?;
        publisher.Start().map_err(internal)?;

        let outcome = tokio::time::timeout(START_TIMEOUT, async {
            while let Some((status, error)) = status_rx.recv().await {
                debug!("Publisher status: {:?} ({:?})", status, error);
                match status {
                    BluetoothLEAdvertisementPublisherStatus::Started => return Ok(()),
                    BluetoothLEAdvertisementPublisherStatus::Aborted => {
                        return Err(map_bluetooth_error(error))
                    }
                    _ => continue,
                }
            }
            Err(AdvertiseError::InternalError(
                "publisher status stream closed".to_string(),
            ))
        })
        .await
        .unwrap_or_else(|_| {
            Err(AdvertiseError::InternalError(
                "publisher did not start in time".to_string(),
            ))
        });

        match outcome {
            Ok(()) => {
                info!("WinRT publisher started");
                self.publisher = Some(publisher);
                Ok(())
            }
            Err(e) => {
                let _ = publisher.Stop();
                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> Result<(), AdvertiseError> {
        if let Some(publisher) = self.publisher.take() {
            publisher.Stop().map_err(internal)?;
            info!("WinRT publisher stopped");
        }
        Ok(())
    }

    fn is_advertising(&self) -> bool {
        self.publisher.is_some()
    }
}
