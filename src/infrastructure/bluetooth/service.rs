//! Advertiser Service Module
//!
//! Owns the platform advertiser on a dedicated thread and turns UI commands
//! into advertiser calls, reporting every outcome back as an [`AppEvent`].

use super::{protocol, Advertiser};
use crate::domain::errors::AdvertiseError;
use crate::domain::models::{
    AdvertiseRequest, AdvertiserCommand, AppEvent, MessageSeverity, StatusMessage,
};
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub struct AdvertiserService {
    advertiser: Box<dyn Advertiser>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    /// When the running advertisement has to be stopped.
    deadline: Option<Instant>,
}

impl AdvertiserService {
    pub fn new(
        advertiser: Box<dyn Advertiser>,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            advertiser,
            event_sender,
            deadline: None,
        }
    }

    fn emit(&self, event: AppEvent) {
        if self.event_sender.send(event).is_err() {
            debug!("UI is gone, dropping advertiser event");
        }
    }

    pub async fn check_capabilities(&mut self) {
        let report = self.advertiser.capabilities().await;
        self.emit(AppEvent::Capabilities(report));
    }

    pub async fn start(&mut self, request: AdvertiseRequest) {
        if self.advertiser.is_advertising() {
            warn!("Start requested while already advertising");
            self.emit(AppEvent::AdvertiseFailed(AdvertiseError::AlreadyStarted));
            return;
        }

        // The device name is only known to the backend; it re-checks with it.
        if let Err(e) = protocol::check_legacy_payload(&request.data, 0) {
            self.emit(AppEvent::AdvertiseFailed(e));
            return;
        }

        info!(
            "Starting advertisement via {} for {} (connectable={})",
            self.advertiser.name(),
            request.data.service_uuid,
            request.settings.connectable
        );
        match self.advertiser.start(&request).await {
            Ok(()) => {
                self.deadline = request.settings.timeout.map(|t| Instant::now() + t);
                self.emit(AppEvent::AdvertiseStarted(request));
            }
            Err(e) => {
                error!("Advertising failed to start: {} (code {:?})", e, e.code());
                self.emit(AppEvent::AdvertiseFailed(e));
            }
        }
    }

    pub async fn stop(&mut self, timed_out: bool) {
        self.deadline = None;
        if !self.advertiser.is_advertising() {
            debug!("Stop requested while idle");
            return;
        }

        let result = self.advertiser.stop().await;
        info!("Advertisement stopped (timed_out={})", timed_out);
        self.emit(AppEvent::AdvertiseStopped { timed_out });

        if let Err(e) = result {
            error!("Failed to stop advertising cleanly: {}", e);
            self.emit(AppEvent::LogMessage(StatusMessage::new(
                format!("Failed to stop advertising cleanly: {}", e.user_message()),
                MessageSeverity::Warning,
            )));
        }
    }

    pub async fn handle(&mut self, command: AdvertiserCommand) {
        match command {
            AdvertiserCommand::CheckCapabilities => self.check_capabilities().await,
            AdvertiserCommand::Start(request) => self.start(request).await,
            AdvertiserCommand::Stop => self.stop(false).await,
        }
    }

    /// Process commands until every sender is dropped, then stop advertising.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<AdvertiserCommand>) {
        loop {
            let command = match self.deadline {
                Some(deadline) => {
                    tokio::select! {
                        command = commands.recv() => command,
                        _ = tokio::time::sleep_until(deadline) => {
                            self.stop(true).await;
                            continue;
                        }
                    }
                }
                None => commands.recv().await,
            };

            match command {
                Some(command) => self.handle(command).await,
                None => break,
            }
        }

        if self.advertiser.is_advertising() {
            info!("Command channel closed, stopping advertisement");
            if let Err(e) = self.advertiser.stop().await {
                error!("Failed to stop advertising on shutdown: {}", e);
            }
        }
    }
}

/// UI-side end of the advertiser worker.
pub struct AdvertiserHandle {
    commands: Option<mpsc::UnboundedSender<AdvertiserCommand>>,
    events: mpsc::UnboundedReceiver<AppEvent>,
    worker: Option<JoinHandle<()>>,
}

impl AdvertiserHandle {
    pub fn spawn(advertiser: Box<dyn Advertiser>) -> anyhow::Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let worker = std::thread::Builder::new()
            .name("ble-advertiser".to_string())
            .spawn(move || {
                runtime.block_on(AdvertiserService::new(advertiser, event_tx).run(command_rx));
            })?;

        Ok(Self {
            commands: Some(command_tx),
            events: event_rx,
            worker: Some(worker),
        })
    }

    pub fn send(&self, command: AdvertiserCommand) {
        let sent = self
            .commands
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok());
        if !sent {
            error!("Advertiser worker is not running");
        }
    }

    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.events.try_recv().ok()
    }

    /// Close the command channel and wait for the worker to stop advertising.
    pub fn shutdown(&mut self) {
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Advertiser worker panicked");
            }
        }
    }
}

impl Drop for AdvertiserHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capability::{CapabilityReport, PermissionSet};
    use crate::domain::models::{AdvertiseData, AdvertiseSettings};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use uuid::Uuid;

    /// Records calls and fails `start` with `fail_with` when set.
    struct MockAdvertiser {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_with: Option<AdvertiseError>,
        stop_error: Option<AdvertiseError>,
        advertising: bool,
    }

    impl MockAdvertiser {
        fn new(fail_with: Option<AdvertiseError>) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    fail_with,
                    stop_error: None,
                    advertising: false,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Advertiser for MockAdvertiser {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn capabilities(&mut self) -> CapabilityReport {
            self.calls.lock().unwrap().push("capabilities");
            CapabilityReport {
                adapter_present: true,
                powered: true,
                advertising_supported: true,
                permissions: PermissionSet::radio_access(true),
            }
        }

        async fn start(&mut self, _request: &AdvertiseRequest) -> Result<(), AdvertiseError> {
            self.calls.lock().unwrap().push("start");
            match self.fail_with.clone() {
                Some(e) => Err(e),
                None => {
                    self.advertising = true;
                    Ok(())
                }
            }
        }

        async fn stop(&mut self) -> Result<(), AdvertiseError> {
            self.calls.lock().unwrap().push("stop");
            self.advertising = false;
            match self.stop_error.clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn is_advertising(&self) -> bool {
            self.advertising
        }
    }

    fn request(timeout: Option<Duration>) -> AdvertiseRequest {
        AdvertiseRequest {
            settings: AdvertiseSettings {
                timeout,
                ..AdvertiseSettings::default()
            },
            data: AdvertiseData {
                service_uuid: Uuid::from_u128(7),
                include_device_name: false,
                ibeacon: None,
            },
        }
    }

    fn service(
        fail_with: Option<AdvertiseError>,
    ) -> (
        AdvertiserService,
        mpsc::UnboundedReceiver<AppEvent>,
        Arc<Mutex<Vec<&'static str>>>,
    ) {
        let (mock, calls) = MockAdvertiser::new(fail_with);
        let (tx, rx) = mpsc::unbounded_channel();
        (AdvertiserService::new(Box::new(mock), tx), rx, calls)
    }

    #[tokio::test]
    async fn test_start_reports_request_in_effect() {
        let (mut service, mut events, _) = service(None);
        service.start(request(None)).await;

        match events.try_recv().unwrap() {
            AppEvent::AdvertiseStarted(started) => {
                assert_eq!(started, request(None))
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_start_is_already_started() {
        let (mut service, mut events, calls) = service(None);
        service.start(request(None)).await;
        service.start(request(None)).await;

        assert!(matches!(events.try_recv(), Ok(AppEvent::AdvertiseStarted(_))));
        assert!(matches!(
            events.try_recv(),
            Ok(AppEvent::AdvertiseFailed(AdvertiseError::AlreadyStarted))
        ));
        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    }

    #[tokio::test]
    async fn test_backend_failure_is_forwarded() {
        let (mut service, mut events, _) = service(Some(AdvertiseError::DataTooLarge));
        service.start(request(None)).await;

        assert!(matches!(
            events.try_recv(),
            Ok(AppEvent::AdvertiseFailed(AdvertiseError::DataTooLarge))
        ));
    }

    #[tokio::test]
    async fn test_oversized_payload_never_reaches_backend() {
        let (mut service, mut events, calls) = service(None);
        let mut request = request(None);
        request.data.include_device_name = true;
        request.data.ibeacon = Some(crate::domain::ibeacon::IBeaconFrame {
            proximity_uuid: request.data.service_uuid,
            major: 1,
            minor: 100,
            measured_power: -59,
        });

        service.start(request).await;

        assert!(matches!(
            events.try_recv(),
            Ok(AppEvent::AdvertiseFailed(AdvertiseError::DataTooLarge))
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_silent() {
        let (mut service, mut events, calls) = service(None);
        service.handle(AdvertiserCommand::Stop).await;

        assert!(events.try_recv().is_err());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_reports_stopped() {
        let (mut service, mut events, _) = service(None);
        service.handle(AdvertiserCommand::Start(request(None))).await;
        service.handle(AdvertiserCommand::Stop).await;

        assert!(matches!(events.try_recv(), Ok(AppEvent::AdvertiseStarted(_))));
        assert!(matches!(
            events.try_recv(),
            Ok(AppEvent::AdvertiseStopped { timed_out: false })
        ));
    }

    #[tokio::test]
    async fn test_timeout_stops_advertisement() {
        let (service, mut events, _) = service(None);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(service.run(command_rx));

        commands
            .send(AdvertiserCommand::Start(request(Some(Duration::from_millis(50)))))
            .unwrap();

        let started = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap();
        assert!(matches!(started, Some(AppEvent::AdvertiseStarted(_))));

        let stopped = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap();
        assert!(matches!(
            stopped,
            Some(AppEvent::AdvertiseStopped { timed_out: true })
        ));

        drop(commands);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_closing_channel_stops_advertiser() {
        let (service, _events, calls) = service(None);
        let (commands, command_rx) = mpsc::unbounded_channel();
        commands
            .send(AdvertiserCommand::Start(request(None)))
            .unwrap();
        drop(commands);

        service.run(command_rx).await;

        assert_eq!(*calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[tokio::test]
    async fn test_failed_stop_still_reports_stopped() {
        let (mut mock, calls) = MockAdvertiser::new(None);
        mock.stop_error = Some(AdvertiseError::InternalError("busy".to_string()));
        let (tx, mut events) = mpsc::unbounded_channel();
        let mut service = AdvertiserService::new(Box::new(mock), tx);

        service.handle(AdvertiserCommand::Start(request(None))).await;
        service.handle(AdvertiserCommand::Stop).await;

        assert!(matches!(events.try_recv(), Ok(AppEvent::AdvertiseStarted(_))));
        assert!(matches!(
            events.try_recv(),
            Ok(AppEvent::AdvertiseStopped { timed_out: false })
        ));
        match events.try_recv() {
            Ok(AppEvent::LogMessage(message)) => {
                assert_eq!(message.severity, MessageSeverity::Warning);
                assert!(message.message.contains("busy"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(*calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[tokio::test]
    async fn test_failed_stop_on_shutdown_does_not_hang() {
        let (mut mock, calls) = MockAdvertiser::new(None);
        mock.stop_error = Some(AdvertiseError::AdapterUnavailable);
        let (tx, _events) = mpsc::unbounded_channel();
        let service = AdvertiserService::new(Box::new(mock), tx);
        let (commands, command_rx) = mpsc::unbounded_channel();
        commands
            .send(AdvertiserCommand::Start(request(None)))
            .unwrap();
        drop(commands);

        service.run(command_rx).await;

        assert_eq!(*calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[test]
    fn test_handle_round_trip_through_worker_thread() {
        let (mock, calls) = MockAdvertiser::new(None);
        let mut handle = AdvertiserHandle::spawn(Box::new(mock)).unwrap();
        handle.send(AdvertiserCommand::CheckCapabilities);

        let mut event = None;
        for _ in 0..200 {
            if let Some(e) = handle.try_recv() {
                event = Some(e);
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        match event {
            Some(AppEvent::Capabilities(report)) => assert!(report.advertising_supported),
            other => panic!("unexpected event {:?}", other),
        }

        handle.shutdown();
        assert_eq!(*calls.lock().unwrap(), vec!["capabilities"]);
    }
}
