//! What the host Bluetooth stack can do right now.

/// Permissions the advertiser depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Advertise,
    Connect,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet {
    pub advertise: PermissionStatus,
    pub connect: PermissionStatus,
    pub location: PermissionStatus,
}

impl PermissionSet {
    /// Desktop stacks gate advertise/connect together and never need location.
    pub fn radio_access(granted: bool) -> Self {
        let status = if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        Self {
            advertise: status,
            connect: status,
            location: PermissionStatus::NotRequired,
        }
    }

    pub fn status(&self, permission: Permission) -> PermissionStatus {
        match permission {
            Permission::Advertise => self.advertise,
            Permission::Connect => self.connect,
            Permission::Location => self.location,
        }
    }

    pub fn denied(&self) -> Vec<Permission> {
        [Permission::Advertise, Permission::Connect, Permission::Location]
            .into_iter()
            .filter(|p| self.status(*p) == PermissionStatus::Denied)
            .collect()
    }

    pub fn all_granted(&self) -> bool {
        self.denied().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityReport {
    pub adapter_present: bool,
    pub powered: bool,
    pub advertising_supported: bool,
    pub permissions: PermissionSet,
}

impl CapabilityReport {
    #[cfg_attr(
        not(any(target_os = "windows", all(target_os = "linux", feature = "bluez"))),
        allow(dead_code)
    )]
    pub fn no_adapter() -> Self {
        Self {
            adapter_present: false,
            powered: false,
            advertising_supported: false,
            permissions: PermissionSet::radio_access(true),
        }
    }

    /// Checks run in the order the user would have to fix them.
    pub fn readiness(&self) -> Readiness {
        if !self.adapter_present {
            Readiness::NoAdapter
        } else if !self.advertising_supported {
            Readiness::AdvertisingUnsupported
        } else if !self.permissions.all_granted() {
            Readiness::PermissionDenied
        } else if !self.powered {
            Readiness::RadioOff
        } else {
            Readiness::Ready
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NoAdapter,
    AdvertisingUnsupported,
    PermissionDenied,
    RadioOff,
    Ready,
}

impl Readiness {
    /// Whether start/stop/save have to be disabled outright.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            Self::NoAdapter | Self::AdvertisingUnsupported | Self::PermissionDenied
        )
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NoAdapter => "Bluetooth is not supported on this device",
            Self::AdvertisingUnsupported => {
                "Bluetooth LE advertising is not supported on this device"
            }
            Self::PermissionDenied => "Required permissions not granted",
            Self::RadioOff => "Bluetooth is not enabled",
            Self::Ready => "Ready",
        }
    }
}
