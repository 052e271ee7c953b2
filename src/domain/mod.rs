pub mod beacon;
pub mod capability;
pub mod errors;
pub mod ibeacon;
pub mod models;
pub mod preset;
pub mod service_uuid;
pub mod settings;
