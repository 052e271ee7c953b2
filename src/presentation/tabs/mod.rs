pub mod broadcast;
pub mod settings;
