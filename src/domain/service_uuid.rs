use crate::domain::errors::InputError;
use uuid::Uuid;

pub const DEFAULT_SERVICE_UUID: &str = "11111111-2222-3333-4444-555555555555";

/// Parse a 128-bit UUID typed into the form.
///
/// Only the hyphenated 8-4-4-4-12 layout is accepted, in either case.
pub fn parse_service_uuid(input: &str) -> Result<Uuid, InputError> {
    let input = input.trim();
    if input.len() != 36 {
        return Err(InputError::InvalidUuid);
    }
    Uuid::try_parse(input).map_err(|_| InputError::InvalidUuid)
}

/// Canonical lowercase hyphenated form.
pub fn format_service_uuid(uuid: &Uuid) -> String {
    uuid.hyphenated().to_string()
}

#[cfg(test)]
pub fn default_service_uuid() -> Uuid {
    Uuid::from_u128(0x11111111_2222_3333_4444_555555555555)
}
