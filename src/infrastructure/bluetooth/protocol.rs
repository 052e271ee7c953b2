//! Advertising payload sizing
//!
//! Legacy advertising PDUs carry at most 31 bytes of AD structures. Each AD
//! structure costs a length byte and a type byte on top of its payload.

use crate::domain::errors::AdvertiseError;
use crate::domain::ibeacon::IBEACON_FRAME_LEN;
use crate::domain::models::AdvertiseData;

/// Maximum AD payload of a legacy advertisement.
pub const LEGACY_ADV_MAX_LEN: usize = 31;

/// Flags AD structure, added by every stack.
pub const FLAGS_AD_LEN: usize = 3;

/// Complete list of 128-bit service UUIDs holding one UUID.
pub const SERVICE_UUID_AD_LEN: usize = 2 + 16;

/// Manufacturer data carrying an iBeacon frame (company id + frame).
pub const IBEACON_AD_LEN: usize = 2 + 2 + IBEACON_FRAME_LEN;

/// Bytes `data` needs in the advertising PDU.
pub fn payload_len(data: &AdvertiseData, device_name_len: usize) -> usize {
    let mut len = FLAGS_AD_LEN;
    len += if data.ibeacon.is_some() {
        IBEACON_AD_LEN
    } else {
        SERVICE_UUID_AD_LEN
    };
    if data.include_device_name {
        len += 2 + device_name_len;
    }
    len
}

/// Reject payloads that cannot fit a legacy advertisement.
pub fn check_legacy_payload(
    data: &AdvertiseData,
    device_name_len: usize,
) -> Result<(), AdvertiseError> {
    let len = payload_len(data, device_name_len);
    if len > LEGACY_ADV_MAX_LEN {
        tracing::warn!(
            "Advertising payload is {} bytes (max {})",
            len,
            LEGACY_ADV_MAX_LEN
        );
        return Err(AdvertiseError::DataTooLarge);
    }
    Ok(())
}
