//! Serialized settings records
//!
//! Stores a `serde` value as a little-endian `u16` length followed by its
//! postcard encoding. Records go through the regular cursor API, so they
//! count towards the checksum and the high-water mark like any field.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RecordError, StoreError};
use crate::traits::{ReadMode, SettingsStore};

/// Maximum encoded record size
pub const MAX_RECORD_SIZE: usize = 256;

/// Bytes taken by the length prefix
const LENGTH_SIZE: usize = core::mem::size_of::<u16>();

/// Write `value` as a length-prefixed record at `*pos`
///
/// Returns the encoded length, excluding the prefix.
pub fn write_record<S, T>(
    store: &mut S,
    pos: &mut usize,
    value: &T,
    crc: &mut u16,
) -> Result<usize, StoreError>
where
    S: SettingsStore,
    T: Serialize + ?Sized,
{
    let mut buffer = [0u8; MAX_RECORD_SIZE];
    let bytes = postcard::to_slice(value, &mut buffer).map_err(|e| match e {
        postcard::Error::SerializeBufferFull => RecordError::TooLarge,
        _ => RecordError::Serialize,
    })?;
    let len = bytes.len();

    // Prefix and payload land together or not at all
    let total = LENGTH_SIZE + len;
    if pos.checked_add(total).map_or(true, |end| end > store.capacity()) {
        return Err(StoreError::CapacityExceeded { pos: *pos, len: total });
    }

    store.write_field(pos, &(len as u16), crc)?;
    store.write_data(pos, bytes, crc)?;
    Ok(len)
}

/// Read a length-prefixed record at `*pos`
///
/// A length larger than [`MAX_RECORD_SIZE`] (for example the 0xFFFF of an
/// erased region) is rejected before any payload is read. `*pos` and
/// `*crc` only move when the whole record decodes.
pub fn read_record<S, T>(store: &mut S, pos: &mut usize, crc: &mut u16) -> Result<T, StoreError>
where
    S: SettingsStore,
    T: DeserializeOwned,
{
    let mut cursor = *pos;
    let mut sum = *crc;

    let mut len = 0u16;
    store.read_field(&mut cursor, &mut len, &mut sum, ReadMode::Load)?;
    let len = len as usize;
    if len > MAX_RECORD_SIZE {
        store_log!(warn, "store: record length {} at {} exceeds maximum", len, *pos);
        return Err(RecordError::TooLarge.into());
    }

    let mut buffer = [0u8; MAX_RECORD_SIZE];
    store.read_data(&mut cursor, &mut buffer[..len], &mut sum, ReadMode::Load)?;
    let value = postcard::from_bytes(&buffer[..len]).map_err(|_| RecordError::Deserialize)?;

    *pos = cursor;
    *crc = sum;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CommitOutcome, PersistentStore};
    use flashkeep_hal::{MockFlash, StoreLayout};
    use serde::Deserialize;

    const BASE: u32 = 0x0800_F800;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tuning {
        steps_per_mm: [f32; 3],
        max_feedrate: u16,
        inverted: bool,
    }

    fn store() -> PersistentStore<MockFlash, 1024> {
        let flash = MockFlash::new(BASE, 512, 2);
        PersistentStore::new(flash, StoreLayout::new(BASE, 512)).unwrap()
    }

    #[test]
    fn test_record_roundtrip_through_flash() {
        let tuning = Tuning {
            steps_per_mm: [80.0, 80.0, 400.0],
            max_feedrate: 300,
            inverted: true,
        };

        let mut store = store();
        store.access_start().unwrap();
        let mut pos = 0;
        let mut write_crc = 0;
        let len = write_record(&mut store, &mut pos, &tuning, &mut write_crc).unwrap();
        assert_eq!(pos, 2 + len);
        store.access_finish().unwrap();

        store.access_start().unwrap();
        let mut pos = 0;
        let mut read_crc = 0;
        let loaded: Tuning = read_record(&mut store, &mut pos, &mut read_crc).unwrap();
        store.access_finish().unwrap();

        assert_eq!(loaded, tuning);
        assert_eq!(read_crc, write_crc);
    }

    #[test]
    fn test_blank_region_rejected() {
        let mut store = store();
        store.access_start().unwrap();

        let mut pos = 0;
        let mut crc = 0;
        let result: Result<Tuning, _> = read_record(&mut store, &mut pos, &mut crc);
        assert_eq!(result, Err(StoreError::Record(RecordError::TooLarge)));
    }

    #[test]
    fn test_oversized_record_rejected() {
        let mut store = store();
        store.access_start().unwrap();

        let mut pos = 0;
        let mut crc = 0;
        let big = [0u32; MAX_RECORD_SIZE];
        let result = write_record(&mut store, &mut pos, &big[..], &mut crc);
        assert_eq!(result, Err(StoreError::Record(RecordError::TooLarge)));
        assert_eq!(pos, 0);
    }

    #[test]
    fn test_record_past_end_leaves_state() {
        let mut store = store();
        store.access_start().unwrap();

        // Prefix fits, the 9-byte encoding (varint length + 8) does not
        let mut pos = 1020;
        let mut crc = 0x1234;
        let result = write_record(&mut store, &mut pos, &[7u8; 8][..], &mut crc);
        assert_eq!(
            result,
            Err(StoreError::CapacityExceeded { pos: 1020, len: 11 })
        );
        assert_eq!(pos, 1020);
        assert_eq!(crc, 0x1234);
        assert_eq!(store.high_water_mark(), 0);
        assert_eq!(store.access_finish(), Ok(CommitOutcome::Unchanged));
        assert_eq!(store.flash().erase_count(), 0);
    }

    #[test]
    fn test_truncated_record_read_leaves_cursor() {
        let mut store = store();
        // Length 8 stored two bytes before the end of the region
        store.flash_mut().preload(BASE + 1022, &[8, 0]);
        store.access_start().unwrap();

        let mut pos = 1022;
        let mut crc = 0x1234;
        let result: Result<Tuning, _> = read_record(&mut store, &mut pos, &mut crc);
        assert_eq!(
            result,
            Err(StoreError::CapacityExceeded { pos: 1024, len: 8 })
        );
        assert_eq!(pos, 1022);
        assert_eq!(crc, 0x1234);
    }
}
