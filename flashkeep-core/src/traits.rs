//! Settings store interface
//!
//! Settings (de)serializers walk their data through this trait, so the
//! same serializer works against any backing store.

use crate::error::StoreError;
use crate::field::StoreField;
use crate::store::CommitOutcome;

/// How [`SettingsStore::read_data`] treats the destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadMode {
    /// Copy stored bytes into the destination
    Load,
    /// Leave the destination untouched, only fold stored bytes into the checksum
    ///
    /// Lets a caller check the stored checksum before applying any values.
    Validate,
}

/// Session-based byte store with a caller-owned cursor and checksum
///
/// One session is `access_start`, any number of field accesses at
/// non-decreasing cursor positions, then `access_finish`. Every byte a
/// field access touches is folded into the caller's checksum exactly
/// once, in cursor order.
pub trait SettingsStore {
    /// Open a session, loading persisted content
    fn access_start(&mut self) -> Result<(), StoreError>;

    /// Close the session, persisting what was written
    fn access_finish(&mut self) -> Result<CommitOutcome, StoreError>;

    /// Write `value` at `*pos` and advance `*pos` past it
    fn write_data(&mut self, pos: &mut usize, value: &[u8], crc: &mut u16)
        -> Result<(), StoreError>;

    /// Read `value.len()` bytes at `*pos` and advance `*pos` past them
    fn read_data(
        &mut self,
        pos: &mut usize,
        value: &mut [u8],
        crc: &mut u16,
        mode: ReadMode,
    ) -> Result<(), StoreError>;

    /// Size of the store in bytes
    fn capacity(&self) -> usize;

    /// Write a fixed-size field
    fn write_field<T: StoreField>(
        &mut self,
        pos: &mut usize,
        value: &T,
        crc: &mut u16,
    ) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        self.write_data(pos, value.to_bytes().as_ref(), crc)
    }

    /// Read a fixed-size field
    ///
    /// In [`ReadMode::Validate`] the field keeps its current value.
    fn read_field<T: StoreField>(
        &mut self,
        pos: &mut usize,
        value: &mut T,
        crc: &mut u16,
        mode: ReadMode,
    ) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let mut bytes = value.to_bytes();
        self.read_data(pos, bytes.as_mut(), crc, mode)?;
        if mode == ReadMode::Load {
            *value = T::from_bytes(bytes);
        }
        Ok(())
    }

    /// Fold a stored field into the checksum without loading it
    ///
    /// `value` only supplies the field width.
    fn validate_field<T: StoreField>(
        &mut self,
        pos: &mut usize,
        value: &T,
        crc: &mut u16,
    ) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let mut bytes = value.to_bytes();
        self.read_data(pos, bytes.as_mut(), crc, ReadMode::Validate)
    }
}
