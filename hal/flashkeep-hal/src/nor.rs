//! Adapter from `embedded-storage` NOR flash drivers to [`FlashPrimitives`]
//!
//! Chip HALs (embassy-stm32 and friends) expose their internal flash as
//! [`NorFlash`] with offsets relative to the start of flash. This adapter
//! translates the store's absolute addresses into those offsets.
//!
//! NOR flash drivers unlock and lock the controller around each operation
//! themselves, so [`FlashPrimitives::unlock`]/[`FlashPrimitives::lock`]
//! only gate whether erase/program are accepted.

use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash};

use crate::flash::{FlashError, FlashPrimitives, UNIT_SIZE};

/// [`FlashPrimitives`] over any [`NorFlash`] driver
pub struct NorFlashPrimitives<F> {
    flash: F,
    /// Absolute address of offset 0 of the driver
    flash_base: u32,
    /// Size of one erasable page in bytes
    page_size: u32,
    unlocked: bool,
}

impl<F: NorFlash> NorFlashPrimitives<F> {
    /// Wrap a NOR flash driver
    ///
    /// # Arguments
    /// * `flash` - Driver whose offset 0 sits at `flash_base`
    /// * `flash_base` - Absolute address of the start of flash
    /// * `page_size` - Erase page size of the region the store lives in
    pub fn new(flash: F, flash_base: u32, page_size: u32) -> Self {
        Self {
            flash,
            flash_base,
            page_size,
            unlocked: false,
        }
    }

    /// Get the wrapped driver
    pub fn inner(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the wrapped driver
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn offset(&self, address: u32) -> Result<u32, FlashError> {
        address
            .checked_sub(self.flash_base)
            .ok_or(FlashError::OutOfBounds)
    }

    fn check_unlocked(&self) -> Result<(), FlashError> {
        if self.unlocked {
            Ok(())
        } else {
            Err(FlashError::Locked)
        }
    }
}

/// Map a driver error, using `other` for anything not alignment or bounds
fn map_error<E: NorFlashError>(error: E, other: FlashError) -> FlashError {
    match error.kind() {
        NorFlashErrorKind::NotAligned => FlashError::NotAligned,
        NorFlashErrorKind::OutOfBounds => FlashError::OutOfBounds,
        _ => other,
    }
}

impl<F: NorFlash> FlashPrimitives for NorFlashPrimitives<F> {
    fn unlock(&mut self) {
        self.unlocked = true;
    }

    fn lock(&mut self) {
        self.unlocked = false;
    }

    fn erase_page(&mut self, page_base: u32) -> Result<(), FlashError> {
        self.check_unlocked()?;
        let from = self.offset(page_base)?;
        if from % self.page_size != 0 {
            return Err(FlashError::NotAligned);
        }
        let to = from
            .checked_add(self.page_size)
            .ok_or(FlashError::OutOfBounds)?;

        self.flash
            .erase(from, to)
            .map_err(|e| map_error(e, FlashError::Erase))
    }

    fn program_unit(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        self.check_unlocked()?;
        // A half-word cannot be written through a driver with a wider write granule
        if F::WRITE_SIZE > UNIT_SIZE || address % UNIT_SIZE as u32 != 0 {
            return Err(FlashError::NotAligned);
        }
        let offset = self.offset(address)?;

        self.flash
            .write(offset, &value.to_le_bytes())
            .map_err(|e| map_error(e, FlashError::Program))
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let offset = self.offset(address)?;

        self.flash
            .read(offset, buf)
            .map_err(|e| map_error(e, FlashError::Read))
    }
}
