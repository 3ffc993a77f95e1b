//! Flash primitive abstractions
//!
//! Raw program flash can only be erased a whole page at a time and
//! programmed one half-word at a time. Programming only clears bits; the
//! only way back to [`ERASED_BYTE`] is a page erase.

use core::ops::{Deref, DerefMut};

/// Value every byte of a page holds after erase
pub const ERASED_BYTE: u8 = 0xFF;

/// Width of one program unit in bytes
pub const UNIT_SIZE: usize = 2;

/// Errors reported by flash primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Controller is locked against erase/program
    Locked,
    /// Address outside the flash device
    OutOfBounds,
    /// Address not aligned to a page (erase) or unit (program)
    NotAligned,
    /// Page erase failed
    Erase,
    /// Unit program failed
    Program,
    /// Read failed
    Read,
}

/// Flash controller primitives
///
/// All operations are synchronous and blocking: they return only once the
/// hardware has completed or reported failure. Addresses are absolute
/// (the same addresses the CPU reads the memory-mapped flash at).
pub trait FlashPrimitives {
    /// Unlock the controller for erase/program
    fn unlock(&mut self);

    /// Lock the controller again
    fn lock(&mut self);

    /// Erase the page starting at `page_base`
    fn erase_page(&mut self, page_base: u32) -> Result<(), FlashError>;

    /// Program one half-word at `address`
    ///
    /// `address` must be half-word aligned. The value is stored
    /// little-endian, so the low byte lands at `address`.
    fn program_unit(&mut self, address: u32, value: u16) -> Result<(), FlashError>;

    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError>;

    /// Unlock the controller, locking it again when the guard drops
    fn unlocked(&mut self) -> Unlocked<'_, Self>
    where
        Self: Sized,
    {
        self.unlock();
        Unlocked { flash: self }
    }
}

impl<T: FlashPrimitives + ?Sized> FlashPrimitives for &mut T {
    fn unlock(&mut self) {
        (**self).unlock()
    }

    fn lock(&mut self) {
        (**self).lock()
    }

    fn erase_page(&mut self, page_base: u32) -> Result<(), FlashError> {
        (**self).erase_page(page_base)
    }

    fn program_unit(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        (**self).program_unit(address, value)
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        (**self).read(address, buf)
    }
}

/// An unlocked flash controller
///
/// Locks the controller on drop, so an early return out of an
/// erase/program sequence still leaves the controller locked.
pub struct Unlocked<'a, F: FlashPrimitives> {
    flash: &'a mut F,
}

impl<F: FlashPrimitives> Deref for Unlocked<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.flash
    }
}

impl<F: FlashPrimitives> DerefMut for Unlocked<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.flash
    }
}

impl<F: FlashPrimitives> Drop for Unlocked<'_, F> {
    fn drop(&mut self) {
        self.flash.lock();
    }
}
