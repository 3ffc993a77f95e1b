//! Flash driver binding for STM32F1
//!
//! Provides the store layout for the selected STM32F1 part and wraps
//! embassy-stm32's blocking flash driver as [`FlashPrimitives`].
//!
//! The store occupies the last two pages of flash, so application code
//! growing from the bottom never overlaps it.

use embassy_stm32::flash::{Blocking, Flash, FLASH_BASE};
use embassy_stm32::peripherals::FLASH;
use embassy_stm32::Peri;

// Re-export shared types from flashkeep-hal
pub use flashkeep_hal::flash::{FlashError, FlashPrimitives};
use flashkeep_hal::{NorFlashPrimitives, StoreLayout, PAGE_COUNT};

/// Flash geometry for STM32F103xE (high density)
#[cfg(feature = "stm32f103re")]
pub const FLASH_SIZE: usize = 512 * 1024; // 512KB
#[cfg(feature = "stm32f103re")]
pub const FLASH_PAGE_SIZE: usize = 2048; // 2KB pages

/// Flash geometry for STM32F103xB (medium density)
#[cfg(not(feature = "stm32f103re"))]
pub const FLASH_SIZE: usize = 128 * 1024; // 128KB
#[cfg(not(feature = "stm32f103re"))]
pub const FLASH_PAGE_SIZE: usize = 1024; // 1KB pages

/// Size of the settings region (two pages)
pub const STORE_SIZE: usize = PAGE_COUNT * FLASH_PAGE_SIZE;

/// Settings region placed in the last two pages of flash
pub const STORE_LAYOUT: StoreLayout = StoreLayout::last_pages(
    FLASH_BASE as u32,
    FLASH_SIZE as u32,
    FLASH_PAGE_SIZE as u32,
);

/// STM32F1 internal flash as store primitives
///
/// Owns the `FLASH` peripheral, so nothing else can touch the
/// controller while the store erases or programs it.
pub struct Stm32f1Flash<'d> {
    inner: NorFlashPrimitives<Flash<'d, Blocking>>,
}

impl<'d> Stm32f1Flash<'d> {
    /// Create the flash binding from the `FLASH` peripheral
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            inner: NorFlashPrimitives::new(
                Flash::new_blocking(flash),
                FLASH_BASE as u32,
                FLASH_PAGE_SIZE as u32,
            ),
        }
    }

    /// Get the raw flash driver for low-level access
    pub fn flash(&mut self) -> &mut Flash<'d, Blocking> {
        self.inner.inner()
    }
}

impl FlashPrimitives for Stm32f1Flash<'_> {
    fn unlock(&mut self) {
        self.inner.unlock();
    }

    fn lock(&mut self) {
        self.inner.lock();
    }

    fn erase_page(&mut self, page_base: u32) -> Result<(), FlashError> {
        self.inner.erase_page(page_base)
    }

    fn program_unit(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        self.inner.program_unit(address, value)
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        self.inner.read(address, buf)
    }
}
