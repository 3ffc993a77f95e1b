//! STM32F1-specific HAL for the Flashkeep settings store
//!
//! This crate binds the store to the internal flash of STM32F1 parts.
//! It supports:
//!
//! - STM32F103xB (medium density, 128KB flash, 1KB pages)
//! - STM32F103xE (high density, 512KB flash, 2KB pages)
//!
//! # Features
//!
//! - `stm32f103rb` / `stm32f103re` - Select the chip variant
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! ```ignore
//! let p = embassy_stm32::init(Default::default());
//! let flash = flashkeep_hal_stm32f1::flash::Stm32f1Flash::new(p.FLASH);
//! let store = PersistentStore::<_, STORE_SIZE>::new(flash, STORE_LAYOUT)?;
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

// Re-export shared types from flashkeep-hal
pub use flash::{Stm32f1Flash, STORE_LAYOUT, STORE_SIZE};
pub use flashkeep_hal::{FlashError, StoreLayout};
