//! Flashkeep Hardware Abstraction Layer
//!
//! This crate defines the flash primitives the settings store consumes.
//! Chip-specific HALs (STM32F1, etc.) implement them, either directly or
//! through the [`nor::NorFlashPrimitives`] adapter over any
//! `embedded-storage` NOR flash driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  flashkeep-core (PersistentStore)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flashkeep-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ flashkeep-hal-│       │   MockFlash   │
//! │    stm32f1    │       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashPrimitives`] - unlock, erase page, program unit, lock
//!
//! # Types
//!
//! - [`layout::StoreLayout`] - placement of the two-page store region

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "mock")]
extern crate std;

pub mod flash;
pub mod layout;
#[cfg(feature = "mock")]
pub mod mock;
pub mod nor;

// Re-export key types at crate root for convenience
pub use flash::{FlashError, FlashPrimitives, Unlocked, ERASED_BYTE, UNIT_SIZE};
pub use layout::{LayoutError, StoreLayout, PAGE_COUNT};
#[cfg(feature = "mock")]
pub use mock::MockFlash;
pub use nor::NorFlashPrimitives;
