//! Flash-emulated EEPROM settings store
//!
//! This crate holds the board-agnostic part of the settings store:
//!
//! - [`PersistentStore`] - RAM shadow of a two-page flash region with a
//!   cursor API and a commit that only erases when content changed
//! - [`SettingsStore`] - the interface settings (de)serializers talk to
//! - [`checksum::crc16`] - the running checksum folded over every field
//! - [`field::StoreField`] - fixed-size little-endian field encoding
//! - `record` - postcard-encoded records (feature `serde`)
//!
//! A session looks like this:
//!
//! ```text
//! access_start()            flash ──copy──▶ shadow
//! write_data / read_data    cursor + checksum walk the shadow
//! access_finish()           shadow ──diff──▶ flash, erase + program if changed
//! ```

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod checksum;
pub mod error;
pub mod field;
#[cfg(feature = "serde")]
pub mod record;
pub mod store;
pub mod traits;

pub use checksum::crc16;
pub use error::{CommitStage, RecordError, StoreError};
pub use field::StoreField;
pub use flashkeep_hal::{FlashError, FlashPrimitives, LayoutError, StoreLayout, PAGE_COUNT};
pub use store::{CommitOutcome, PersistentStore, SessionState};
pub use traits::{ReadMode, SettingsStore};
