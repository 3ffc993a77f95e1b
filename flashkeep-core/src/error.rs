//! Store error types
//!
//! Every store operation reports failure through [`StoreError`]. Caller
//! misuse, flash hardware faults and interrupted commits are separate
//! variants so the settings layer can tell them apart.

use flashkeep_hal::{FlashError, LayoutError};

/// Commit step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitStage {
    /// Erasing the page at `address`
    ///
    /// If the first page erased and the second failed, the region now
    /// holds blank bytes in the first page.
    Erase { address: u32 },
    /// Programming the unit at `address`
    ///
    /// Both pages are erased at this point; bytes from `address` onward
    /// read as blank until the next successful commit.
    Program { address: u32 },
    /// Reading back programmed data differed from the shadow at `address`
    Verify { address: u32 },
}

/// Errors from encoding or decoding serialized records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Encoded record does not fit the record scratch buffer
    TooLarge,
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
}

/// Errors from store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Layout rejected at construction
    Layout(LayoutError),
    /// `access_start` called while a session is already open
    SessionActive,
    /// Field access or finish without an open session
    NoSession,
    /// `pos + len` runs past the end of the region
    CapacityExceeded { pos: usize, len: usize },
    /// Flash read failed while loading or comparing
    Flash(FlashError),
    /// Erase, program or verify failed during commit
    CommitFailed { stage: CommitStage, cause: FlashError },
    /// Serialized record could not be written or read
    Record(RecordError),
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

impl From<LayoutError> for StoreError {
    fn from(e: LayoutError) -> Self {
        StoreError::Layout(e)
    }
}

impl From<RecordError> for StoreError {
    fn from(e: RecordError) -> Self {
        StoreError::Record(e)
    }
}
