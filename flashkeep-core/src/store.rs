//! Flash-backed persistent store
//!
//! The store keeps a RAM shadow of its two-page flash region. A session
//! loads the shadow from flash, lets the caller walk it with a cursor,
//! and on finish writes it back only if the written prefix differs from
//! flash.
//!
//! # Commit
//!
//! ```text
//! high-water mark == 0 ─────────────────────────▶ Unchanged
//! shadow[..hwm] == flash[..hwm] ────────────────▶ Unchanged
//! otherwise:
//!   unlock
//!   erase page 0, erase page 1
//!   program shadow[..round_up(hwm, 2)] half-word by half-word
//!   lock
//!   read back and compare ──────────────────────▶ Committed { bytes }
//! ```
//!
//! Both pages are always erased together, even when only the first one
//! changed. Bytes past the programmed span read as erased afterwards.

use flashkeep_hal::{
    FlashError, FlashPrimitives, LayoutError, StoreLayout, ERASED_BYTE, PAGE_COUNT, UNIT_SIZE,
};

use crate::checksum::crc16;
use crate::error::{CommitStage, StoreError};
use crate::traits::{ReadMode, SettingsStore};

/// Bytes compared per flash read when diffing and verifying
const COMPARE_CHUNK: usize = 32;

/// Whether a session is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No session; only `access_start` is accepted
    Idle,
    /// Session open; field access and `access_finish` are accepted
    Active,
}

/// Result of a successful `access_finish`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitOutcome {
    /// Nothing written, or written content matched flash; flash untouched
    Unchanged,
    /// Region erased and `bytes` bytes programmed
    Committed { bytes: usize },
}

/// EEPROM emulation over two flash pages
///
/// `N` is the shadow size and must equal the layout's region size.
pub struct PersistentStore<F, const N: usize> {
    flash: F,
    layout: StoreLayout,
    /// RAM mirror of the flash region
    shadow: [u8; N],
    /// Furthest cursor position reached by a write this session
    high_water: usize,
    state: SessionState,
}

impl<F: FlashPrimitives, const N: usize> PersistentStore<F, N> {
    /// Create a store over `layout`
    ///
    /// The shadow starts out erased; call `access_start` to load it.
    pub fn new(flash: F, layout: StoreLayout) -> Result<Self, StoreError> {
        layout.validate()?;
        if layout.region_size() != N {
            return Err(LayoutError::SizeMismatch.into());
        }

        Ok(Self {
            flash,
            layout,
            shadow: [ERASED_BYTE; N],
            high_water: 0,
            state: SessionState::Idle,
        })
    }

    /// Region layout
    pub fn layout(&self) -> StoreLayout {
        self.layout
    }

    /// Current session state
    pub fn session_state(&self) -> SessionState {
        self.state
    }

    /// Furthest byte written this session
    pub fn high_water_mark(&self) -> usize {
        self.high_water
    }

    /// Whether the loaded shadow is entirely erased
    ///
    /// After `access_start` this tells a never-written region apart from
    /// stored settings.
    pub fn is_blank(&self) -> bool {
        self.shadow.iter().all(|&b| b == ERASED_BYTE)
    }

    /// Close the session without touching flash
    ///
    /// Written data stays in the shadow but is dropped by the next
    /// `access_start`.
    pub fn access_abort(&mut self) -> Result<(), StoreError> {
        self.ensure_active()?;
        self.state = SessionState::Idle;
        self.high_water = 0;
        store_log!(debug, "store: session aborted");
        Ok(())
    }

    /// Get the flash driver
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Get the flash driver for low-level access
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the flash driver
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn ensure_active(&self) -> Result<(), StoreError> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Idle => Err(StoreError::NoSession),
        }
    }

    /// End offset of a `len` byte access at `pos`, if it fits the region
    fn checked_end(pos: usize, len: usize) -> Result<usize, StoreError> {
        pos.checked_add(len)
            .filter(|&end| end <= N)
            .ok_or(StoreError::CapacityExceeded { pos, len })
    }

    /// Offset of the first byte in `[0, len)` where flash differs from the shadow
    fn first_difference(&mut self, len: usize) -> Result<Option<usize>, FlashError> {
        let mut chunk = [0u8; COMPARE_CHUNK];
        let mut offset = 0;

        while offset < len {
            let n = COMPARE_CHUNK.min(len - offset);
            self.flash
                .read(self.layout.address(offset), &mut chunk[..n])?;

            let mismatch = chunk[..n]
                .iter()
                .zip(&self.shadow[offset..offset + n])
                .position(|(stored, staged)| stored != staged);
            if let Some(i) = mismatch {
                return Ok(Some(offset + i));
            }

            offset += n;
        }

        Ok(None)
    }

    fn commit(&mut self) -> Result<CommitOutcome, StoreError> {
        let len = self.high_water;
        if len == 0 {
            return Ok(CommitOutcome::Unchanged);
        }
        if self.first_difference(len)?.is_none() {
            return Ok(CommitOutcome::Unchanged);
        }

        // Page size is a whole number of units, so this never passes N
        let size = (len + UNIT_SIZE - 1) & !(UNIT_SIZE - 1);
        let layout = self.layout;

        {
            let mut flash = self.flash.unlocked();

            for page in 0..PAGE_COUNT {
                let address = layout.page_base(page);
                flash.erase_page(address).map_err(|cause| StoreError::CommitFailed {
                    stage: CommitStage::Erase { address },
                    cause,
                })?;
            }

            for (i, unit) in self.shadow[..size].chunks_exact(UNIT_SIZE).enumerate() {
                let address = layout.address(i * UNIT_SIZE);
                let value = u16::from_le_bytes([unit[0], unit[1]]);
                flash
                    .program_unit(address, value)
                    .map_err(|cause| StoreError::CommitFailed {
                        stage: CommitStage::Program { address },
                        cause,
                    })?;
            }
        }

        match self.first_difference(size) {
            Ok(None) => Ok(CommitOutcome::Committed { bytes: size }),
            Ok(Some(offset)) => Err(StoreError::CommitFailed {
                stage: CommitStage::Verify {
                    address: layout.address(offset),
                },
                cause: FlashError::Program,
            }),
            Err(cause) => Err(StoreError::CommitFailed {
                stage: CommitStage::Verify {
                    address: layout.base_address,
                },
                cause,
            }),
        }
    }
}

impl<F: FlashPrimitives, const N: usize> SettingsStore for PersistentStore<F, N> {
    fn access_start(&mut self) -> Result<(), StoreError> {
        if self.state == SessionState::Active {
            return Err(StoreError::SessionActive);
        }

        self.flash.read(self.layout.base_address, &mut self.shadow)?;
        self.high_water = 0;
        self.state = SessionState::Active;

        store_log!(debug, "store: session opened");
        Ok(())
    }

    fn access_finish(&mut self) -> Result<CommitOutcome, StoreError> {
        self.ensure_active()?;
        // The session ends even if the commit fails
        self.state = SessionState::Idle;

        let result = self.commit();
        match result {
            Ok(CommitOutcome::Committed { bytes }) => {
                store_log!(info, "store: committed {} bytes", bytes);
            }
            Ok(CommitOutcome::Unchanged) => {
                store_log!(debug, "store: content unchanged, skipping commit");
            }
            Err(e) => {
                store_log!(error, "store: commit failed: {:?}", e);
            }
        }
        result
    }

    fn write_data(
        &mut self,
        pos: &mut usize,
        value: &[u8],
        crc: &mut u16,
    ) -> Result<(), StoreError> {
        self.ensure_active()?;
        let end = Self::checked_end(*pos, value.len())?;

        self.shadow[*pos..end].copy_from_slice(value);
        crc16(crc, value);
        *pos = end;
        self.high_water = self.high_water.max(end);
        Ok(())
    }

    fn read_data(
        &mut self,
        pos: &mut usize,
        value: &mut [u8],
        crc: &mut u16,
        mode: ReadMode,
    ) -> Result<(), StoreError> {
        self.ensure_active()?;
        let end = Self::checked_end(*pos, value.len())?;

        let stored = &self.shadow[*pos..end];
        if mode == ReadMode::Load {
            value.copy_from_slice(stored);
        }
        crc16(crc, stored);
        *pos = end;
        Ok(())
    }

    fn capacity(&self) -> usize {
        N
    }
}
