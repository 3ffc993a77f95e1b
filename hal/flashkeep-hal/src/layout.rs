//! Store region layout
//!
//! The settings region is always exactly two equally sized flash pages.
//! Chip HALs provide a ready-made [`StoreLayout`] for their part; tests
//! build their own.

/// Number of flash pages in the store region
pub const PAGE_COUNT: usize = 2;

/// Errors from layout validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Page size is zero or not a whole number of program units
    InvalidPageSize,
    /// Region base is not page aligned
    UnalignedBase,
    /// Region extends past the end of the address space
    Overflow,
    /// Region size differs from the shadow buffer size
    SizeMismatch,
}

/// Placement of the store region in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreLayout {
    /// Absolute address of the first page
    pub base_address: u32,
    /// Size of one page in bytes
    pub page_size: u32,
}

impl StoreLayout {
    /// Create a layout of two pages starting at `base_address`
    pub const fn new(base_address: u32, page_size: u32) -> Self {
        Self {
            base_address,
            page_size,
        }
    }

    /// Layout occupying the last two pages of a flash device
    ///
    /// # Arguments
    /// * `flash_base` - Absolute address of the start of flash
    /// * `flash_size` - Total flash size in bytes
    /// * `page_size` - Erase page size in bytes
    pub const fn last_pages(flash_base: u32, flash_size: u32, page_size: u32) -> Self {
        Self::new(
            flash_base + flash_size - PAGE_COUNT as u32 * page_size,
            page_size,
        )
    }

    /// Total region size in bytes (always two pages)
    pub const fn region_size(&self) -> usize {
        PAGE_COUNT * self.page_size as usize
    }

    /// Absolute base address of page `index`
    pub const fn page_base(&self, index: usize) -> u32 {
        self.base_address + index as u32 * self.page_size
    }

    /// Absolute address of byte `offset` within the region
    pub const fn address(&self, offset: usize) -> u32 {
        self.base_address + offset as u32
    }

    /// Check the layout is usable
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.page_size == 0 || self.page_size % crate::flash::UNIT_SIZE as u32 != 0 {
            return Err(LayoutError::InvalidPageSize);
        }
        if self.base_address % self.page_size != 0 {
            return Err(LayoutError::UnalignedBase);
        }
        let size = self
            .page_size
            .checked_mul(PAGE_COUNT as u32)
            .ok_or(LayoutError::Overflow)?;
        // The last byte of the region must still be addressable
        self.base_address
            .checked_add(size - 1)
            .ok_or(LayoutError::Overflow)?;
        Ok(())
    }
}
