//! Mock flash implementation for testing
//!
//! Provides in-memory flash simulation for host tests. Supports:
//! - Page erase and half-word program with real NOR semantics
//!   (program only clears bits, erase sets the page to 0xFF)
//! - Lock state checking
//! - Erase/program call recording for wear assertions
//! - Fault injection for commit failure handling
//!
//! # Example
//!
//! ```
//! use flashkeep_hal::{FlashPrimitives, MockFlash};
//!
//! let mut flash = MockFlash::new(0x0807_F000, 2048, 2);
//! flash.unlock();
//! flash.erase_page(0x0807_F000).unwrap();
//! flash.program_unit(0x0807_F000, 0x0201).unwrap();
//! flash.lock();
//!
//! assert_eq!(flash.contents(0x0807_F000, 3), [0x01, 0x02, 0xFF]);
//! assert_eq!(flash.erase_count(), 1);
//! assert_eq!(flash.program_count(), 1);
//! ```

use std::vec;
use std::vec::Vec;

use crate::flash::{FlashError, FlashPrimitives, ERASED_BYTE, UNIT_SIZE};

/// Mock flash device covering `page_count` pages starting at `base`
#[derive(Debug, Clone)]
pub struct MockFlash {
    base: u32,
    page_size: u32,
    /// Flash contents (initialized to the erased state)
    memory: Vec<u8>,
    unlocked: bool,
    /// Page bases passed to every erase call, in call order
    erases: Vec<u32>,
    /// Address and value of every program call, in call order
    programs: Vec<(u32, u16)>,
    /// Number of lock calls
    locks: usize,
    fail_erase_at: Option<u32>,
    fail_program_at: Option<u32>,
    drop_program_at: Option<u32>,
    fail_read_at: Option<u32>,
}

impl MockFlash {
    /// Create a blank (fully erased) mock device
    pub fn new(base: u32, page_size: u32, page_count: u32) -> Self {
        Self {
            base,
            page_size,
            memory: vec![ERASED_BYTE; (page_size * page_count) as usize],
            unlocked: false,
            erases: Vec::new(),
            programs: Vec::new(),
            locks: 0,
            fail_erase_at: None,
            fail_program_at: None,
            drop_program_at: None,
            fail_read_at: None,
        }
    }

    /// Overwrite flash contents directly, bypassing NOR semantics
    ///
    /// Used to seed previously persisted data.
    pub fn preload(&mut self, address: u32, data: &[u8]) {
        let start = (address - self.base) as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    /// Get flash contents (for test verification)
    pub fn contents(&self, address: u32, len: usize) -> Vec<u8> {
        let start = (address - self.base) as usize;
        self.memory[start..start + len].to_vec()
    }

    /// Page bases erased so far, in call order
    pub fn erases(&self) -> &[u32] {
        &self.erases
    }

    /// Program calls so far, in call order
    pub fn programs(&self) -> &[(u32, u16)] {
        &self.programs
    }

    /// Number of erase calls so far
    pub fn erase_count(&self) -> usize {
        self.erases.len()
    }

    /// Number of program calls so far
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of lock calls so far
    pub fn lock_count(&self) -> usize {
        self.locks
    }

    /// Whether the controller is currently unlocked
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Forget recorded erase/program/lock calls
    pub fn clear_log(&mut self) {
        self.erases.clear();
        self.programs.clear();
        self.locks = 0;
    }

    /// Make the erase of the page at `page_base` report failure
    pub fn fail_erase_at(&mut self, page_base: u32) {
        self.fail_erase_at = Some(page_base);
    }

    /// Make the program of the unit at `address` report failure
    pub fn fail_program_at(&mut self, address: u32) {
        self.fail_program_at = Some(address);
    }

    /// Make the program of the unit at `address` report success
    /// without changing any bits
    pub fn drop_program_at(&mut self, address: u32) {
        self.drop_program_at = Some(address);
    }

    /// Make any read covering `address` report failure
    pub fn fail_read_at(&mut self, address: u32) {
        self.fail_read_at = Some(address);
    }

    /// Remove all injected faults
    pub fn clear_faults(&mut self) {
        self.fail_erase_at = None;
        self.fail_program_at = None;
        self.drop_program_at = None;
        self.fail_read_at = None;
    }

    fn index(&self, address: u32, len: usize) -> Result<usize, FlashError> {
        let start = address
            .checked_sub(self.base)
            .ok_or(FlashError::OutOfBounds)? as usize;
        if start + len > self.memory.len() {
            return Err(FlashError::OutOfBounds);
        }
        Ok(start)
    }
}

impl FlashPrimitives for MockFlash {
    fn unlock(&mut self) {
        self.unlocked = true;
    }

    fn lock(&mut self) {
        self.unlocked = false;
        self.locks += 1;
    }

    fn erase_page(&mut self, page_base: u32) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::Locked);
        }
        let start = self.index(page_base, self.page_size as usize)?;
        if start % self.page_size as usize != 0 {
            return Err(FlashError::NotAligned);
        }

        self.erases.push(page_base);
        if self.fail_erase_at == Some(page_base) {
            return Err(FlashError::Erase);
        }

        self.memory[start..start + self.page_size as usize].fill(ERASED_BYTE);
        Ok(())
    }

    fn program_unit(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        if !self.unlocked {
            return Err(FlashError::Locked);
        }
        if address % UNIT_SIZE as u32 != 0 {
            return Err(FlashError::NotAligned);
        }
        let start = self.index(address, UNIT_SIZE)?;

        self.programs.push((address, value));
        if self.fail_program_at == Some(address) {
            return Err(FlashError::Program);
        }
        if self.drop_program_at == Some(address) {
            return Ok(());
        }

        for (cell, byte) in self.memory[start..start + UNIT_SIZE]
            .iter_mut()
            .zip(value.to_le_bytes())
        {
            *cell &= byte;
        }
        Ok(())
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let start = self.index(address, buf.len())?;
        if let Some(fault) = self.fail_read_at {
            if fault >= address && fault - address < buf.len() as u32 {
                return Err(FlashError::Read);
            }
        }
        buf.copy_from_slice(&self.memory[start..start + buf.len()]);
        Ok(())
    }
}
