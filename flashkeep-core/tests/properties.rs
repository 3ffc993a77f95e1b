//! Property tests for cursor access, checksum folding and commit bounds

use flashkeep_core::{
    crc16, CommitOutcome, PersistentStore, ReadMode, SettingsStore, StoreLayout,
};
use flashkeep_hal::MockFlash;
use proptest::prelude::*;

const BASE: u32 = 0x0801_F800;
const PAGE: u32 = 256;
const SIZE: usize = 512;

fn new_store() -> PersistentStore<MockFlash, SIZE> {
    let flash = MockFlash::new(BASE, PAGE, 2);
    PersistentStore::new(flash, StoreLayout::new(BASE, PAGE)).unwrap()
}

/// Field sizes and contents that fit the region back to back
fn fields() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..24), 0..20)
}

proptest! {
    #[test]
    fn roundtrip_through_flash(start in 0usize..32, fields in fields()) {
        let mut store = new_store();

        store.access_start().unwrap();
        let mut pos = start;
        let mut write_crc = 0;
        for field in &fields {
            store.write_data(&mut pos, field, &mut write_crc).unwrap();
        }
        store.access_finish().unwrap();

        store.access_start().unwrap();
        let mut pos = start;
        let mut read_crc = 0;
        for field in &fields {
            let mut buf = vec![0u8; field.len()];
            store.read_data(&mut pos, &mut buf, &mut read_crc, ReadMode::Load).unwrap();
            prop_assert_eq!(&buf, field);
        }
        prop_assert_eq!(read_crc, write_crc);
    }

    #[test]
    fn checksum_independent_of_chunking(
        data in prop::collection::vec(any::<u8>(), 0..200),
        split in any::<prop::sample::Index>(),
    ) {
        let mut store = new_store();
        store.access_start().unwrap();

        let mut pos = 0;
        let mut whole = 0;
        store.write_data(&mut pos, &data, &mut whole).unwrap();

        let at = split.index(data.len() + 1);
        let mut pos = 0;
        let mut chunked = 0;
        store.write_data(&mut pos, &data[..at], &mut chunked).unwrap();
        store.write_data(&mut pos, &data[at..], &mut chunked).unwrap();

        let mut expected = 0;
        crc16(&mut expected, &data);
        prop_assert_eq!(whole, expected);
        prop_assert_eq!(chunked, expected);

        // Reading the same span back folds the same bytes
        let mut pos = 0;
        let mut read = 0;
        let mut buf = vec![0u8; data.len()];
        store.read_data(&mut pos, &mut buf, &mut read, ReadMode::Validate).unwrap();
        prop_assert_eq!(read, expected);
    }

    #[test]
    fn commit_bounded_by_high_water(start in 0usize..SIZE, len in 1usize..64) {
        let len = len.min(SIZE - start);

        let mut store = new_store();
        store.access_start().unwrap();
        let mut pos = start;
        let mut crc = 0;
        let data = vec![0x00u8; len];
        store.write_data(&mut pos, &data, &mut crc).unwrap();
        let outcome = store.access_finish().unwrap();

        let end = start + len;
        let programmed = (end + 1) / 2 * 2;
        prop_assert_eq!(outcome, CommitOutcome::Committed { bytes: programmed });
        prop_assert_eq!(store.flash().program_count(), programmed / 2);
        prop_assert!(programmed <= SIZE);
        let flash = store.flash();
        for &(address, _) in flash.programs() {
            prop_assert!(address >= BASE && address < BASE + SIZE as u32);
        }
    }

    #[test]
    fn unchanged_rewrite_never_erases(fields in fields()) {
        let mut store = new_store();

        for round in 0..2 {
            store.access_start().unwrap();
            let mut pos = 0;
            let mut crc = 0;
            for field in &fields {
                store.write_data(&mut pos, field, &mut crc).unwrap();
            }
            store.access_finish().unwrap();
            if round == 0 {
                store.flash_mut().clear_log();
            }
        }

        prop_assert_eq!(store.flash().erase_count(), 0);
        prop_assert_eq!(store.flash().program_count(), 0);
    }
}

#[test]
fn capacity_constant_across_sessions() {
    let mut store = new_store();
    for _ in 0..3 {
        assert_eq!(store.capacity(), 2 * PAGE as usize);
        store.access_start().unwrap();
        assert_eq!(store.capacity(), SIZE);
        store.access_finish().unwrap();
    }
}
