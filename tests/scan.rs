use qword::utilities::error::{ERR_BOUNDS, PrimError};
use qword::utilities::int64::FixedInt64;
use qword::utilities::scan::{
    find_code_offsets, find_needle_in_slot, read_aligned32, read_straddling32, read64,
    scan_aligned32, scan_report, scan_straddling32, write_aligned32, write_straddling32,
};
use qword::utilities::structs::{Location, ScanOptions};
use qword::utilities::utilities::{bytes_to_word, word_to_bytes};

mod helpers;
use helpers::{array_from_bits, bits_of};

// --- Aligned reads & writes ---

#[test]
fn needle_in_both_halves_reports_low_then_high() {
    let arr = array_from_bits(&[0x1122334411223344]);
    assert_eq!(scan_aligned32(&arr, 0x11223344, 1).unwrap(), vec![0, 4]);
}

#[test]
fn find_needle_in_slot_prefers_low_half() {
    let needle = 0x11223344u32.to_le_bytes();
    let both = 0x1122334411223344u64.to_le_bytes();
    let high = 0x1122334400000000u64.to_le_bytes();
    assert_eq!(find_needle_in_slot(needle, both, 0), Some(0));
    assert_eq!(find_needle_in_slot(needle, high, 8), Some(12));
    assert_eq!(find_needle_in_slot(needle, [0; 8], 16), None);
}

#[test]
fn aligned_scan_walks_slots_in_order() {
    let arr = array_from_bits(&[
        0x0000000000000000,
        0xcafebabe00000000,
        0x00000000cafebabe,
        0xbabe0000cafe0000,
    ]);
    assert_eq!(scan_aligned32(&arr, 0xcafebabe, 4).unwrap(), vec![12, 16]);
    // only the first two slots
    assert_eq!(scan_aligned32(&arr, 0xcafebabe, 2).unwrap(), vec![12]);
    assert!(scan_aligned32(&arr, 0xcafebabe, 0).unwrap().is_empty());
}

#[test]
fn aligned_scan_ignores_unaligned_hits() {
    // needle starts at byte 2 of slot 0
    let arr = array_from_bits(&[0x0000deadbeef0000, 0]);
    assert!(scan_aligned32(&arr, 0xdeadbeef, 2).unwrap().is_empty());
    // overlapping unaligned match right before an aligned one
    let arr = array_from_bits(&[0xabab_abab_abab_0000]);
    assert_eq!(scan_aligned32(&arr, 0xabababab, 1).unwrap(), vec![4]);
}

#[test]
fn write_then_read_low_half_leaves_high_half() {
    let mut arr = array_from_bits(&[0]);
    write_aligned32(&mut arr, 0, 0xdeadbeef).unwrap();
    assert_eq!(read_aligned32(&arr, 0).unwrap(), 0xdeadbeef);
    assert_eq!(read_aligned32(&arr, 4).unwrap(), 0x00000000);
    assert_eq!(bits_of(&arr), vec![0x00000000deadbeef]);
}

#[test]
fn write_high_half_keeps_low_half() {
    let mut arr = array_from_bits(&[0x0000000012345678, 0x1111111111111111]);
    write_aligned32(&mut arr, 12, 0x40404040).unwrap();
    assert_eq!(bits_of(&arr), vec![0x0000000012345678, 0x4040404011111111]);
    // any non-zero remainder selects the high half
    assert_eq!(read_aligned32(&arr, 9).unwrap(), 0x40404040);
}

#[test]
fn write_refuses_unrepresentable_pattern() {
    let mut arr = array_from_bits(&[0x0000000012345678]);
    let err = write_aligned32(&mut arr, 4, 0xffff0000).unwrap_err();
    assert!(matches!(err, PrimError::UnrepresentableValue { .. }));
    assert_eq!(bits_of(&arr), vec![0x0000000012345678]);
}

#[test]
fn aligned_access_is_range_checked() {
    let mut arr = array_from_bits(&[0]);
    assert_eq!(
        read_aligned32(&arr, 8),
        Err(PrimError::OutOfBounds { index: 1, len: 1 })
    );
    assert_eq!(
        write_aligned32(&mut arr, 16, 1),
        Err(PrimError::OutOfBounds { index: 2, len: 1 })
    );
    assert_eq!(
        scan_aligned32(&arr, 1, 2),
        Err(PrimError::OutOfBounds { index: 1, len: 1 })
    );
}

// --- Straddling reads & writes ---

#[test]
fn straddling_aligned_read_takes_middle_bytes() {
    let arr = array_from_bits(&[0x8877665544332211]);
    assert_eq!(
        read_straddling32(&arr, Location::Offset(0)).unwrap(),
        0x55443322
    );
}

#[test]
fn straddling_unaligned_read_spans_two_slots() {
    let arr = array_from_bits(&[0x8877665544332211, 0x1100ffeeddccbbaa]);
    assert_eq!(
        read_straddling32(&arr, Location::Offset(4)).unwrap(),
        0xaa887766
    );
}

#[test]
fn straddling_write_round_trips_and_preserves_neighbours() {
    let mut arr = array_from_bits(&[0x8877665544332211, 0x1100ffeeddccbbaa]);
    write_straddling32(&mut arr, Location::Offset(4), 0xdeadbeef).unwrap();
    assert_eq!(
        read_straddling32(&arr, Location::Offset(4)).unwrap(),
        0xdeadbeef
    );
    let bits = bits_of(&arr);
    assert_eq!(bits, vec![0xadbeef5544332211, 0x1100ffeeddccbbde]);
    // the 4 bytes on either side of the window
    assert_eq!(bits[0] & 0xffff_ffff, 0x44332211);
    assert_eq!(bits[1] >> 32, 0x1100ffee);
}

#[test]
fn straddling_aligned_write_round_trips() {
    let mut arr = array_from_bits(&[0x8877665544332211]);
    write_straddling32(&mut arr, Location::Offset(0), 0xcafebabe).unwrap();
    assert_eq!(bits_of(&arr), vec![0x887766cafebabe11]);
    assert_eq!(
        read_straddling32(&arr, Location::Offset(0)).unwrap(),
        0xcafebabe
    );
}

#[test]
fn straddling_write_is_all_or_nothing() {
    // the first slot stays storable, the second keeps its reserved top bytes
    let mut arr = array_from_bits(&[0x8877665544332211, 0xfffe000000000000]);
    let before = bits_of(&arr);
    let err = write_straddling32(&mut arr, Location::Offset(4), 0x01020304).unwrap_err();
    assert!(matches!(err, PrimError::UnrepresentableValue { .. }));
    assert_eq!(bits_of(&arr), before);
}

#[test]
fn address_locations_are_relative_to_base() {
    let arr = array_from_bits(&[0, 0x8877665544332211]);
    let by_addr = read_straddling32(
        &arr,
        Location::Address {
            addr: 0x1008,
            base: 0x1000,
        },
    )
    .unwrap();
    let by_offset = read_straddling32(&arr, Location::Offset(8)).unwrap();
    assert_eq!(by_addr, by_offset);
    assert_eq!(by_addr, 0x55443322);
}

#[test]
fn address_before_base_fails() {
    let mut arr = array_from_bits(&[0, 0]);
    let loc = Location::Address {
        addr: 0xff8,
        base: 0x1000,
    };
    assert_eq!(
        read_straddling32(&arr, loc),
        Err(PrimError::AddressBeforeBase {
            addr: 0xff8,
            base: 0x1000
        })
    );
    assert!(write_straddling32(&mut arr, loc, 1).is_err());
    assert_eq!(bits_of(&arr), vec![0, 0]);
}

#[test]
fn straddling_needs_the_next_slot() {
    let arr = array_from_bits(&[0]);
    assert_eq!(
        read_straddling32(&arr, Location::Offset(4)),
        Err(PrimError::OutOfBounds { index: 1, len: 1 })
    );
}

#[test]
fn straddling_scan_finds_both_positions() {
    let arr = array_from_bits(&[0xadbeef5544332211, 0x1100ffeeddccbbde]);
    assert_eq!(scan_straddling32(&arr, 0xdeadbeef, 2).unwrap(), vec![4]);

    let arr = array_from_bits(&[0x000000deadbeef00, 0]);
    assert_eq!(scan_straddling32(&arr, 0xdeadbeef, 2).unwrap(), vec![0]);
}

#[test]
fn straddling_scan_skips_high_probe_of_last_slot() {
    let arr = array_from_bits(&[0x000000deadbeef00]);
    assert_eq!(scan_straddling32(&arr, 0xdeadbeef, 1).unwrap(), vec![0]);
}

// --- 64-bit reads ---

#[test]
fn read64_joins_halves_when_unaligned() {
    let arr = array_from_bits(&[0x8877665544332211, 0xddccbbaa00ffeeaa]);
    assert_eq!(
        read64(&arr, Location::Offset(4)).unwrap(),
        FixedInt64::from(0x00ffeeaa88776655u64)
    );
    assert_eq!(
        read64(&arr, Location::Offset(8)).unwrap().to_hex_string(),
        "0xddccbbaa00ffeeaa"
    );
}

// --- Derived field lookup ---

#[test]
fn code_offsets_follow_field_after_match() {
    let arr = array_from_bits(&[
        0x0000000011223344,
        0xcafe000000000000,
        0x1122334400000000,
        0x0000000000000000,
        0x00000000beef0000,
    ]);
    let found = find_code_offsets(&arr, 0x11223344, ScanOptions::default()).unwrap();
    // match at 0 reads offset 12, match at 20 reads offset 32
    assert_eq!(found, vec![0xcafe0000, 0xbeef0000]);
}

#[test]
fn code_offsets_respect_options() {
    let arr = array_from_bits(&[0x0000000011223344, 0x0000000000000007, 0x1122334400000000]);
    let opts = ScanOptions {
        length: Some(1),
        field_offset: 8,
    };
    assert_eq!(find_code_offsets(&arr, 0x11223344, opts).unwrap(), vec![7]);
}

#[test]
fn code_offsets_propagate_bounds_errors() {
    let arr = array_from_bits(&[0x0000000011223344]);
    assert_eq!(
        find_code_offsets(&arr, 0x11223344, ScanOptions::default()),
        Err(PrimError::OutOfBounds { index: 1, len: 1 })
    );
}

#[test]
fn code_offsets_reject_field_offset_overflow() {
    // a wrapped sum would land back on slot 0's high half
    let arr = array_from_bits(&[0xcafebabe00000000, 0x0000000011223344]);
    let opts = ScanOptions {
        length: None,
        field_offset: usize::MAX - 3,
    };
    assert_eq!(
        find_code_offsets(&arr, 0x11223344, opts),
        Err(PrimError::OutOfBounds {
            index: usize::MAX,
            len: 2
        })
    );
}

#[test]
fn report_collects_every_scan() {
    let arr = array_from_bits(&[0x0000000011223344, 0xcafe000000000000, 0]);
    let report = scan_report(&arr, 0x11223344, ScanOptions::default()).unwrap();
    assert_eq!(report.length, 3);
    assert_eq!(report.aligned, vec![0]);
    assert!(report.straddling.is_empty());
    assert_eq!(report.code_offsets, vec![0xcafe0000]);
}

// --- Helpers & address range ---

#[test]
fn word_helpers_take_exactly_four_bytes() {
    assert_eq!(bytes_to_word([0xef, 0xbe, 0xad, 0xde]), 0xdeadbeef);
    assert_eq!(bytes_to_word(word_to_bytes(0x11223344)), 0x11223344);
}

#[test]
fn distant_address_reports_its_own_range() {
    let err = PrimError::AddressOutOfRange {
        addr: 0x1_0000_1000,
        base: 0x1000,
    };
    assert_eq!(err.code(), ERR_BOUNDS);
    assert!(err.to_string().contains("0x100001000"));
    assert!(err.to_string().contains("0x1000"));
}

#[cfg(target_pointer_width = "32")]
#[test]
fn address_distance_beyond_usize_fails() {
    let arr = array_from_bits(&[0]);
    let loc = Location::Address {
        addr: 0x1_0000_1000,
        base: 0x1000,
    };
    assert_eq!(
        read_straddling32(&arr, loc),
        Err(PrimError::AddressOutOfRange {
            addr: 0x1_0000_1000,
            base: 0x1000
        })
    );
}

#[cfg(target_pointer_width = "64")]
#[test]
fn address_distance_resolves_to_slot_bounds() {
    let arr = array_from_bits(&[0]);
    let loc = Location::Address {
        addr: 0x1_0000_1000,
        base: 0x1000,
    };
    assert_eq!(
        read_straddling32(&arr, loc),
        Err(PrimError::OutOfBounds {
            index: 0x2000_0000,
            len: 1
        })
    );
}
