pub mod codec;
pub use codec::{Kind, Packed, pack, pack_f64, pack_u32, unpack, unpack_f64, unpack_u32};

pub mod error;
pub use error::{PrimError, Result};

pub mod hexdump;
pub use hexdump::{hexdump, hexlify, unhexlify};

pub mod int64;
pub use int64::{FixedInt64, Op, Operand, TAG_BIAS, add, evaluate, neg, sub, to_latin1_string};

pub mod scan;
pub use scan::{
    find_code_offsets, find_needle_in_slot, read_aligned32, read_straddling32, read64,
    scan_aligned32, scan_report, scan_straddling32, write_aligned32, write_straddling32,
};

pub mod structs;
pub use structs::{Location, ScanOptions, ScanReport};

pub mod utilities;
pub use utilities::{SLOT_SIZE, slot_index, word_to_bytes};
