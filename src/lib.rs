use core::ffi::c_int;
use serde::Deserialize;
use serde_json::json;
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    ptr, slice,
};

pub mod utilities;
use utilities::{
    codec::unpack_f64,
    error::{ERR_INVALID_ARGS, ERR_PANIC, ERR_PARSE, OK},
    hexdump::hexdump as hexdump_rs,
    int64::{FixedInt64, Op, Operand, evaluate},
    scan::{
        find_code_offsets as find_code_offsets_rs, read_aligned32 as read_aligned32_rs,
        read_straddling32 as read_straddling32_rs, read64 as read64_rs,
        scan_aligned32 as scan_aligned32_rs, scan_report as scan_report_rs,
        scan_straddling32 as scan_straddling32_rs, write_aligned32 as write_aligned32_rs,
        write_straddling32 as write_straddling32_rs,
    },
    structs::{Location, ScanOptions},
};

#[repr(C)]
pub struct Buf {
    pub ptr: *mut u8,
    pub len: usize,
}

/// Scan settings passed by the host. Zero fields fall back to defaults.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CScanOptions {
    pub length: usize,
    pub field_offset: usize,
}

#[derive(Deserialize)]
struct EvalRequest {
    op: Op,
    args: Vec<Operand>,
}

#[cfg(all(target_arch = "wasm32", not(target_os = "wasi")))]
#[link(wasm_import_module = "env")]
unsafe extern "C" {
    fn js_log(ptr: *const u8, len: usize);
}

#[inline]
pub fn log_json<T: serde::Serialize>(v: &T) {
    if let Ok(s) = serde_json::to_string_pretty(v) {
        #[cfg(all(target_arch = "wasm32", not(target_os = "wasi")))]
        unsafe {
            js_log(s.as_ptr(), s.len());
        }

        #[cfg(not(all(target_arch = "wasm32", not(target_os = "wasi"))))]
        eprintln!("{s}");
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn alloc(size: usize) -> *mut u8 {
    if size == 0 {
        return core::ptr::null_mut();
    }
    let mut v = Vec::<u8>::with_capacity(size);
    let p = v.as_mut_ptr();
    core::mem::forget(v);
    p
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_(ptr_raw: *mut u8, size: usize) {
    if !ptr_raw.is_null() {
        let _ = unsafe { Vec::<u8>::from_raw_parts(ptr_raw, size, size) };
    }
}

/// Evaluates `{"op": "add" | "sub" | "neg", "args": [...]}` and writes
/// `{"hex", "lo", "hi"}` into `out_json`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn int64_eval(
    req_ptr: *const u8,
    req_len: usize,
    out_json: *mut Buf,
) -> c_int {
    if req_ptr.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let req = unsafe { slice::from_raw_parts(req_ptr, req_len) };
        let req: EvalRequest = serde_json::from_slice(req).map_err(|_| ERR_PARSE)?;
        let v = evaluate(req.op, &req.args).map_err(|e| e.code())?;
        let (lo, hi) = v.to_u32_pair();
        let s = json!({ "hex": v.to_hex_string(), "lo": lo, "hi": hi }).to_string();
        write_buf(out_json, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn int64_to_double(hex_ptr: *const u8, hex_len: usize, out: *mut f64) -> c_int {
    if hex_ptr.is_null() || out.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let v = parse_hex_arg(hex_ptr, hex_len)?;
        let d = v.to_double_bits().map_err(|e| e.code())?;
        unsafe { ptr::write_unaligned(out, d) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn int64_to_tagged(hex_ptr: *const u8, hex_len: usize, out: *mut f64) -> c_int {
    if hex_ptr.is_null() || out.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let v = parse_hex_arg(hex_ptr, hex_len)?;
        let d = v.to_tagged_value().map_err(|e| e.code())?;
        unsafe { ptr::write_unaligned(out, d) };
        Ok(())
    })
}

/// Hex string of the bit pattern of the 8 little-endian bytes at `d_ptr`.
/// Taking bytes keeps NaN payloads intact across the boundary.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn int64_from_double(d_ptr: *const u8, out_hex: *mut Buf) -> c_int {
    if d_ptr.is_null() || out_hex.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let bytes = unsafe { slice::from_raw_parts(d_ptr, 8) };
        let d = unpack_f64(bytes).map_err(|e| e.code())?;
        let s = FixedInt64::from_double(d).to_hex_string();
        write_buf(out_hex, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn read_aligned32(
    arr_ptr: *const f64,
    arr_len: usize,
    offset: usize,
    out: *mut u32,
) -> c_int {
    if arr_ptr.is_null() || out.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let v = read_aligned32_rs(arr, offset).map_err(|e| e.code())?;
        unsafe { ptr::write_unaligned(out, v) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn write_aligned32(
    arr_ptr: *mut f64,
    arr_len: usize,
    offset: usize,
    value: u32,
) -> c_int {
    if arr_ptr.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts_mut(arr_ptr, arr_len) };
        write_aligned32_rs(arr, offset, value).map_err(|e| e.code())
    })
}

/// `target` is a byte offset when `is_offset != 0`, otherwise an address
/// relative to `base`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn read_straddling32(
    arr_ptr: *const f64,
    arr_len: usize,
    target: u64,
    base: u64,
    is_offset: c_int,
    out: *mut u32,
) -> c_int {
    if arr_ptr.is_null() || out.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let loc = build_location(target, base, is_offset)?;
        let v = read_straddling32_rs(arr, loc).map_err(|e| e.code())?;
        unsafe { ptr::write_unaligned(out, v) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn write_straddling32(
    arr_ptr: *mut f64,
    arr_len: usize,
    target: u64,
    base: u64,
    is_offset: c_int,
    value: u32,
) -> c_int {
    if arr_ptr.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts_mut(arr_ptr, arr_len) };
        let loc = build_location(target, base, is_offset)?;
        write_straddling32_rs(arr, loc, value).map_err(|e| e.code())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn read64(
    arr_ptr: *const f64,
    arr_len: usize,
    target: u64,
    base: u64,
    is_offset: c_int,
    out: *mut u64,
) -> c_int {
    if arr_ptr.is_null() || out.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let loc = build_location(target, base, is_offset)?;
        let v = read64_rs(arr, loc).map_err(|e| e.code())?;
        unsafe { ptr::write_unaligned(out, v.to_u64()) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn scan_aligned32(
    arr_ptr: *const f64,
    arr_len: usize,
    needle: u32,
    length: usize,
    out_json: *mut Buf,
) -> c_int {
    if arr_ptr.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let offsets = scan_aligned32_rs(arr, needle, length).map_err(|e| e.code())?;
        let s = serde_json::to_string(&offsets).map_err(|_| ERR_PARSE)?;
        write_buf(out_json, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn scan_straddling32(
    arr_ptr: *const f64,
    arr_len: usize,
    needle: u32,
    length: usize,
    out_json: *mut Buf,
) -> c_int {
    if arr_ptr.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let offsets = scan_straddling32_rs(arr, needle, length).map_err(|e| e.code())?;
        let s = serde_json::to_string(&offsets).map_err(|_| ERR_PARSE)?;
        write_buf(out_json, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn find_code_offsets(
    arr_ptr: *const f64,
    arr_len: usize,
    needle: u32,
    options: *const CScanOptions,
    out_json: *mut Buf,
) -> c_int {
    if arr_ptr.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let opts = build_scan_options(options);
        let found = find_code_offsets_rs(arr, needle, opts).map_err(|e| e.code())?;
        let s = serde_json::to_string(&found).map_err(|_| ERR_PARSE)?;
        write_buf(out_json, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn scan_report(
    arr_ptr: *const f64,
    arr_len: usize,
    needle: u32,
    options: *const CScanOptions,
    out_json: *mut Buf,
) -> c_int {
    if arr_ptr.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let arr = unsafe { slice::from_raw_parts(arr_ptr, arr_len) };
        let opts = build_scan_options(options);
        let report = scan_report_rs(arr, needle, opts).map_err(|e| e.code())?;
        let s = serde_json::to_string(&report).map_err(|_| ERR_PARSE)?;
        write_buf(out_json, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hexdump(data_ptr: *const u8, data_len: usize, out_text: *mut Buf) -> c_int {
    if data_ptr.is_null() || out_text.is_null() {
        return ERR_INVALID_ARGS;
    }
    guarded(|| {
        let data = unsafe { slice::from_raw_parts(data_ptr, data_len) };
        let s = hexdump_rs(data);
        write_buf(out_text, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

fn guarded<F: FnOnce() -> Result<(), c_int>>(run: F) -> c_int {
    match catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(())) => OK,
        Ok(Err(code)) => code,
        Err(_) => ERR_PANIC,
    }
}

fn parse_hex_arg(hex_ptr: *const u8, hex_len: usize) -> Result<FixedInt64, c_int> {
    let raw = unsafe { slice::from_raw_parts(hex_ptr, hex_len) };
    let s = std::str::from_utf8(raw).map_err(|_| ERR_PARSE)?;
    FixedInt64::from_hex(s.trim()).map_err(|e| e.code())
}

fn build_location(target: u64, base: u64, is_offset: c_int) -> Result<Location, c_int> {
    if is_offset != 0 {
        let offset = usize::try_from(target).map_err(|_| ERR_INVALID_ARGS)?;
        Ok(Location::Offset(offset))
    } else {
        Ok(Location::Address { addr: target, base })
    }
}

fn build_scan_options(options: *const CScanOptions) -> ScanOptions {
    let defaults = ScanOptions::default();
    if options.is_null() {
        return defaults;
    }
    let o = unsafe { *options };
    ScanOptions {
        length: (o.length > 0).then_some(o.length),
        field_offset: if o.field_offset > 0 {
            o.field_offset
        } else {
            defaults.field_offset
        },
    }
}

fn write_buf(out: *mut Buf, bytes: Box<[u8]>) {
    let len = bytes.len();
    let ptr_bytes = Box::into_raw(bytes) as *mut u8;
    unsafe {
        ptr::write_unaligned(
            out,
            Buf {
                ptr: ptr_bytes,
                len,
            },
        )
    };
}
