//! C FFI bindings for C mining harnesses

use core::slice;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use crate::params::{DIGEST_BYTES, HEADER_BYTES, HEADER_WORDS, NONCE_INDEX, TARGET_WORDS};
use crate::scanner::scan_with_timestamp;
use crate::types::{HeaderWords, TargetWords};
use crate::xhash::xhash_bytes;

/// Compute the digest of a serialized header
/// - header: pointer to 80 header bytes
/// - timestamp: block time salting the first stage
/// - output: pointer to 32-byte buffer for result
///
/// Returns 1 on success, 0 if any pointer is null.
#[unsafe(no_mangle)]
pub extern "C" fn xhash_hash(header: *const u8, timestamp: u64, output: *mut u8) -> i32 {
    if header.is_null() || output.is_null() {
        return 0;
    }

    unsafe {
        let mut bytes = [0u8; HEADER_BYTES];
        bytes.copy_from_slice(slice::from_raw_parts(header, HEADER_BYTES));
        let digest = xhash_bytes(&bytes, timestamp);

        let output_slice = slice::from_raw_parts_mut(output, DIGEST_BYTES);
        output_slice.copy_from_slice(&digest);
    }
    1
}

/// Scan nonces for a 32-word header buffer
/// - pdata: 32 header words; word 19 holds the first nonce on entry and the
///   last nonce tried (or the winning one) on return
/// - ptarget: 8 target words, word 7 most significant
/// - max_nonce: last nonce to try
/// - timestamp: block time for every attempt of this call
/// - restart: this worker's restart flag, may be null
/// - hashes_done: receives the number of attempts
///
/// Returns 1 if a nonce was found, 0 otherwise (including null buffers).
#[unsafe(no_mangle)]
pub extern "C" fn xhash_scanhash(
    pdata: *mut u32,
    ptarget: *const u32,
    max_nonce: u32,
    timestamp: u64,
    restart: *const AtomicBool,
    hashes_done: *mut u64,
) -> i32 {
    if pdata.is_null() || ptarget.is_null() || hashes_done.is_null() {
        return 0;
    }

    let never = AtomicBool::new(false);

    unsafe {
        let data = slice::from_raw_parts_mut(pdata, HEADER_WORDS);
        let mut words = [0u32; HEADER_WORDS];
        words.copy_from_slice(data);

        let mut target = [0u32; TARGET_WORDS];
        target.copy_from_slice(slice::from_raw_parts(ptarget, TARGET_WORDS));

        let cancel = restart.as_ref().unwrap_or(&never);
        let result = scan_with_timestamp(
            &HeaderWords::new(words),
            &TargetWords::new(target),
            max_nonce,
            timestamp,
            cancel,
        );

        data[NONCE_INDEX] = result.nonce;
        *hashes_done = result.hashes_done;
        result.found as i32
    }
}

/// Benchmark: scan `iterations` nonces against an unreachable target and
/// return the elapsed microseconds
#[unsafe(no_mangle)]
pub extern "C" fn xhash_benchmark(iterations: u32) -> u64 {
    if iterations == 0 {
        return 0;
    }

    let header = HeaderWords::new([0x5a5a_5a5a; HEADER_WORDS]).with_nonce(0);
    let never = AtomicBool::new(false);

    let start = Instant::now();
    scan_with_timestamp(
        &header,
        &TargetWords::new([0; TARGET_WORDS]),
        iterations - 1,
        1_700_000_000,
        &never,
    );
    start.elapsed().as_micros() as u64
}

/// Hashes per second for `hashes` attempts over `micros` microseconds
#[unsafe(no_mangle)]
pub extern "C" fn xhash_hashrate(hashes: u64, micros: u64) -> f64 {
    match Duration::from_micros(micros).as_secs_f64() {
        secs if secs > 0.0 => hashes as f64 / secs,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xhash::xhash;
    use core::ptr;

    #[test]
    fn test_ffi_hash_matches_rust() {
        let header = [3u8; HEADER_BYTES];
        let mut out = [0u8; DIGEST_BYTES];

        assert_eq!(xhash_hash(header.as_ptr(), 99, out.as_mut_ptr()), 1);

        let words = HeaderWords::from_bytes(&header).unwrap();
        assert_eq!(out, xhash(&words, 99).to_bytes());
    }

    #[test]
    fn test_ffi_rejects_null() {
        let mut out = [0u8; DIGEST_BYTES];
        assert_eq!(xhash_hash(ptr::null(), 0, out.as_mut_ptr()), 0);
        assert_eq!(out, [0u8; DIGEST_BYTES]);

        let mut done = 5u64;
        let target = [u32::MAX; TARGET_WORDS];
        assert_eq!(
            xhash_scanhash(ptr::null_mut(), target.as_ptr(), 10, 0, ptr::null(), &mut done),
            0
        );
        assert_eq!(done, 5);
    }

    #[test]
    fn test_ffi_scanhash_writes_back_nonce() {
        let mut data = [0u32; HEADER_WORDS];
        data[NONCE_INDEX] = 10;
        let mut done = 0u64;

        // Nothing matches a zero target (barring an all-zero digest)
        let zero = [0u32; TARGET_WORDS];
        let found = xhash_scanhash(data.as_mut_ptr(), zero.as_ptr(), 19, 7, ptr::null(), &mut done);
        assert_eq!(found, 0);
        assert_eq!(data[NONCE_INDEX], 19);
        assert_eq!(done, 10);

        // Anything matches the maximum target
        let max = [u32::MAX; TARGET_WORDS];
        data[NONCE_INDEX] = 3;
        let flag = AtomicBool::new(false);
        let found = xhash_scanhash(data.as_mut_ptr(), max.as_ptr(), 100, 7, &flag, &mut done);
        assert_eq!(found, 1);
        assert_eq!(data[NONCE_INDEX], 3);
        assert_eq!(done, 1);
    }

    #[test]
    fn test_ffi_hashrate() {
        assert_eq!(xhash_hashrate(1000, 0), 0.0);
        assert_eq!(xhash_hashrate(1000, 1_000_000), 1000.0);
        assert_eq!(xhash_hashrate(3, 500_000), 6.0);
    }

    #[test]
    fn test_ffi_benchmark_runs_scan() {
        assert_eq!(xhash_benchmark(0), 0);
        assert!(xhash_benchmark(4) < 60_000_000);
    }
}
