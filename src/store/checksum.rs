//! Content checksum.
//!
//! 32-bit polynomial rolling hash (`h = h * 31 + byte`). It is a sanity
//! signal for debugging only: not collision resistant, never used for
//! addressing or deduplication.

pub fn content_hash(content: &[u8]) -> String {
    let hash = content
        .iter()
        .fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    format!("{hash:08x}")
}
