//! Arena growth policy for the per-frame buffers
//!
//! Buffers are cleared (length zero, capacity kept) between uses and only
//! ever grow. When a reservation does not fit, capacity becomes the required
//! length plus half the old capacity.

use crate::error::{Result, TessError};

/// Make room for `additional` more elements in `buf`.
pub(crate) fn reserve<T>(buf: &mut Vec<T>, additional: usize, name: &'static str) -> Result<()> {
    let needed = buf.len() + additional;
    if needed <= buf.capacity() {
        return Ok(());
    }

    let target = needed + buf.capacity() / 2;
    tracing::debug!(buffer = name, from = buf.capacity(), to = target, "growing arena");
    buf.try_reserve_exact(target - buf.len())
        .map_err(|_| TessError::OutOfMemory {
            buffer: name,
            requested: target,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_overallocates_by_half() {
        let mut buf: Vec<u32> = Vec::with_capacity(8);
        buf.extend(0..8);
        reserve(&mut buf, 2, "test").unwrap();
        // needed 10 + 8 / 2
        assert!(buf.capacity() >= 14);
    }

    #[test]
    fn test_no_growth_when_it_fits() {
        let mut buf: Vec<u32> = Vec::with_capacity(16);
        buf.push(1);
        reserve(&mut buf, 4, "test").unwrap();
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_capacity_survives_clear() {
        let mut buf: Vec<u32> = Vec::new();
        reserve(&mut buf, 100, "test").unwrap();
        let cap = buf.capacity();
        buf.extend(0..100);
        buf.clear();
        reserve(&mut buf, 100, "test").unwrap();
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn test_overflow_reports_error() {
        let mut buf: Vec<u64> = Vec::new();
        let err = reserve(&mut buf, usize::MAX / 2, "points").unwrap_err();
        assert!(matches!(err, TessError::OutOfMemory { buffer: "points", .. }));
    }
}
