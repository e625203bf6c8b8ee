//! Hinted galloping search over monotone predicates
//!
//! Used for window ends, where appending a word never lowers the count.
//!
//! Each predicate evaluation costs a tokenizer call, so the search starts at a
//! caller-supplied guess when one exists and doubles its step outward from
//! there before bisecting. An exact guess settles in two evaluations; no
//! guess costs O(log n).

use crate::error::Result;

/// First `x` in `[lo, hi]` where `pred` holds, or `hi + 1` if it never does.
///
/// `pred` must be monotone: false up to some point, true after it.
pub(crate) fn partition_point<F>(lo: usize, hi: usize, hint: Option<usize>, mut pred: F) -> Result<usize>
where
    F: FnMut(usize) -> Result<bool>,
{
    // Answer lies in [f, t]: everything below f is false, t is true or past hi
    let mut f = lo;
    let mut t = hi + 1;
    if f >= t {
        return Ok(t);
    }

    match hint.map(|h| h.clamp(lo, hi)) {
        Some(h) if h > f => {
            if pred(h)? {
                t = h;
                let mut step = 1;
                while t >= f + step {
                    let mid = t - step;
                    if pred(mid)? {
                        t = mid;
                        step *= 2;
                    } else {
                        f = mid + 1;
                        break;
                    }
                }
            } else {
                f = h + 1;
                gallop_up(&mut f, &mut t, &mut pred)?;
            }
        }
        _ => gallop_up(&mut f, &mut t, &mut pred)?,
    }

    while f < t {
        let mid = f + (t - f) / 2;
        if pred(mid)? {
            t = mid;
        } else {
            f = mid + 1;
        }
    }

    Ok(t)
}

fn gallop_up<F>(f: &mut usize, t: &mut usize, pred: &mut F) -> Result<()>
where
    F: FnMut(usize) -> Result<bool>,
{
    let mut step = 1;
    loop {
        let mid = *f + step - 1;
        if mid >= *t {
            return Ok(());
        }
        if pred(mid)? {
            *t = mid;
            return Ok(());
        }
        *f = mid + 1;
        step *= 2;
    }
}

/// Largest `x` in `[lo, hi]` where `pred` holds (pred: true then false).
///
/// `pred(lo)` is taken as already established and never evaluated.
pub(crate) fn last_true<F>(lo: usize, hi: usize, hint: Option<usize>, mut pred: F) -> Result<usize>
where
    F: FnMut(usize) -> Result<bool>,
{
    if hi <= lo {
        return Ok(lo);
    }

    let first_false = partition_point(
        lo + 1,
        hi,
        hint.map(|h| h.saturating_add(1)),
        |x| Ok(!pred(x)?),
    )?;
    Ok(first_false - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(threshold: usize, calls: &Cell<usize>) -> impl FnMut(usize) -> Result<bool> + '_ {
        move |x| {
            calls.set(calls.get() + 1);
            Ok(x >= threshold)
        }
    }

    #[test]
    fn test_partition_point_exhaustive() {
        for hi in 0..20 {
            for threshold in 0..=hi + 2 {
                for hint in [None, Some(0), Some(threshold), Some(hi / 2), Some(hi + 5)] {
                    let calls = Cell::new(0);
                    let point = partition_point(0, hi, hint, counting(threshold, &calls)).unwrap();
                    assert_eq!(point, threshold.min(hi + 1), "hi={hi} threshold={threshold} hint={hint:?}");
                }
            }
        }
    }

    #[test]
    fn test_exact_hint_is_cheap() {
        let calls = Cell::new(0);
        let point = partition_point(0, 10_000, Some(7_321), counting(7_321, &calls)).unwrap();

        assert_eq!(point, 7_321);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_no_hint_is_logarithmic() {
        let calls = Cell::new(0);
        let point = partition_point(0, 1_000_000, None, counting(654_321, &calls)).unwrap();

        assert_eq!(point, 654_321);
        assert!(calls.get() < 60, "took {} calls", calls.get());
    }

    #[test]
    fn test_last_true() {
        assert_eq!(last_true(3, 10, None, |x| Ok(x <= 7)).unwrap(), 7);
        assert_eq!(last_true(3, 10, Some(10), |x| Ok(x <= 10)).unwrap(), 10);
        assert_eq!(last_true(3, 10, Some(9), |x| Ok(x <= 3)).unwrap(), 3);
        assert_eq!(last_true(4, 4, None, |_| Ok(false)).unwrap(), 4);
    }

    #[test]
    fn test_errors_propagate() {
        let result = partition_point(0, 10, None, |x| {
            if x == 1 {
                Err(crate::Error::tokenizer("test", "boom"))
            } else {
                Ok(false)
            }
        });
        assert!(result.is_err());
    }
}
