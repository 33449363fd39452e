use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Closed interval `[min, max]` for a user-settable quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Real,
    pub max: Real,
}

impl Bounds {
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    /// Clamp into the interval. NaN maps to `min` so the result is always usable.
    pub fn clamp(&self, v: Real) -> Real {
        if v.is_nan() {
            self.min
        } else {
            v.clamp(self.min, self.max)
        }
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.min && v <= self.max
    }

    /// Strict variant for configuration input: rejects instead of clamping.
    pub fn check(&self, v: Real, what: &'static str) -> Result<Real, CoreError> {
        let v = ensure_finite(v, what)?;
        if self.contains(v) {
            Ok(v)
        } else {
            Err(CoreError::OutOfRange {
                what,
                value: v,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Clamp an integer count into `[min, max]`.
pub fn clamp_count(n: i64, min: u32, max: u32) -> u32 {
    n.clamp(i64::from(min), i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn bounds_clamp_and_nan() {
        let b = Bounds::new(1.0, 100.0);
        assert_eq!(b.clamp(0.0), 1.0);
        assert_eq!(b.clamp(250.0), 100.0);
        assert_eq!(b.clamp(42.5), 42.5);
        assert_eq!(b.clamp(Real::NAN), 1.0);
    }

    #[test]
    fn bounds_check_rejects() {
        let b = Bounds::new(0.0, 1.0);
        assert!(b.check(0.5, "q").is_ok());
        assert!(matches!(
            b.check(1.5, "q"),
            Err(CoreError::OutOfRange { what: "q", .. })
        ));
        assert!(matches!(
            b.check(Real::INFINITY, "q"),
            Err(CoreError::NonFinite { .. })
        ));
    }

    #[test]
    fn clamp_count_limits() {
        assert_eq!(clamp_count(0, 1, 20), 1);
        assert_eq!(clamp_count(-7, 1, 20), 1);
        assert_eq!(clamp_count(21, 1, 20), 20);
        assert_eq!(clamp_count(7, 1, 20), 7);
    }
}
