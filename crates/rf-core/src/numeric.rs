use crate::RfError;

/// Rates, pressures and times are plain `f64` in bar, Sm3/day and days.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, RfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RfError::NonFinite { what, value: v })
    }
}

/// Amount by which `value` lies outside `[min, max]` (zero when inside).
pub fn bound_violation(value: Real, min: Real, max: Real) -> Real {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "oil rate").unwrap_err();
        assert_eq!(err.to_string(), "oil rate is not finite (NaN)");
    }

    #[test]
    fn bound_violation_is_distance_to_interval() {
        assert_eq!(bound_violation(0.5, 0.0, 1.0), 0.0);
        assert_eq!(bound_violation(-0.25, 0.0, 1.0), 0.25);
        assert_eq!(bound_violation(1.5, 0.0, 1.0), 0.5);
    }
}
