//! Response curves that reshape normalized channel values.

use serde::{Deserialize, Serialize};

/// A single curve control point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Input value.
    pub time: f32,
    /// Output value at `time`.
    pub value: f32,
}

impl CurveKey {
    /// Shorthand constructor.
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Errors from building a [`ResponseCurve`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// The curve has no keys.
    #[error("response curve needs at least one key")]
    Empty,
    /// A key has a NaN or infinite component.
    #[error("curve key {0} is not finite")]
    NonFinite(usize),
    /// Key times are not strictly increasing.
    #[error("curve key {0} is not after the previous key")]
    Unsorted(usize),
}

/// Piecewise-linear curve over sorted keys.
///
/// Inputs before the first key or after the last evaluate to that key's
/// value; the curve never extrapolates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Build a curve, rejecting empty, non-finite or unsorted keys.
    pub fn from_keys(keys: Vec<CurveKey>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (i, key) in keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(CurveError::NonFinite(i));
            }
            if i > 0 && key.time <= keys[i - 1].time {
                return Err(CurveError::Unsorted(i));
            }
        }
        Ok(Self { keys })
    }

    /// `f(t) = t` on `[0, 1]`.
    pub fn identity() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    /// `f(t) = value` everywhere.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, value)],
        }
    }

    /// The control points, sorted by time.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`, clamped to the key domain.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }
        // First key strictly after t; guaranteed in 1..len by the checks above.
        let hi = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[hi - 1];
        let b = self.keys[hi];
        let f = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * f
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<Vec<CurveKey>> for ResponseCurve {
    type Error = CurveError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::from_keys(keys)
    }
}

impl From<ResponseCurve> for Vec<CurveKey> {
    fn from(curve: ResponseCurve) -> Self {
        curve.keys
    }
}

/// Hermite smoothstep between 0 and 1, with `t` clamped first.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passes_through() {
        let curve = ResponseCurve::identity();
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!((curve.evaluate(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clamped_outside_domain() {
        let curve = ResponseCurve::from_keys(vec![
            CurveKey::new(0.2, 0.1),
            CurveKey::new(0.8, 0.9),
        ])
        .unwrap();
        assert_eq!(curve.evaluate(-3.0), 0.1);
        assert_eq!(curve.evaluate(0.0), 0.1);
        assert_eq!(curve.evaluate(1.0), 0.9);
        assert_eq!(curve.evaluate(42.0), 0.9);
    }

    #[test]
    fn test_interpolates_between_keys() {
        let curve = ResponseCurve::from_keys(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.5, 0.0),
            CurveKey::new(1.0, 1.0),
        ])
        .unwrap();
        assert!((curve.evaluate(0.25) - 0.0).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nan_input_maps_to_first_key() {
        let curve = ResponseCurve::identity();
        assert_eq!(curve.evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn test_constant_curve() {
        let curve = ResponseCurve::constant(0.3);
        assert_eq!(curve.evaluate(-1.0), 0.3);
        assert_eq!(curve.evaluate(0.7), 0.3);
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert_eq!(ResponseCurve::from_keys(vec![]), Err(CurveError::Empty));
        assert_eq!(
            ResponseCurve::from_keys(vec![CurveKey::new(0.5, 0.0), CurveKey::new(0.5, 1.0)]),
            Err(CurveError::Unsorted(1))
        );
        assert_eq!(
            ResponseCurve::from_keys(vec![CurveKey::new(0.0, f32::INFINITY)]),
            Err(CurveError::NonFinite(0))
        );
    }

    #[test]
    fn test_smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(2.0), 1.0);
    }
}
