//! The three payload `Kind`s: `Shear` (spin-2, complex), `Scalar` (real),
//! and `Count` (no payload beyond weight).

use num_complex::Complex64;

/// A `Kind` fixes the shape of the per-point and per-aggregate payload.
/// Mirroring `Geometry`, the aggregation arithmetic for a given `Kind` is
/// monomorphic: no branching on which kind is in play happens inside the
/// hot summation loop.
pub trait PayloadKind: Send + Sync + 'static {
    /// The accumulator carried by a `CellData` of this kind. A raw weighted
    /// sum, never a mean — the pair-walker divides by the cell's total
    /// weight as needed.
    type Accumulator: Copy + Send + Sync + std::fmt::Debug + std::ops::Add<Output = Self::Accumulator>;

    /// Identity element for `Accumulator` addition.
    fn zero() -> Self::Accumulator;

    /// The weighted contribution of a single input row to the accumulator.
    /// `g1`/`g2` are the shear components, `k` the scalar value; unused
    /// arguments for a given `Kind` are ignored by its implementation.
    fn contribution(w: f64, g1: f64, g2: f64, k: f64) -> Self::Accumulator;

    /// Names of the columns (beyond `coord1`/`coord2`/`w`, which every `Kind`
    /// needs) that `Field::build` must reject as `InvalidDimensions` if
    /// absent. Matches the names used by [`crate::field::Columns`].
    fn required_columns() -> &'static [&'static str];
}

/// Spin-2 shear payload: `Σ wᵢ (g1ᵢ + i g2ᵢ)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shear;

impl PayloadKind for Shear {
    type Accumulator = Complex64;

    fn zero() -> Self::Accumulator {
        Complex64::new(0.0, 0.0)
    }

    fn contribution(w: f64, g1: f64, g2: f64, _k: f64) -> Self::Accumulator {
        Complex64::new(w * g1, w * g2)
    }

    fn required_columns() -> &'static [&'static str] {
        &["g1", "g2"]
    }
}

/// Scalar field payload: `Σ wᵢ kᵢ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar;

impl PayloadKind for Scalar {
    type Accumulator = f64;

    fn zero() -> Self::Accumulator {
        0.0
    }

    fn contribution(w: f64, _g1: f64, _g2: f64, k: f64) -> Self::Accumulator {
        w * k
    }

    fn required_columns() -> &'static [&'static str] {
        &["k"]
    }
}

/// Pure-count payload: no accumulator beyond the cell's total weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count;

/// Zero-sized accumulator for [`Count`]; exists only so `Count` can share
/// the `Add`-based accumulator interface with `Shear` and `Scalar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoPayload;

impl std::ops::Add for NoPayload {
    type Output = NoPayload;

    fn add(self, _other: NoPayload) -> NoPayload {
        NoPayload
    }
}

impl PayloadKind for Count {
    type Accumulator = NoPayload;

    fn zero() -> Self::Accumulator {
        NoPayload
    }

    fn contribution(_w: f64, _g1: f64, _g2: f64, _k: f64) -> Self::Accumulator {
        NoPayload
    }

    fn required_columns() -> &'static [&'static str] {
        &[]
    }
}
