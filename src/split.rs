//! The `Partitioner`: splits a mutable slice of `CellData` in place along
//! the axis of largest extent, according to a `SplitMethod`.

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cell_data::CellData;
use crate::error::FieldError;
use crate::geometry::Geometry;
use crate::kind::PayloadKind;
use crate::utils;

/// Policy used to choose the split point along the selected axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMethod {
    /// Split at the (unweighted) mean of the coordinate.
    Mean,
    /// Split at the (unweighted) median of the coordinate.
    Median,
    /// Split at the midpoint between the min and max of the coordinate.
    Middle,
    /// Split at a uniformly random position between the min and max.
    Random,
}

impl SplitMethod {
    /// Decodes the integer encoding used by the foreign-callable
    /// constructors: 0 = Mean, 1 = Median, 2 = Middle, 3 = Random.
    pub fn from_code(code: i32) -> Result<Self, FieldError> {
        match code {
            0 => Ok(SplitMethod::Mean),
            1 => Ok(SplitMethod::Median),
            2 => Ok(SplitMethod::Middle),
            3 => Ok(SplitMethod::Random),
            _ => Err(FieldError::InvalidParameter {
                parameter: "split_method",
                message: format!("unknown split method code {code}"),
            }),
        }
    }
}

impl std::str::FromStr for SplitMethod {
    type Err = FieldError;

    /// Parses the symbolic names a configuration layer would accept.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "mean" => Ok(SplitMethod::Mean),
            "median" => Ok(SplitMethod::Median),
            "middle" => Ok(SplitMethod::Middle),
            "random" => Ok(SplitMethod::Random),
            other => Err(FieldError::InvalidParameter {
                parameter: "split_method",
                message: format!("unrecognized split method name `{other}`"),
            }),
        }
    }
}

/// Threads a `SplitMethod` and (for `Random`) a seeded generator through a
/// sequence of partition calls, so that `Random` is reproducible given a
/// fixed seed and a fixed call order.
#[derive(Debug, Clone)]
pub struct SplitState {
    method: SplitMethod,
    rng: Option<ChaCha8Rng>,
}

impl SplitState {
    /// Builds a `SplitState` for the sequential top-level pass. `seed` only
    /// matters when `method == SplitMethod::Random`.
    pub fn new(method: SplitMethod, seed: u64) -> Self {
        SplitState {
            method,
            rng: matches!(method, SplitMethod::Random).then(|| ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Derives an independent `SplitState` for one top-level root's
    /// subsequent (single-threaded, but concurrent with other roots)
    /// subtree build. Each root gets its own RNG stream mixed from the
    /// original seed and the root's index, so the parallel subtree build
    /// stays deterministic without sharing RNG state across threads.
    pub fn for_root(&self, seed: u64, root_index: usize) -> Self {
        const MIX: u64 = 0x9E37_79B9_7F4A_7C15; // golden-ratio splitmix constant
        SplitState {
            method: self.method,
            rng: matches!(self.method, SplitMethod::Random)
                .then(|| ChaCha8Rng::seed_from_u64(seed ^ (root_index as u64).wrapping_mul(MIX))),
        }
    }

    pub fn method(&self) -> SplitMethod {
        self.method
    }
}

/// Partitions `slice[..]` in place, returning `mid` such that
/// `slice[..mid]` lies "left" of the split plane and `slice[mid..]` lies
/// "right". Must not be called with fewer than two elements.
pub fn split<K: PayloadKind, G: Geometry>(
    slice: &mut [CellData<K, G>],
    state: &mut SplitState,
) -> usize {
    debug_assert!(slice.len() >= 2, "partitioner requires at least two elements");

    let axis = select_axis::<K, G>(slice);
    let coords: Vec<f64> = slice.iter().map(|cd| G::coordinate(cd.pos(), axis)).collect();
    let (lo, hi) = utils::min_max(&coords);

    let split_value = split_value(state, &coords, lo, hi);
    let mid = partition_by(slice, &coords, split_value);

    if mid == 0 || mid == slice.len() {
        // Degenerate: the chosen policy put everything on one side.
        // Fall back to Median on the same axis to guarantee progress.
        let median_value = utils::median(&coords);
        let mid = partition_by(slice, &coords, median_value);
        if mid == 0 || mid == slice.len() {
            // Last resort: every point already compared equal under every
            // policy (can only happen via pathological floating-point
            // ties). Put the first point left, the rest right.
            1
        } else {
            mid
        }
    } else {
        mid
    }
}

/// Picks the split value for the current policy, advancing the RNG for
/// `Random`.
fn split_value(state: &mut SplitState, coords: &[f64], lo: f64, hi: f64) -> f64 {
    match state.method {
        SplitMethod::Mean => utils::mean(coords),
        SplitMethod::Median => utils::median(coords),
        SplitMethod::Middle => (lo + hi) / 2.0,
        SplitMethod::Random => {
            let rng = state
                .rng
                .as_mut()
                .expect("SplitState::new sets rng for SplitMethod::Random");
            rng.gen_range(lo..hi)
        }
    }
}

/// Reorders `slice` (and the matching `coords`) so that every element whose
/// coordinate is `<= split_value` comes first. Ties go left. Returns the
/// pivot index.
fn partition_by<K: PayloadKind, G: Geometry>(
    slice: &mut [CellData<K, G>],
    coords: &[f64],
    split_value: f64,
) -> usize {
    let mut coords = coords.to_vec();
    let mut i = 0;
    for j in 0..slice.len() {
        if coords[j] <= split_value {
            slice.swap(i, j);
            coords.swap(i, j);
            i += 1;
        }
    }
    i
}

/// Selects the Cartesian axis of largest (unweighted) coordinate extent
/// across the contained leaves.
fn select_axis<K: PayloadKind, G: Geometry>(slice: &[CellData<K, G>]) -> usize {
    (0..G::NUM_AXES)
        .map(|axis| {
            let coords: Vec<f64> = slice.iter().map(|cd| G::coordinate(cd.pos(), axis)).collect();
            let (lo, hi) = utils::min_max(&coords);
            (axis, hi - lo)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).expect("extents are never NaN"))
        .map(|(axis, _)| axis)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Flat;
    use crate::kind::Count;

    fn leaf(x: f64, y: f64, w: f64) -> CellData<Count, Flat> {
        CellData::from_point((x, y), w, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_split_method_from_code() {
        assert_eq!(SplitMethod::from_code(0).unwrap(), SplitMethod::Mean);
        assert_eq!(SplitMethod::from_code(3).unwrap(), SplitMethod::Random);
        assert!(SplitMethod::from_code(4).is_err());
    }

    #[test]
    fn test_split_method_from_str() {
        use std::str::FromStr;
        assert_eq!(SplitMethod::from_str("Median").unwrap(), SplitMethod::Median);
        assert!(SplitMethod::from_str("nope").is_err());
    }

    #[test]
    fn test_middle_split_separates_extremes() {
        let mut slice = vec![leaf(0.0, 0.0, 1.0), leaf(10.0, 0.0, 1.0), leaf(1.0, 0.0, 1.0)];
        let mut state = SplitState::new(SplitMethod::Middle, 0);
        let mid = split(&mut slice, &mut state);
        assert!(mid > 0 && mid < slice.len());
        for cd in &slice[..mid] {
            assert!(cd.pos().0 <= 5.0);
        }
        for cd in &slice[mid..] {
            assert!(cd.pos().0 > 5.0);
        }
    }

    #[test]
    fn test_random_split_is_reproducible_given_seed() {
        let points = vec![leaf(0.0, 0.0, 1.0), leaf(3.0, 0.0, 1.0), leaf(7.0, 0.0, 1.0), leaf(9.0, 0.0, 1.0)];

        let mut a = points.clone();
        let mut state_a = SplitState::new(SplitMethod::Random, 42);
        let mid_a = split(&mut a, &mut state_a);

        let mut b = points.clone();
        let mut state_b = SplitState::new(SplitMethod::Random, 42);
        let mid_b = split(&mut b, &mut state_b);

        assert_eq!(mid_a, mid_b);
        assert_eq!(a, b);
    }
}
