//! `setup_top_level`: the sequential pre-pass that drives the same
//! recursion as `Cell::build`, but stops as soon as a subtree root's
//! `sizesq <= maxsizesq`, instead of recursing all the way to `minsizesq`.

use crate::cell_data::CellData;
use crate::geometry::Geometry;
use crate::kind::PayloadKind;
use crate::split::{self, SplitState};

/// One accepted top-level root: its aggregated summary, squared extent, and
/// the length of the (already reordered) slice range it owns.
pub struct TopLevelRoot<K: PayloadKind, G: Geometry> {
    pub summary: CellData<K, G>,
    pub sizesq: f64,
    pub len: usize,
}

/// Runs the top-level pre-pass over `slice`, reordering it in place and
/// returning the list of accepted roots in slice order. The `i`-th root's
/// elements are `slice[offset_i .. offset_i + root_i.len]`, where
/// `offset_i` is the sum of the lengths of all preceding roots — i.e. the
/// roots partition `slice` into contiguous, disjoint ranges in order.
pub fn setup_top_level<K: PayloadKind, G: Geometry>(
    slice: &mut [CellData<K, G>],
    maxsizesq: f64,
    state: &mut SplitState,
) -> Vec<TopLevelRoot<K, G>> {
    let mut roots = Vec::new();
    recurse(slice, maxsizesq, state, &mut roots);
    roots
}

fn recurse<K: PayloadKind, G: Geometry>(
    slice: &mut [CellData<K, G>],
    maxsizesq: f64,
    state: &mut SplitState,
    roots: &mut Vec<TopLevelRoot<K, G>>,
) {
    if slice.len() == 1 {
        roots.push(TopLevelRoot {
            summary: slice[0],
            sizesq: 0.0,
            len: 1,
        });
        return;
    }

    let summary = CellData::summarize(slice);
    let sizesq = G::bounding_size_sq(summary.pos, slice.iter().map(|cd| cd.pos()));

    if sizesq <= maxsizesq {
        let full = CellData::finish_averages(summary, slice);
        roots.push(TopLevelRoot {
            summary: full,
            sizesq,
            len: slice.len(),
        });
        return;
    }

    let mid = split::split(slice, state);
    let (left, right) = slice.split_at_mut(mid);
    recurse(left, maxsizesq, state, roots);
    recurse(right, maxsizesq, state, roots);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Flat;
    use crate::kind::Count;
    use crate::split::SplitMethod;

    fn leaf(x: f64, y: f64) -> CellData<Count, Flat> {
        CellData::from_point((x, y), 1.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_stops_as_soon_as_maxsizesq_satisfied() {
        let mut slice: Vec<_> = (0..8).map(|i| leaf(i as f64 * 10.0, 0.0)).collect();
        let mut state = SplitState::new(SplitMethod::Mean, 0);
        let roots = setup_top_level(&mut slice, 5.0 * 5.0, &mut state);

        let total_len: usize = roots.iter().map(|r| r.len).sum();
        assert_eq!(total_len, 8);
        for r in &roots {
            if r.len > 1 {
                assert!(r.sizesq <= 5.0 * 5.0);
            } else {
                assert_eq!(r.sizesq, 0.0);
            }
        }
    }

    #[test]
    fn test_single_point_emits_zero_sizesq() {
        let mut slice = vec![leaf(1.0, 2.0)];
        let mut state = SplitState::new(SplitMethod::Mean, 0);
        let roots = setup_top_level(&mut slice, 100.0, &mut state);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].len, 1);
        assert_eq!(roots[0].sizesq, 0.0);
    }
}
