//! `Cell<Kind, Geom>`: a node of the spatial tree.

use crate::cell_data::CellData;
use crate::geometry::Geometry;
use crate::kind::PayloadKind;
use crate::split::{self, SplitState};

/// A node of the spatial tree. A leaf owns only its summary; an internal
/// cell also owns exactly two children.
#[derive(Debug)]
pub struct Cell<K: PayloadKind, G: Geometry> {
    data: CellData<K, G>,
    sizesq: f64,
    children: Option<Box<(Cell<K, G>, Cell<K, G>)>>,
}

impl<K: PayloadKind, G: Geometry> Cell<K, G> {
    /// Builds a `Cell` from `slice`, recursing until every leaf either
    /// contains exactly one point or has `sizesq <= minsizesq`.
    ///
    /// `summary` and `sizesq` are the already-computed aggregate and
    /// squared extent of `slice`; callers (the top-level setup, or this
    /// function recursing on a child range) always have these in hand
    /// before deciding whether to split further.
    pub fn build(
        summary: CellData<K, G>,
        sizesq: f64,
        slice: &mut [CellData<K, G>],
        minsizesq: f64,
        state: &mut SplitState,
    ) -> Self {
        if slice.len() == 1 || sizesq <= minsizesq {
            return Cell {
                data: summary,
                sizesq,
                children: None,
            };
        }

        let mid = split::split(slice, state);
        let (left_slice, right_slice) = slice.split_at_mut(mid);

        let left_summary = CellData::summarize(left_slice);
        let left_sizesq = G::bounding_size_sq(left_summary.pos, left_slice.iter().map(|cd| cd.pos()));
        let left_data = CellData::finish_averages(left_summary, left_slice);
        let left = Cell::build(left_data, left_sizesq, left_slice, minsizesq, state);

        let right_summary = CellData::summarize(right_slice);
        let right_sizesq = G::bounding_size_sq(right_summary.pos, right_slice.iter().map(|cd| cd.pos()));
        let right_data = CellData::finish_averages(right_summary, right_slice);
        let right = Cell::build(right_data, right_sizesq, right_slice, minsizesq, state);

        debug_assert!(sizesq >= left.sizesq && sizesq >= right.sizesq);

        Cell {
            data: summary,
            sizesq,
            children: Some(Box::new((left, right))),
        }
    }

    /// A single-point root Cell, used by brute-force mode (`maxsizesq == 0`).
    pub fn singleton(data: CellData<K, G>) -> Self {
        Cell {
            data,
            sizesq: 0.0,
            children: None,
        }
    }

    pub fn data(&self) -> &CellData<K, G> {
        &self.data
    }

    pub fn sizesq(&self) -> f64 {
        self.sizesq
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<(&Cell<K, G>, &Cell<K, G>)> {
        self.children.as_ref().map(|boxed| (&boxed.0, &boxed.1))
    }

    /// Number of original catalog points contained in this cell's subtree.
    pub fn cardinality(&self) -> usize {
        match &self.children {
            None => 1,
            Some(boxed) => boxed.0.cardinality() + boxed.1.cardinality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Flat;
    use crate::kind::Count;
    use float_cmp::approx_eq;

    fn leaf(x: f64, y: f64) -> CellData<Count, Flat> {
        CellData::from_point((x, y), 1.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_single_point_is_leaf_with_zero_sizesq() {
        let mut slice = vec![leaf(0.0, 0.0)];
        let summary = CellData::aggregate(&slice);
        let mut state = SplitState::new(crate::split::SplitMethod::Mean, 0);
        let cell = Cell::build(summary, 0.0, &mut slice, 0.0, &mut state);
        assert!(cell.is_leaf());
        assert!(approx_eq!(f64, cell.sizesq(), 0.0));
    }

    #[test]
    fn test_build_respects_minsizesq_and_conserves_weight() {
        let mut slice: Vec<_> = (0..20).map(|i| leaf(i as f64, 0.0)).collect();
        let summary = CellData::aggregate(&slice);
        let sizesq = Flat::bounding_size_sq(summary.pos(), slice.iter().map(|cd| cd.pos()));
        let mut state = SplitState::new(crate::split::SplitMethod::Mean, 0);
        let cell = Cell::build(summary, sizesq, &mut slice, 4.0, &mut state);

        assert!(approx_eq!(f64, cell.data().w(), 20.0));
        assert_eq!(cell.cardinality(), 20);

        fn check_leaf_bound<K: crate::kind::PayloadKind>(cell: &Cell<K, Flat>, minsizesq: f64) {
            if let Some((l, r)) = cell.children() {
                assert!(cell.sizesq() >= l.sizesq());
                assert!(cell.sizesq() >= r.sizesq());
                check_leaf_bound(l, minsizesq);
                check_leaf_bound(r, minsizesq);
            } else if cell.cardinality() > 1 {
                assert!(cell.sizesq() <= minsizesq);
            }
        }
        check_leaf_bound(&cell, 4.0);
    }
}
