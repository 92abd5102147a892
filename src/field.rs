//! `Field<Kind, Geom>`: the public entry point. Builds a forest of top-level
//! `Cell`s from raw columnar catalog arrays.

use rayon::prelude::*;

use crate::cell::Cell;
use crate::cell_data::CellData;
use crate::error::{FieldError, FieldResult};
use crate::geometry::{AngleUnit, Geometry, Sphere};
use crate::kind::PayloadKind;
use crate::split::{SplitMethod, SplitState};
use crate::top_level::setup_top_level;

/// Columnar catalog input. Which columns are read depends on `K`: `Shear`
/// reads `g1`/`g2`, `Scalar` reads `k`, `Count` reads neither. Unused
/// columns may be empty.
pub struct Columns<'a> {
    pub coord1: &'a [f64],
    pub coord2: &'a [f64],
    pub g1: &'a [f64],
    pub g2: &'a [f64],
    pub k: &'a [f64],
    pub w: &'a [f64],
}

/// The `from_row` reader for `Flat`: `coord1`/`coord2` are taken directly as
/// `(x, y)`.
pub fn flat_from_row(i: usize, columns: &Columns) -> FieldResult<(f64, f64)> {
    Ok((columns.coord1[i], columns.coord2[i]))
}

/// Builds the `from_row` reader for `Sphere`: `coord1`/`coord2` are read as
/// `(ra, dec)` in `unit` and converted to radians once, per row, here —
/// never repeated in the hot distance-comparison path.
pub fn sphere_from_row(unit: AngleUnit) -> impl Fn(usize, &Columns) -> FieldResult<[f64; 3]> + Sync + Copy {
    move |i: usize, columns: &Columns| Ok(Sphere::from_ra_dec(columns.coord1[i], columns.coord2[i], unit))
}

/// The public entry point: owns a flat forest of top-level `Cell`s. Dropping
/// a `Field` drops every `Cell` and `CellData` transitively reachable from
/// it.
#[derive(Debug)]
pub struct Field<K: PayloadKind, G: Geometry> {
    roots: Vec<Cell<K, G>>,
}

impl<K: PayloadKind, G: Geometry> Field<K, G> {
    /// Number of top-level cells (roots of the forest).
    pub fn num_roots(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> &[Cell<K, G>] {
        &self.roots
    }

    /// Total number of retained catalog points (after zero-weight filtering).
    pub fn cardinality(&self) -> usize {
        self.roots.iter().map(Cell::cardinality).sum()
    }
}

/// Derivation (`spec.md` §4.7): a pair of cells of radii `s1, s2` at center
/// separation `d` is not split further by the opener when
/// `(d + s1 + s2) * b >= max(s1, s2)`. The smallest useful cell is one where
/// two neighbors of comparable size (`s2 = 2 s1`) just fail to split at
/// `d = minsep`, giving `minsize = minsep * b / (2 + 3b)`. No cell larger
/// than `b * maxsep` can ever fail the opener at the largest separation of
/// interest, giving `maxsize = maxsep * b`.
fn derive_sizes(minsep: f64, maxsep: f64, b: f64) -> (f64, f64) {
    let minsize = minsep * b / (2.0 + 3.0 * b);
    let maxsize = maxsep * b;
    (minsize, maxsize)
}

fn validate_parameters(minsep: f64, maxsep: f64, b: f64, n: i64) -> FieldResult<()> {
    if n < 0 {
        return Err(FieldError::InvalidDimensions {
            message: format!("n must be non-negative, got {n}"),
        });
    }
    if minsep < 0.0 {
        return Err(FieldError::InvalidParameter {
            parameter: "minsep",
            message: format!("must be non-negative, got {minsep}"),
        });
    }
    if maxsep < minsep {
        return Err(FieldError::InvalidParameter {
            parameter: "maxsep",
            message: format!("must be >= minsep ({minsep}), got {maxsep}"),
        });
    }
    if b < 0.0 {
        return Err(FieldError::InvalidParameter {
            parameter: "b",
            message: format!("must be non-negative, got {b}"),
        });
    }
    Ok(())
}

/// Checks that the columns required by `K` are present (at least `n`
/// entries each): `coord1`/`coord2`/`w` unconditionally, plus whatever
/// `K::required_columns` names (`g1`/`g2` for `Shear`, `k` for `Scalar`).
fn validate_columns<K: PayloadKind>(columns: &Columns, n: usize) -> FieldResult<()> {
    if columns.coord1.len() < n || columns.coord2.len() < n || columns.w.len() < n {
        return Err(FieldError::InvalidDimensions {
            message: "coord1, coord2, and w must each have at least n entries".to_string(),
        });
    }
    for &name in K::required_columns() {
        let len = match name {
            "g1" => columns.g1.len(),
            "g2" => columns.g2.len(),
            "k" => columns.k.len(),
            other => unreachable!("unknown required column name `{other}`"),
        };
        if len < n {
            return Err(FieldError::InvalidDimensions {
                message: format!("column `{name}` is required by this Kind but has fewer than {n} entries"),
            });
        }
    }
    Ok(())
}

impl<K: PayloadKind, G: Geometry> Field<K, G> {
    /// Builds a `Field` from raw columnar arrays. `n` is the catalog row
    /// count; `columns.coord1`/`coord2` must already be in the units this
    /// `Geometry` expects (e.g. radians for `Sphere`). `split_method` drives
    /// the `Partitioner`; `seed` seeds `SplitMethod::Random` and is ignored
    /// otherwise.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        columns: Columns,
        n: usize,
        minsep: f64,
        maxsep: f64,
        b: f64,
        split_method: SplitMethod,
        seed: u64,
        from_row: impl Fn(usize, &Columns) -> FieldResult<G::Position> + Sync,
    ) -> FieldResult<Self> {
        validate_parameters(minsep, maxsep, b, n as i64)?;
        validate_columns::<K>(&columns, n)?;

        log::debug!("fieldtree: building field over {n} input rows");

        let mut leaves = Vec::with_capacity(n);
        for i in 0..n {
            let w = columns.w[i];
            if w == 0.0 {
                continue;
            }
            let pos = from_row(i, &columns)?;
            let g1 = columns.g1.get(i).copied().unwrap_or(0.0);
            let g2 = columns.g2.get(i).copied().unwrap_or(0.0);
            let k = columns.k.get(i).copied().unwrap_or(0.0);
            leaves.push(CellData::<K, G>::from_point(pos, w, g1, g2, k));
        }

        if leaves.is_empty() {
            log::warn!("fieldtree: all input weights are zero; returning a field with no top-level cells");
            return Ok(Field { roots: Vec::new() });
        }

        let (minsize, maxsize) = derive_sizes(minsep, maxsep, b);
        let minsizesq = minsize * minsize;
        let maxsizesq = maxsize * maxsize;

        log::debug!(
            "fieldtree: {} retained points, minsizesq={minsizesq}, maxsizesq={maxsizesq}",
            leaves.len()
        );

        let roots = if maxsizesq == 0.0 {
            build_brute_force(leaves)
        } else {
            build_hierarchical(leaves, minsizesq, maxsizesq, split_method, seed)
        };

        Ok(Field { roots })
    }
}

/// Brute-force mode (`maxsizesq == 0`): every retained point becomes its own
/// single-point root `Cell`, built in parallel.
fn build_brute_force<K: PayloadKind, G: Geometry>(leaves: Vec<CellData<K, G>>) -> Vec<Cell<K, G>> {
    leaves.into_par_iter().map(Cell::singleton).collect()
}

/// Hierarchical mode: a sequential top-level pass bounded by `maxsizesq`,
/// followed by a parallel build of each top-level root's subtree, bounded by
/// `minsizesq`.
fn build_hierarchical<K: PayloadKind, G: Geometry>(
    mut leaves: Vec<CellData<K, G>>,
    minsizesq: f64,
    maxsizesq: f64,
    split_method: SplitMethod,
    seed: u64,
) -> Vec<Cell<K, G>> {
    let mut top_state = SplitState::new(split_method, seed);
    let roots = setup_top_level(&mut leaves, maxsizesq, &mut top_state);

    log::debug!("fieldtree: top-level setup produced {} roots", roots.len());

    let lens: Vec<usize> = roots.iter().map(|r| r.len).collect();
    let chunks = disjoint_chunks_mut(&mut leaves, &lens);

    roots
        .into_par_iter()
        .zip(chunks.into_par_iter())
        .enumerate()
        .map(|(root_index, (root, chunk))| {
            log::trace!("fieldtree: building subtree for root {root_index} ({} points)", chunk.len());
            let mut state = top_state.for_root(seed, root_index);
            Cell::build(root.summary, root.sizesq, chunk, minsizesq, &mut state)
        })
        .collect()
}

/// Splits `slice` into disjoint mutable sub-slices of the given lengths, in
/// order. `lens` must sum to `slice.len()`. Each parallel subtree-build task
/// gets exclusive `&mut` access to exactly the points it owns, with no
/// shared mutable state across tasks and no runtime borrow-checking needed.
fn disjoint_chunks_mut<'a, T>(mut slice: &'a mut [T], lens: &[usize]) -> Vec<&'a mut [T]> {
    let mut out = Vec::with_capacity(lens.len());
    for &len in lens {
        let (head, tail) = slice.split_at_mut(len);
        out.push(head);
        slice = tail;
    }
    out
}
