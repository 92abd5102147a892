//! Builds a spatial index — a forest of binary-partitioned `Cell`s — over a
//! weighted astronomical catalog of shear, scalar, or count-only points, in
//! either a flat plane or on the sphere.
//!
//! The index is the input a downstream two-point correlation-function
//! pair-walker consumes: every `Cell`'s aggregate weight, `Σ wᵢ²`, and
//! payload sum let the walker treat a whole cell as one effective point once
//! it is small enough relative to the separation scale being sampled.
//!
//! The crate is generic over two independent axes, each resolved at compile
//! time so the hot aggregation and partition loops never branch on which
//! instantiation is running:
//!
//! - [`kind::PayloadKind`]: what a point carries besides its position and
//!   weight ([`kind::Shear`], [`kind::Scalar`], [`kind::Count`]).
//! - [`geometry::Geometry`]: where a point lives and how distance is
//!   measured ([`geometry::Flat`], [`geometry::Sphere`]).

pub mod cell;
pub mod cell_data;
pub mod error;
pub mod field;
pub mod geometry;
pub mod kind;
pub mod split;
pub mod top_level;
mod utils;

pub use cell::Cell;
pub use cell_data::{CellData, Summary};
pub use error::{FieldError, FieldResult};
pub use field::{flat_from_row, sphere_from_row, Columns, Field};
pub use geometry::{convert_separation, AngleUnit, Flat, Geometry, Sphere};
pub use kind::{Count, NoPayload, PayloadKind, Scalar, Shear};
pub use split::{SplitMethod, SplitState};
pub use top_level::{setup_top_level, TopLevelRoot};
