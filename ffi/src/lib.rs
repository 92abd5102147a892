//! Foreign-callable construction and destruction entry points.
//!
//! Six constructors and six destructors, one pair per `(Kind, Geometry)`,
//! each a thin wrapper over [`fieldtree::Field::build`]. A constructor
//! returns an opaque handle (a raw pointer owning a boxed `Field`) or a null
//! pointer on failure; callers retrieve the failure reason from
//! [`fieldtree_last_error_code`] / [`fieldtree_last_error_message`], which
//! are thread-local so concurrent callers on different threads never
//! clobber each other's error state.
//!
//! Handle lifetime: construct → use (read-only, any number of times, from
//! any thread) → destroy exactly once with the matching destructor. Passing
//! a handle to the wrong destructor, or destroying it twice, is undefined
//! behavior — enforcing otherwise is the caller's responsibility, same as
//! any C ABI.

use std::cell::RefCell;
use std::slice;

use libc::{c_char, c_int};

use fieldtree::{
    flat_from_row, sphere_from_row, AngleUnit, Columns, Count, FieldError, FieldResult, Flat, Scalar, Shear, Sphere,
    SplitMethod,
};

thread_local! {
    static LAST_ERROR: RefCell<Option<FieldError>> = RefCell::new(None);
}

fn set_last_error(err: Option<FieldError>) {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = err);
}

/// Stable numeric code for the most recent error on the calling thread.
/// `0` means "no error", matching the convention that a non-null handle
/// means success. Codes are stable for the lifetime of this ABI version.
#[no_mangle]
pub extern "C" fn fieldtree_last_error_code() -> c_int {
    LAST_ERROR.with(|cell| match &*cell.borrow() {
        None => 0,
        Some(FieldError::InvalidDimensions { .. }) => 1,
        Some(FieldError::InvalidParameter { .. }) => 2,
        Some(FieldError::OutOfMemory) => 3,
    })
}

/// Writes the most recent error's human-readable message into `buf` (of
/// capacity `len` bytes), NUL-terminated, truncating if necessary. Returns
/// the number of bytes written excluding the terminator, or `-1` if there is
/// no pending error or `buf` is null.
///
/// # Safety
/// `buf` must be valid for writes of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn fieldtree_last_error_message(buf: *mut c_char, len: usize) -> c_int {
    if buf.is_null() {
        return -1;
    }
    LAST_ERROR.with(|cell| match &*cell.borrow() {
        None => -1,
        Some(err) => {
            let message = err.to_string();
            let bytes = message.as_bytes();
            let copy_len = bytes.len().min(len.saturating_sub(1));
            let out = slice::from_raw_parts_mut(buf as *mut u8, len);
            out[..copy_len].copy_from_slice(&bytes[..copy_len]);
            out[copy_len] = 0;
            copy_len as c_int
        }
    })
}

/// Borrows a raw `*const f64` column of length `n` as a slice, or an empty
/// slice when the pointer is null (the "column not supplied" case for a
/// `Kind` that does not need it).
unsafe fn column<'a>(ptr: *const f64, n: usize) -> &'a [f64] {
    if ptr.is_null() {
        &[]
    } else {
        slice::from_raw_parts(ptr, n)
    }
}

/// Shared body for all six constructors: validates `n`, decodes the split
/// method, builds the `Field`, and leaks it as an opaque handle.
#[allow(clippy::too_many_arguments)]
unsafe fn build_handle<K, G>(
    coord1: *const f64,
    coord2: *const f64,
    g1: *const f64,
    g2: *const f64,
    k: *const f64,
    w: *const f64,
    n: i64,
    minsep: f64,
    maxsep: f64,
    b: f64,
    split_method_int: i32,
    from_row: impl Fn(usize, &Columns) -> FieldResult<G::Position> + Sync,
) -> *mut fieldtree::Field<K, G>
where
    K: fieldtree::PayloadKind,
    G: fieldtree::Geometry,
{
    let result = (|| -> FieldResult<fieldtree::Field<K, G>> {
        if n < 0 {
            return Err(FieldError::InvalidDimensions {
                message: format!("n must be non-negative, got {n}"),
            });
        }
        let n = n as usize;
        let split_method = SplitMethod::from_code(split_method_int)?;
        let columns = Columns {
            coord1: column(coord1, n),
            coord2: column(coord2, n),
            g1: column(g1, n),
            g2: column(g2, n),
            k: column(k, n),
            w: column(w, n),
        };
        fieldtree::Field::build(columns, n, minsep, maxsep, b, split_method, 0, from_row)
    })();

    match result {
        Ok(field) => {
            set_last_error(None);
            Box::into_raw(Box::new(field))
        }
        Err(err) => {
            log::warn!("fieldtree-ffi: construction failed: {err}");
            set_last_error(Some(err));
            std::ptr::null_mut()
        }
    }
}

/// Destroys a handle returned by the matching constructor. Passing a null
/// pointer is a no-op.
///
/// # Safety
/// `handle` must either be null or have been returned by the matching
/// constructor and not already destroyed.
unsafe fn destroy_handle<K, G>(handle: *mut fieldtree::Field<K, G>)
where
    K: fieldtree::PayloadKind,
    G: fieldtree::Geometry,
{
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

macro_rules! destroy_fn {
    ($destroy_fn:ident, $build_fn:ident, $kind:ty, $geom:ty) => {
        #[doc = concat!("Destructor matching [`", stringify!($build_fn), "`].")]
        ///
        /// # Safety
        /// See [`destroy_handle`].
        #[no_mangle]
        pub unsafe extern "C" fn $destroy_fn(handle: *mut fieldtree::Field<$kind, $geom>) {
            destroy_handle::<$kind, $geom>(handle)
        }
    };
}

macro_rules! ffi_pair_flat {
    ($build_fn:ident, $destroy_fn:ident, $kind:ty) => {
        #[doc = concat!(
            "Constructor for `Field<", stringify!($kind), ", Flat>`. ",
            "Returns an opaque handle, or null on failure (see `fieldtree_last_error_code`)."
        )]
        ///
        /// # Safety
        /// `coord1`/`coord2`/`w` must be valid for reads of `n` `f64`s each.
        /// `g1`/`g2`/`k` must each be either null or valid for reads of `n`
        /// `f64`s, depending on whether this `Kind` consumes them.
        #[no_mangle]
        pub unsafe extern "C" fn $build_fn(
            coord1: *const f64,
            coord2: *const f64,
            g1: *const f64,
            g2: *const f64,
            k: *const f64,
            w: *const f64,
            n: i64,
            minsep: f64,
            maxsep: f64,
            b: f64,
            split_method_int: i32,
        ) -> *mut fieldtree::Field<$kind, Flat> {
            build_handle::<$kind, Flat>(
                coord1,
                coord2,
                g1,
                g2,
                k,
                w,
                n,
                minsep,
                maxsep,
                b,
                split_method_int,
                flat_from_row,
            )
        }

        destroy_fn!($destroy_fn, $build_fn, $kind, Flat);
    };
}

macro_rules! ffi_pair_sphere {
    ($build_fn:ident, $destroy_fn:ident, $kind:ty) => {
        #[doc = concat!(
            "Constructor for `Field<", stringify!($kind), ", Sphere>`. `coord1`/`coord2` are ",
            "read as (ra, dec) in `coord_unit` (0 = radians, 1 = hours, 2 = degrees, 3 = arcmin, ",
            "4 = arcsec). Returns an opaque handle, or null on failure (see `fieldtree_last_error_code`)."
        )]
        ///
        /// # Safety
        /// `coord1`/`coord2`/`w` must be valid for reads of `n` `f64`s each.
        /// `g1`/`g2`/`k` must each be either null or valid for reads of `n`
        /// `f64`s, depending on whether this `Kind` consumes them.
        #[no_mangle]
        pub unsafe extern "C" fn $build_fn(
            coord1: *const f64,
            coord2: *const f64,
            g1: *const f64,
            g2: *const f64,
            k: *const f64,
            w: *const f64,
            n: i64,
            coord_unit: i32,
            minsep: f64,
            maxsep: f64,
            b: f64,
            split_method_int: i32,
        ) -> *mut fieldtree::Field<$kind, Sphere> {
            let unit = match AngleUnit::from_code(coord_unit) {
                Ok(unit) => unit,
                Err(err) => {
                    log::warn!("fieldtree-ffi: construction failed: {err}");
                    set_last_error(Some(err));
                    return std::ptr::null_mut();
                }
            };
            build_handle::<$kind, Sphere>(
                coord1,
                coord2,
                g1,
                g2,
                k,
                w,
                n,
                minsep,
                maxsep,
                b,
                split_method_int,
                sphere_from_row(unit),
            )
        }

        destroy_fn!($destroy_fn, $build_fn, $kind, Sphere);
    };
}

ffi_pair_flat!(build_field_shear_flat, destroy_field_shear_flat, Shear);
ffi_pair_sphere!(build_field_shear_sphere, destroy_field_shear_sphere, Shear);
ffi_pair_flat!(build_field_scalar_flat, destroy_field_scalar_flat, Scalar);
ffi_pair_sphere!(build_field_scalar_sphere, destroy_field_scalar_sphere, Scalar);
ffi_pair_flat!(build_field_count_flat, destroy_field_count_flat, Count);
ffi_pair_sphere!(build_field_count_sphere, destroy_field_count_sphere, Count);
