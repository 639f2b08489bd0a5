//! Dense 3D arrays with explicit per-axis strides (component **G** of the specification).
//!
//! Mirrors the reference implementation's habit of wrapping raw index arithmetic
//! (`i*sx + j*sy + k*sz`) behind a typed view rather than exposing pointer math
//! at call sites, the way [`crate::mesh::TriMesh`] wraps flat vertex/index buffers.

use crate::types::{Coord, Pos3, Stride};

/// A dense, row-major-or-otherwise-strided 3D array.
///
/// Storage is a single flat `Vec<T>`; the strides are kept explicit (rather than
/// assumed contiguous row-major) because the specification's discretization mask
/// and label grid are allowed independent strides over the same logical shape.
#[derive(Clone, Debug)]
pub struct Grid3<T> {
    dims: [usize; 3],
    strides: [Stride; 3],
    data: Vec<T>,
}

impl<T: Clone + Default> Grid3<T> {
    /// Allocates a grid of the given dimensions with the default (dense, C-order)
    /// strides and every element set to `T::default()`.
    pub fn new(dims: [usize; 3]) -> Self {
        let strides = default_strides(dims);
        let len = dims[0] * dims[1] * dims[2];
        Self {
            dims,
            strides,
            data: vec![T::default(); len],
        }
    }
}

impl<T> Grid3<T> {
    /// Wraps an existing flat buffer with the given dimensions and strides.
    ///
    /// # Panics
    /// Panics if `data` is not large enough to address every voxel under the
    /// given strides.
    pub fn from_raw_parts(dims: [usize; 3], strides: [Stride; 3], data: Vec<T>) -> Self {
        let required = Self::required_len(dims, strides);
        assert!(
            data.len() >= required,
            "buffer of length {} too small for dims {:?} with strides {:?} (needs {})",
            data.len(),
            dims,
            strides,
            required
        );
        Self {
            dims,
            strides,
            data,
        }
    }

    fn required_len(dims: [usize; 3], strides: [Stride; 3]) -> usize {
        let mut max_index: Stride = 0;
        for axis in 0..3 {
            if dims[axis] == 0 {
                return 0;
            }
            max_index += (dims[axis] as Stride - 1) * strides[axis];
        }
        (max_index + 1).max(0) as usize
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn strides(&self) -> [Stride; 3] {
        self.strides
    }

    /// Flat index of voxel `(i, j, k)`, computed with `i64` intermediates as
    /// required by the specification (so large grids don't overflow).
    #[inline]
    pub fn flat_index(&self, i: Coord, j: Coord, k: Coord) -> Stride {
        i as Stride * self.strides[0] + j as Stride * self.strides[1] + k as Stride * self.strides[2]
    }

    /// Whether `(i, j, k)` lies within `[0, dims)` on every axis.
    #[inline]
    pub fn in_bounds(&self, i: Coord, j: Coord, k: Coord) -> bool {
        i >= 0
            && j >= 0
            && k >= 0
            && (i as usize) < self.dims[0]
            && (j as usize) < self.dims[1]
            && (k as usize) < self.dims[2]
    }

    #[inline]
    pub fn in_bounds_pos(&self, p: Pos3) -> bool {
        self.in_bounds(p[0], p[1], p[2])
    }

    #[inline]
    pub fn get(&self, i: Coord, j: Coord, k: Coord) -> &T {
        &self.data[self.flat_index(i, j, k) as usize]
    }

    #[inline]
    pub fn get_pos(&self, p: Pos3) -> &T {
        self.get(p[0], p[1], p[2])
    }

    #[inline]
    pub fn try_get(&self, i: Coord, j: Coord, k: Coord) -> Option<&T> {
        if self.in_bounds(i, j, k) {
            Some(self.get(i, j, k))
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, i: Coord, j: Coord, k: Coord) -> &mut T {
        let idx = self.flat_index(i, j, k) as usize;
        &mut self.data[idx]
    }

    #[inline]
    pub fn get_pos_mut(&mut self, p: Pos3) -> &mut T {
        self.get_mut(p[0], p[1], p[2])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterates over every voxel position in the grid in `x`-major, `z`-minor
    /// order (outermost loop over the first axis, matching the reference's
    /// habit of parallelizing the leading axis, see §5 of the specification).
    pub fn iter_positions(&self) -> impl Iterator<Item = Pos3> + '_ {
        let [dx, dy, dz] = self.dims;
        (0..dx).flat_map(move |i| {
            (0..dy).flat_map(move |j| (0..dz).map(move |k| [i as Coord, j as Coord, k as Coord]))
        })
    }
}

impl<T: Clone> Grid3<T> {
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value.clone());
    }
}

fn default_strides(dims: [usize; 3]) -> [Stride; 3] {
    [
        (dims[1] * dims[2]) as Stride,
        dims[2] as Stride,
        1 as Stride,
    ]
}

/// The label grid (component **G**). `0` = untouched/outside, `+n` = atom `n-1`,
/// `-n` = cavity domain `n-1` (or, in the discretization grid, translation index `n-1`).
pub type LabelGrid = Grid3<Label>;

/// The discretization-grid byte mask (§3): `0` inside the canonical volume,
/// `1` outside-unresolved, `-(t+1)` outside with canonical preimage via translation `t`.
pub type DiscretizationMask = Grid3<i8>;

use crate::types::Label;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_strides_are_row_major() {
        let g: Grid3<i64> = Grid3::new([2, 3, 4]);
        assert_eq!(g.strides(), [12, 4, 1]);
        assert_eq!(g.flat_index(1, 2, 3), 12 + 2 * 4 + 3);
    }

    #[test]
    fn in_bounds_rejects_negative_and_overflowing() {
        let g: Grid3<i64> = Grid3::new([2, 2, 2]);
        assert!(g.in_bounds(0, 0, 0));
        assert!(g.in_bounds(1, 1, 1));
        assert!(!g.in_bounds(-1, 0, 0));
        assert!(!g.in_bounds(2, 0, 0));
    }

    #[test]
    fn get_set_roundtrip() {
        let mut g: Grid3<i64> = Grid3::new([3, 3, 3]);
        *g.get_mut(1, 1, 1) = 42;
        assert_eq!(*g.get(1, 1, 1), 42);
        assert_eq!(*g.get(0, 0, 0), 0);
    }
}
