//! Spatial hash ("subgrid") over coarse cubic cells (component **S**).
//!
//! Grounded on the original `subgrid_t` / `subgrid_create` / `subgrid_add_atoms`
//! routines (see `algorithm.c` in the reference sources): a coarse 3D array of
//! cells, each owning a growable list of atom positions and a growable list of
//! `(domain_point, domain_index)` pairs. The original repeatedly reallocates
//! each cell's backing array by one element per insertion; this implementation
//! replaces that with `SmallVec`, which keeps the common low-occupancy cell
//! inline (no heap allocation at all) and otherwise grows with standard
//! amortized-doubling `Vec` semantics (§9 of the specification).

use smallvec::SmallVec;

use crate::error::CavityAnalysisError;
use crate::translations::TranslationTable;
use crate::types::{add, Coord, Pos3};

/// Inline capacity for a subgrid cell's bucket before it spills to the heap.
/// Chosen to cover the common case of a handful of atoms/domain points per
/// coarse cell without over-sizing every cell in a mostly-empty grid.
const CELL_INLINE_CAPACITY: usize = 4;

#[derive(Clone, Debug, Default)]
struct Cell {
    atoms: SmallVec<[Pos3; CELL_INLINE_CAPACITY]>,
    domains: SmallVec<[(Pos3, usize); CELL_INLINE_CAPACITY]>,
}

/// Coarse spatial hash bucketing atom and cavity-domain reference points into
/// cubic cells of edge length `cube_edge`, padded by two cells on every axis
/// so that the 27-neighborhood of any in-grid query point is always in range.
#[derive(Clone, Debug)]
pub struct Subgrid {
    cube_edge: i32,
    cell_dims: [usize; 3],
    cells: Vec<Cell>,
}

impl Subgrid {
    /// Allocates an empty subgrid for a volume of the given voxel dimensions.
    pub fn create(cube_edge: i32, grid_dims: [usize; 3]) -> Result<Self, CavityAnalysisError> {
        if cube_edge <= 0 {
            return Err(CavityAnalysisError::InvalidCubeEdge(cube_edge));
        }
        if grid_dims.contains(&0) {
            return Err(CavityAnalysisError::ZeroDimension(grid_dims));
        }

        let cell_dims = [
            ceil_div(grid_dims[0], cube_edge as usize) + 4,
            ceil_div(grid_dims[1], cube_edge as usize) + 4,
            ceil_div(grid_dims[2], cube_edge as usize) + 4,
        ];
        let ncells = cell_dims[0] * cell_dims[1] * cell_dims[2];

        Ok(Self {
            cube_edge,
            cell_dims,
            cells: vec![Cell::default(); ncells],
        })
    }

    #[inline]
    pub fn cube_edge(&self) -> i32 {
        self.cube_edge
    }

    #[inline]
    pub fn cell_dims(&self) -> [usize; 3] {
        self.cell_dims
    }

    /// Maps a voxel position to its cell index along one axis, using true
    /// mathematical floor division (negatives round toward `-inf`) and
    /// clipping out-of-range cells to the padded boundary.
    #[inline]
    fn cell_coord(&self, p_axis: Coord, axis: usize) -> usize {
        let c = p_axis.div_euclid(self.cube_edge) + 2;
        c.clamp(0, self.cell_dims[axis] as i32 - 1) as usize
    }

    #[inline]
    pub fn cell(&self, p: Pos3) -> [usize; 3] {
        [
            self.cell_coord(p[0], 0),
            self.cell_coord(p[1], 1),
            self.cell_coord(p[2], 2),
        ]
    }

    #[inline]
    fn cell_flat_index(&self, cell: [usize; 3]) -> usize {
        (cell[0] * self.cell_dims[1] + cell[1]) * self.cell_dims[2] + cell[2]
    }

    /// Inserts `position + translation` for every translation into the
    /// appropriate cell, for every atom.
    pub fn add_atoms(&mut self, atom_positions: &[Pos3], translations: &TranslationTable) {
        for &pos in atom_positions {
            for (_, t) in translations.iter() {
                let p = add(pos, t);
                let idx = self.cell_flat_index(self.cell(p));
                self.cells[idx].atoms.push(p);
            }
        }
    }

    /// Inserts `(point + translation, domain_index)` for every translation
    /// into the appropriate cell, for every domain seed.
    pub fn add_domains(
        &mut self,
        domain_points: &[Pos3],
        domain_indices: &[usize],
        translations: &TranslationTable,
    ) {
        assert_eq!(domain_points.len(), domain_indices.len());
        for (&point, &domain_index) in domain_points.iter().zip(domain_indices) {
            for (_, t) in translations.iter() {
                let p = add(point, t);
                let idx = self.cell_flat_index(self.cell(p));
                self.cells[idx].domains.push((p, domain_index));
            }
        }
    }

    /// Visits the atom positions bucketed in the 3x3x3 window of cells around
    /// `cell(query)`, in `neigh[0]`, `neigh[1]`, `neigh[2]`, bucket-order (the
    /// iteration order the Cavity Assigner's "first claim wins" rule depends on).
    pub fn neighbor_atoms(&self, query: Pos3) -> impl Iterator<Item = Pos3> + '_ {
        self.neighbor_cells(query)
            .flat_map(move |idx| self.cells[idx].atoms.iter().copied())
    }

    /// Visits the `(point, domain_index)` pairs bucketed in the 3x3x3 window
    /// around `cell(query)`, same iteration order guarantee as [`Self::neighbor_atoms`].
    pub fn neighbor_domains(&self, query: Pos3) -> impl Iterator<Item = (Pos3, usize)> + '_ {
        self.neighbor_cells(query)
            .flat_map(move |idx| self.cells[idx].domains.iter().copied())
    }

    fn neighbor_cells(&self, query: Pos3) -> impl Iterator<Item = usize> + '_ {
        let center = self.cell(query);
        (0..3).flat_map(move |di| {
            (0..3).flat_map(move |dj| {
                (0..3).filter_map(move |dk| {
                    let i = center[0] as i64 + di as i64 - 1;
                    let j = center[1] as i64 + dj as i64 - 1;
                    let k = center[2] as i64 + dk as i64 - 1;
                    if i < 0
                        || j < 0
                        || k < 0
                        || i as usize >= self.cell_dims[0]
                        || j as usize >= self.cell_dims[1]
                        || k as usize >= self.cell_dims[2]
                    {
                        None
                    } else {
                        Some(self.cell_flat_index([i as usize, j as usize, k as usize]))
                    }
                })
            })
        })
    }
}

#[inline]
fn ceil_div(a: usize, b: usize) -> usize {
    a.div_ceil(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_nonpositive_cube_edge() {
        assert!(matches!(
            Subgrid::create(0, [10, 10, 10]),
            Err(CavityAnalysisError::InvalidCubeEdge(0))
        ));
    }

    #[test]
    fn cell_dims_include_four_cells_of_padding() {
        let s = Subgrid::create(4, [10, 10, 10]).unwrap();
        // ceil(10/4) = 3, plus 4 padding cells => 7
        assert_eq!(s.cell_dims(), [7, 7, 7]);
    }

    #[test]
    fn floor_division_rounds_negative_coords_toward_negative_infinity() {
        let s = Subgrid::create(4, [10, 10, 10]).unwrap();
        // floor(-1/4) == floor(-4/4) == -1, but floor(-5/4) == -2: true floor
        // division groups [-4,-1] into one bucket, distinct from [-8,-5].
        let cell_neg1 = s.cell_coord(-1, 0);
        let cell_neg4 = s.cell_coord(-4, 0);
        let cell_neg5 = s.cell_coord(-5, 0);
        let cell_0 = s.cell_coord(0, 0);
        assert!(cell_neg1 <= cell_0);
        assert_eq!(cell_neg1, cell_neg4);
        assert_eq!(cell_neg5, cell_neg4 - 1);
    }

    #[test]
    fn query_completeness_within_one_cube_edge() {
        let mut s = Subgrid::create(4, [20, 20, 20]).unwrap();
        let translations = TranslationTable::with_identity(vec![]);
        s.add_atoms(&[[10, 10, 10]], &translations);

        let found: Vec<_> = s.neighbor_atoms([11, 10, 10]).collect();
        assert_eq!(found, vec![[10, 10, 10]]);
    }

    #[test]
    fn points_just_outside_the_grid_are_found_from_the_nearest_boundary_voxel() {
        // A translated atom position landing a few voxels outside the grid
        // (the padding is sized for exactly this case, per the Subgrid contract)
        // must still be visible from a query at the nearest in-grid voxel.
        let mut s = Subgrid::create(4, [20, 20, 20]).unwrap();
        let translations = TranslationTable::with_identity(vec![]);
        s.add_atoms(&[[-2, 10, 10]], &translations);
        let found: Vec<_> = s.neighbor_atoms([0, 10, 10]).collect();
        assert_eq!(found, vec![[-2, 10, 10]]);
    }
}
