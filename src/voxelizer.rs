//! Atom voxelizer (component **A**): paints each atom's discretized sphere,
//! under every translation, onto the label grid, with nearest-center arbitration.
//!
//! Grounded directly on `atomstogrid` in the reference C sources
//! (`core/calculation/extension/algorithm.c`): same AABB early-reject, same
//! discrete-sphere mask, same incumbent-wins tie-break.

use log::debug;

use crate::grid::{DiscretizationMask, LabelGrid};
use crate::translations::TranslationTable;
use crate::types::{add, Coord, Pos3};

/// Paints atom spheres onto `grid`, which must be zero-initialized.
///
/// `translations` must include the identity translation (see
/// [`TranslationTable::with_identity`]). `radii[radii_indices[i]]` gives atom
/// `i`'s radius in whole voxels.
pub fn atoms_to_grid(
    grid: &mut LabelGrid,
    atom_positions: &[Pos3],
    radii_indices: &[usize],
    radii: &[i32],
    translations: &TranslationTable,
    discretization_mask: &DiscretizationMask,
) {
    debug!(
        "atoms_to_grid: dims={:?} natoms={} translations={}",
        grid.dims(),
        atom_positions.len(),
        translations.len()
    );

    for (i, &pos) in atom_positions.iter().enumerate() {
        let radius = radii[radii_indices[i]];
        for (_, t) in translations.iter() {
            let p_translated = add(pos, t);
            if sphere_aabb_entirely_outside(p_translated, radius, grid.dims()) {
                continue;
            }
            paint_sphere(
                grid,
                i,
                p_translated,
                radius,
                atom_positions,
                translations,
                discretization_mask,
            );
        }
    }

    debug!("atoms_to_grid: done");
}

#[inline]
fn sphere_aabb_entirely_outside(p: Pos3, radius: i32, dims: [usize; 3]) -> bool {
    (0..3).any(|axis| p[axis] + radius < 0 || p[axis] - radius >= dims[axis] as Coord)
}

#[allow(clippy::too_many_arguments)]
fn paint_sphere(
    grid: &mut LabelGrid,
    atom_index: usize,
    center: Pos3,
    radius: i32,
    atom_positions: &[Pos3],
    translations: &TranslationTable,
    discretization_mask: &DiscretizationMask,
) {
    let r2 = (radius as i64) * (radius as i64);

    for dx in -radius..=radius {
        let qx = center[0] + dx;
        if qx < 0 || qx as usize >= grid.dims()[0] {
            continue;
        }
        for dy in -radius..=radius {
            let qy = center[1] + dy;
            if qy < 0 || qy as usize >= grid.dims()[1] {
                continue;
            }
            for dz in -radius..=radius {
                let qz = center[2] + dz;
                if qz < 0 || qz as usize >= grid.dims()[2] {
                    continue;
                }

                let offset_sq = (dx as i64) * (dx as i64)
                    + (dy as i64) * (dy as i64)
                    + (dz as i64) * (dz as i64);
                if offset_sq > r2 {
                    continue;
                }

                if *discretization_mask.get(qx, qy, qz) != 0 {
                    continue;
                }

                let q = [qx, qy, qz];
                claim_voxel(grid, q, atom_index, center, atom_positions, translations);
            }
        }
    }
}

/// Resolves ownership of voxel `q`, which atom `atom_index` reaches via the
/// translated center `translated_center`. The incumbent (whoever already owns
/// `q`, including possibly `atom_index` itself via an earlier translation)
/// wins ties: it is displaced only if no image of it is at least as close as
/// this candidate.
fn claim_voxel(
    grid: &mut LabelGrid,
    q: Pos3,
    atom_index: usize,
    translated_center: Pos3,
    atom_positions: &[Pos3],
    translations: &TranslationTable,
) {
    let current = *grid.get_pos(q);
    if current == 0 {
        *grid.get_pos_mut(q) = (atom_index + 1) as i64;
        return;
    }

    let other_atom = (current - 1) as usize;
    let this_d2 = crate::types::squared_distance(translated_center, q);

    // The incumbent wins unless every image of it is farther than this
    // candidate: iterate all translations of the incumbent's base position
    // and look for one whose distance is `<= this_d2` (weak inequality favors
    // the incumbent, so exact ties keep the earlier-placed atom).
    let incumbent_pos = atom_positions[other_atom];
    let incumbent_survives = translations.iter().any(|(_, t)| {
        let other_translated = add(incumbent_pos, t);
        crate::types::squared_distance(other_translated, q) <= this_d2
    });

    if !incumbent_survives {
        *grid.get_pos_mut(q) = (atom_index + 1) as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid3;

    fn empty_mask(dims: [usize; 3]) -> DiscretizationMask {
        Grid3::new(dims)
    }

    /// S1 — single atom, radius 1, no periodicity: the Manhattan cross plus center.
    #[test]
    fn s1_single_atom_radius_one_paints_manhattan_cross() {
        let mut grid: LabelGrid = Grid3::new([5, 5, 5]);
        let mask = empty_mask([5, 5, 5]);
        let translations = TranslationTable::with_identity(vec![]);

        atoms_to_grid(&mut grid, &[[2, 2, 2]], &[0], &[1], &translations, &mask);

        let expected_labeled = [
            [2, 2, 2],
            [1, 2, 2],
            [3, 2, 2],
            [2, 1, 2],
            [2, 3, 2],
            [2, 2, 1],
            [2, 2, 3],
        ];

        for p in grid.iter_positions() {
            let expected = if expected_labeled.contains(&p) { 1 } else { 0 };
            assert_eq!(*grid.get_pos(p), expected, "voxel {:?}", p);
        }
    }

    /// S2 — two atoms tie: the earlier-placed atom (index 0) wins.
    #[test]
    fn s2_tied_voxel_goes_to_earlier_placed_atom() {
        let mut grid: LabelGrid = Grid3::new([7, 7, 7]);
        let mask = empty_mask([7, 7, 7]);
        let translations = TranslationTable::with_identity(vec![]);

        atoms_to_grid(
            &mut grid,
            &[[2, 3, 3], [4, 3, 3]],
            &[0, 0],
            &[2],
            &translations,
            &mask,
        );

        assert_eq!(*grid.get(3, 3, 3), 1);
    }

    /// S3 — a periodic image paints across the boundary of a thin degenerate grid.
    #[test]
    fn s3_periodic_image_paints_across_boundary() {
        let mut grid: LabelGrid = Grid3::new([10, 1, 1]);
        let mask = empty_mask([10, 1, 1]);
        let translations =
            TranslationTable::with_identity(vec![[10, 0, 0]]);

        atoms_to_grid(
            &mut grid,
            &[[1, 0, 0]],
            &[0],
            &[2],
            &translations,
            &mask,
        );

        for x in 0..4 {
            assert_eq!(*grid.get(x, 0, 0), 1, "direct image at x={x}");
        }
        assert_eq!(*grid.get(9, 0, 0), 1, "translated image reaches x=9");
    }

    #[test]
    fn discretization_mask_blocks_painting() {
        let mut grid: LabelGrid = Grid3::new([5, 5, 5]);
        let mut mask: DiscretizationMask = Grid3::new([5, 5, 5]);
        *mask.get_mut(2, 2, 2) = 1;
        let translations = TranslationTable::with_identity(vec![]);

        atoms_to_grid(&mut grid, &[[2, 2, 2]], &[0], &[0], &translations, &mask);

        assert_eq!(*grid.get(2, 2, 2), 0);
    }

    #[test]
    fn radius_zero_paints_only_the_center_voxel() {
        let mut grid: LabelGrid = Grid3::new([3, 3, 3]);
        let mask = empty_mask([3, 3, 3]);
        let translations = TranslationTable::with_identity(vec![]);

        atoms_to_grid(&mut grid, &[[1, 1, 1]], &[0], &[0], &translations, &mask);

        for p in grid.iter_positions() {
            let expected = if p == [1, 1, 1] { 1 } else { 0 };
            assert_eq!(*grid.get_pos(p), expected);
        }
    }
}
