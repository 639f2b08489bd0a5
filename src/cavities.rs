//! Cavity assigner (component **C**): labels every in-volume voxel with the
//! nearest cavity-domain index, or leaves the atom label in place.
//!
//! Grounded on the subgrid's 27-cell neighbor query ([`crate::subgrid::Subgrid`])
//! the same way the reference crate's neighborhood-search passes consume its
//! own spatial index; the "first claim in iteration order wins" rule mirrors
//! the bucket-order contract documented on [`crate::subgrid::Subgrid::neighbor_domains`].

use log::debug;

use crate::grid::{DiscretizationMask, LabelGrid};
use crate::subgrid::Subgrid;
use crate::types::squared_distance;

/// Produces the cavity-label grid from the atom-label grid `source`.
///
/// With `domain_grid = None` ("surface points" off), every voxel inside the
/// canonical volume (`discretization_mask == 0`) is resolved by comparing its
/// distance to the nearest bucketed atom against the nearest bucketed domain
/// point, claiming the domain only on a strict improvement.
///
/// With `domain_grid = Some(_)` ("surface points" on), already-decided voxels
/// (`0` or negative) are copied verbatim from `domain_grid`; only positive
/// (unlabeled-but-inside) voxels fall back to the same subgrid scan, without
/// consulting the discretization mask.
pub fn mark_cavities(
    source: &LabelGrid,
    domain_grid: Option<&LabelGrid>,
    discretization_mask: &DiscretizationMask,
    subgrid: &Subgrid,
) -> LabelGrid {
    debug!(
        "mark_cavities: dims={:?} surface_points={}",
        source.dims(),
        domain_grid.is_some()
    );

    let dims = source.dims();
    let mut out: LabelGrid = crate::grid::Grid3::new(dims);

    for p in source.iter_positions() {
        let value = match domain_grid {
            Some(domains) => match *domains.get_pos(p) {
                v @ i64::MIN..=0 => v,
                _ => resolve_by_distance(subgrid, p),
            },
            None => {
                if *discretization_mask.get_pos(p) != 0 {
                    *source.get_pos(p)
                } else {
                    resolve_claim(subgrid, p, *source.get_pos(p))
                }
            }
        };
        *out.get_pos_mut(p) = value;
    }

    debug!("mark_cavities: done");
    out
}

/// "Surface points on" fallback for positive (unlabeled) voxels: the same
/// atom-distance-gated claim rule as "surface points off" (§4.3 — "fall back
/// to the 27-cell scan as above"), so the nearest domain point only wins when
/// it is strictly closer than the nearest bucketed atom.
fn resolve_by_distance(subgrid: &Subgrid, p: crate::types::Pos3) -> i64 {
    resolve_claim(subgrid, p, 0)
}

/// "Surface points off" rule: the voxel keeps its atom label unless some
/// bucketed domain point is strictly closer than the nearest bucketed atom.
///
/// Absence of a nearby atom does not exempt the voxel from the domain scan:
/// the atom distance starts at `i64::MAX` (mirroring the original's
/// `INT_MAX` sentinel), so with no atom in range any bucketed domain point
/// still wins.
fn resolve_claim(subgrid: &Subgrid, p: crate::types::Pos3, atom_label: i64) -> i64 {
    let mut min_atom_d2 = i64::MAX;
    for atom_pos in subgrid.neighbor_atoms(p) {
        let d2 = squared_distance(atom_pos, p);
        if d2 < min_atom_d2 {
            min_atom_d2 = d2;
        }
    }

    for (point, domain_index) in subgrid.neighbor_domains(p) {
        let d2 = squared_distance(point, p);
        if d2 < min_atom_d2 {
            return -((domain_index as i64) + 1);
        }
    }
    atom_label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid3;
    use crate::translations::TranslationTable;

    /// S4 — cavity assignment chooses domain over atom at (5,5,3), but the
    /// atom retains (5,5,4) since the domain distance there is not strictly less.
    #[test]
    fn s4_cavity_assignment_chooses_domain_over_atom() {
        let mut source: LabelGrid = Grid3::new([10, 10, 10]);
        for p in [
            [5, 5, 5],
            [4, 5, 5],
            [6, 5, 5],
            [5, 4, 5],
            [5, 6, 5],
            [5, 5, 4],
            [5, 5, 6],
        ] {
            *source.get_pos_mut(p) = 1;
        }

        let mask: DiscretizationMask = Grid3::new([10, 10, 10]);
        let mut subgrid = Subgrid::create(4, [10, 10, 10]).unwrap();
        let identity = TranslationTable::with_identity(vec![]);
        subgrid.add_atoms(&[[5, 5, 5]], &identity);
        subgrid.add_domains(&[[5, 5, 2]], &[0], &identity);

        let cavities = mark_cavities(&source, None, &mask, &subgrid);

        assert_eq!(*cavities.get(5, 5, 3), -1, "(5,5,3): d_atom²=4 > d_dom²=1");
        assert_eq!(*cavities.get(5, 5, 4), 1, "(5,5,4): d_atom²=1, d_dom²=4, not strictly less");
    }

    #[test]
    fn discretization_mask_passes_outside_voxels_through_unchanged() {
        let mut source: LabelGrid = Grid3::new([6, 6, 6]);
        *source.get_mut(1, 1, 1) = 3;
        let mut mask: DiscretizationMask = Grid3::new([6, 6, 6]);
        *mask.get_mut(1, 1, 1) = 1;

        let mut subgrid = Subgrid::create(4, [6, 6, 6]).unwrap();
        let identity = TranslationTable::with_identity(vec![]);
        subgrid.add_domains(&[[1, 1, 1]], &[0], &identity);

        let cavities = mark_cavities(&source, None, &mask, &subgrid);
        assert_eq!(*cavities.get(1, 1, 1), 3);
    }

    #[test]
    fn surface_points_on_copies_existing_cavity_and_outside_labels() {
        let source: LabelGrid = Grid3::new([5, 5, 5]);
        let mut domain_grid: LabelGrid = Grid3::new([5, 5, 5]);
        *domain_grid.get_mut(2, 2, 2) = -1;
        *domain_grid.get_mut(1, 1, 1) = 5;

        let mask: DiscretizationMask = Grid3::new([5, 5, 5]);
        let mut subgrid = Subgrid::create(4, [5, 5, 5]).unwrap();
        let identity = TranslationTable::with_identity(vec![]);
        subgrid.add_domains(&[[1, 1, 2]], &[7], &identity);

        let cavities = mark_cavities(&source, Some(&domain_grid), &mask, &subgrid);

        assert_eq!(*cavities.get(2, 2, 2), -1, "pre-existing cavity label copied verbatim");
        assert_eq!(*cavities.get(1, 1, 1), -8, "positive voxel resolved via subgrid scan");
        assert_eq!(*cavities.get(0, 0, 0), 0, "outside voxel copied verbatim");
    }

    /// A positive voxel under "surface points on" must still be gated by the
    /// nearest bucketed atom: an atom strictly closer than the domain point
    /// keeps the voxel out of the cavity, unlike a naive nearest-domain pick.
    #[test]
    fn surface_points_on_positive_voxel_is_gated_by_nearest_atom() {
        let source: LabelGrid = Grid3::new([5, 5, 5]);
        let mut domain_grid: LabelGrid = Grid3::new([5, 5, 5]);
        *domain_grid.get_mut(1, 1, 1) = 5;

        let mask: DiscretizationMask = Grid3::new([5, 5, 5]);
        let mut subgrid = Subgrid::create(4, [5, 5, 5]).unwrap();
        let identity = TranslationTable::with_identity(vec![]);
        subgrid.add_atoms(&[[1, 1, 1]], &identity);
        subgrid.add_domains(&[[1, 1, 2]], &[7], &identity);

        let cavities = mark_cavities(&source, Some(&domain_grid), &mask, &subgrid);

        assert_eq!(
            *cavities.get(1, 1, 1),
            0,
            "atom at distance 0 beats domain at distance 1, so the voxel is not claimed"
        );
    }
}
