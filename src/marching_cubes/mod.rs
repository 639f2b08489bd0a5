//! Cavity surface extraction via a modified marching-cubes pass (component **M**).
//!
//! Builds a neighbor-count scalar field over the selected cavities (§4.4 of the
//! specification) and triangulates it with the classic 256-case marching cubes
//! table in [`lut`]. There is no external marching-cubes crate in the reference
//! dependency stack to call into (the distilled specification names
//! `triangulate(...)` as "assumed available" host glue); since this routine is
//! itself part of the numerical core rather than host glue, it is implemented
//! here directly on top of the table, the way the reference crate's own
//! (unretrieved) `marching_cubes` module would sit on top of `marching_cubes_lut`.

pub mod lut;

use log::debug;

use crate::grid::{DiscretizationMask, LabelGrid};
use crate::mesh::TriMesh;
use nalgebra::Vector3;

/// Axis-aligned bounding box over voxel indices, inclusive on both ends.
#[derive(Clone, Copy, Debug)]
struct BBox {
    min: [i32; 3],
    max: [i32; 3],
}

impl BBox {
    fn engulf(&mut self, p: [i32; 3]) {
        for (k, &pk) in p.iter().enumerate() {
            self.min[k] = self.min[k].min(pk);
            self.max[k] = self.max[k].max(pk);
        }
    }
}

/// Result of [`cavity_triangles`]: the extracted mesh plus the surface area
/// excluding triangles with an out-of-volume vertex (§4.4 Phase 3).
#[derive(Clone, Debug, Default)]
pub struct CavityMesh {
    pub mesh: TriMesh,
    pub area: f64,
}

/// Builds the neighbor-count scalar field and extracts the cavity surface for
/// the given set of selected cavity-domain indices.
///
/// `step`/`offset` map voxel coordinates to continuous output coordinates:
/// `v_cont[k] = v[k] * step[k] + offset[k]`. `isolevel` is the number of
/// selected-cavity neighbors required for the surface to pass through a point
/// (in `1..=26`, added to the `100` baseline).
pub fn cavity_triangles(
    cavity_grid: &LabelGrid,
    selected_cavities: &[usize],
    isolevel: u16,
    step: [f64; 3],
    offset: [f64; 3],
    discretization_mask: &DiscretizationMask,
) -> CavityMesh {
    debug!(
        "cavity_triangles: dims={:?} selected={} isolevel={}",
        cavity_grid.dims(),
        selected_cavities.len(),
        isolevel
    );

    let mut selected = crate::types::new_set::<usize>();
    selected.extend(selected_cavities.iter().copied());
    let dims = cavity_grid.dims();

    let (counts, bbox) = build_count_field(cavity_grid, &selected);

    let Some(bbox) = bbox else {
        debug!("cavity_triangles: no selected-cavity voxels, empty mesh");
        return CavityMesh::default();
    };

    let iso = 100.0 + isolevel as f64;
    let mut result = CavityMesh::default();

    for i in bbox.min[0]..bbox.max[0] {
        if i < 0 || (i as usize + 1) >= dims[0] {
            continue;
        }
        for j in bbox.min[1]..bbox.max[1] {
            if j < 0 || (j as usize + 1) >= dims[1] {
                continue;
            }
            for k in bbox.min[2]..bbox.max[2] {
                if k < 0 || (k as usize + 1) >= dims[2] {
                    continue;
                }
                triangulate_cube(&counts, discretization_mask, [i, j, k], iso, step, offset, &mut result);
            }
        }
    }

    debug!(
        "cavity_triangles: triangles={} area={}",
        result.mesh.triangle_count(),
        result.area
    );

    result
}

/// Phase 1: scan every interior voxel, add the `+100` baseline and propagate
/// `+1` to the 3x3x3 neighborhood of every selected-cavity voxel.
fn build_count_field(
    cavity_grid: &LabelGrid,
    selected: &crate::types::SetType<usize>,
) -> (crate::grid::Grid3<u16>, Option<BBox>) {
    let dims = cavity_grid.dims();
    let mut counts: crate::grid::Grid3<u16> = crate::grid::Grid3::new(dims);
    let mut bbox: Option<BBox> = None;

    for i in 1..dims[0] as i32 - 1 {
        for j in 1..dims[1] as i32 - 1 {
            for k in 1..dims[2] as i32 - 1 {
                *counts.get_mut(i, j, k) += 100;

                let value = *cavity_grid.get(i, j, k);
                let is_selected_cavity =
                    value < 0 && selected.contains(&((-value - 1) as usize));
                if !is_selected_cavity {
                    continue;
                }

                for di in -1..=1 {
                    for dj in -1..=1 {
                        for dk in -1..=1 {
                            let n = [i + di, j + dj, k + dk];
                            if counts.in_bounds_pos(n) {
                                *counts.get_pos_mut(n) += 1;
                            }
                        }
                    }
                }

                match &mut bbox {
                    None => {
                        bbox = Some(BBox {
                            min: [i - 1, j - 1, k - 1],
                            max: [i + 1, j + 1, k + 1],
                        })
                    }
                    Some(b) => {
                        b.engulf([i - 1, j - 1, k - 1]);
                        b.engulf([i + 1, j + 1, k + 1]);
                    }
                }
            }
        }
    }

    // Expand the bounding box outward by one voxel along each axis where room permits.
    if let Some(b) = &mut bbox {
        for axis in 0..3 {
            if b.min[axis] > 0 {
                b.min[axis] -= 1;
            }
            if (b.max[axis] as usize) + 1 < dims[axis] {
                b.max[axis] += 1;
            }
        }
    }

    (counts, bbox)
}

#[allow(clippy::too_many_arguments)]
fn triangulate_cube(
    counts: &crate::grid::Grid3<u16>,
    discretization_mask: &DiscretizationMask,
    base: [i32; 3],
    iso: f64,
    step: [f64; 3],
    offset: [f64; 3],
    result: &mut CavityMesh,
) {
    let corner_pos: [[i32; 3]; 8] = lut::CORNER_OFFSETS.map(|o| {
        [base[0] + o[0], base[1] + o[1], base[2] + o[2]]
    });
    let corner_value: [f64; 8] = corner_pos.map(|p| *counts.get(p[0], p[1], p[2]) as f64);
    let corner_flags: [bool; 8] = {
        let mut flags = [false; 8];
        for c in 0..8 {
            flags[c] = corner_value[c] >= iso;
        }
        flags
    };

    for edges in lut::marching_cubes_triangulation_iter(&corner_flags) {
        let mut verts = [Vector3::zeros(); 3];
        let mut normals = [Vector3::zeros(); 3];
        let mut any_outside = false;

        for (slot, &edge) in edges.iter().enumerate() {
            let [a, b] = lut::EDGE_CORNERS[edge];
            let pa = corner_pos[a];
            let pb = corner_pos[b];
            let va = corner_value[a];
            let vb = corner_value[b];

            let t = if (vb - va).abs() > f64::EPSILON {
                ((iso - va) / (vb - va)).clamp(0.0, 1.0)
            } else {
                0.5
            };

            let voxel_vertex = [
                pa[0] as f64 + t * (pb[0] - pa[0]) as f64,
                pa[1] as f64 + t * (pb[1] - pa[1]) as f64,
                pa[2] as f64 + t * (pb[2] - pa[2]) as f64,
            ];

            let grad_a = gradient_at(counts, pa);
            let grad_b = gradient_at(counts, pb);
            let voxel_normal = [
                grad_a[0] + t * (grad_b[0] - grad_a[0]),
                grad_a[1] + t * (grad_b[1] - grad_a[1]),
                grad_a[2] + t * (grad_b[2] - grad_a[2]),
            ];

            let rounded = [
                (voxel_vertex[0] + 0.5).floor() as i32,
                (voxel_vertex[1] + 0.5).floor() as i32,
                (voxel_vertex[2] + 0.5).floor() as i32,
            ];
            let outside = !discretization_mask.in_bounds(rounded[0], rounded[1], rounded[2])
                || *discretization_mask.get(rounded[0], rounded[1], rounded[2]) != 0;
            any_outside |= outside;

            verts[slot] = Vector3::new(
                voxel_vertex[0] * step[0] + offset[0],
                voxel_vertex[1] * step[1] + offset[1],
                voxel_vertex[2] * step[2] + offset[2],
            );

            normals[slot] = Vector3::new(
                -voxel_normal[0] / step[0],
                -voxel_normal[1] / step[1],
                -voxel_normal[2] / step[2],
            );
        }

        result.mesh.push_triangle(verts, normals);

        if !any_outside {
            let area = 0.5 * (verts[1] - verts[0]).cross(&(verts[2] - verts[0])).norm();
            result.area += area;
        }
    }
}

/// Central-difference gradient of the count field at a grid-aligned corner,
/// falling back to a one-sided difference at the grid boundary.
fn gradient_at(counts: &crate::grid::Grid3<u16>, p: [i32; 3]) -> [f64; 3] {
    let mut grad = [0.0; 3];
    for axis in 0..3 {
        let mut lo = p;
        let mut hi = p;
        lo[axis] -= 1;
        hi[axis] += 1;

        let lo_in = counts.in_bounds_pos(lo);
        let hi_in = counts.in_bounds_pos(hi);
        let center = *counts.get(p[0], p[1], p[2]) as f64;

        grad[axis] = match (lo_in, hi_in) {
            (true, true) => (*counts.get_pos(hi) as f64 - *counts.get_pos(lo) as f64) / 2.0,
            (true, false) => center - *counts.get_pos(lo) as f64,
            (false, true) => *counts.get_pos(hi) as f64 - center,
            (false, false) => 0.0,
        };
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid3;

    fn no_mask(dims: [usize; 3]) -> DiscretizationMask {
        Grid3::new(dims)
    }

    /// S5 — marching cubes on a single cavity voxel: area and triangle count must be positive.
    #[test]
    fn s5_single_cavity_voxel_yields_nonempty_closed_mesh() {
        let mut cavity_grid: LabelGrid = Grid3::new([5, 5, 5]);
        *cavity_grid.get_mut(2, 2, 2) = -1;
        let mask = no_mask([5, 5, 5]);

        let result = cavity_triangles(&cavity_grid, &[0], 1, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], &mask);

        assert!(result.mesh.triangle_count() > 0);
        assert!(result.area > 0.0);
    }

    #[test]
    fn no_selected_cavities_yields_empty_mesh() {
        let mut cavity_grid: LabelGrid = Grid3::new([5, 5, 5]);
        *cavity_grid.get_mut(2, 2, 2) = -1;
        let mask = no_mask([5, 5, 5]);

        let result = cavity_triangles(&cavity_grid, &[], 1, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], &mask);

        assert_eq!(result.mesh.triangle_count(), 0);
        assert_eq!(result.area, 0.0);
    }

    #[test]
    fn triangles_outside_discretization_mask_are_emitted_but_excluded_from_area() {
        let mut cavity_grid: LabelGrid = Grid3::new([5, 5, 5]);
        *cavity_grid.get_mut(2, 2, 2) = -1;
        let mut mask: DiscretizationMask = Grid3::new([5, 5, 5]);
        // Mark the whole grid outside the canonical volume: every triangle's
        // vertices sample a nonzero mask, so every triangle is area-excluded
        // but must still appear in the mesh.
        mask.fill(1);

        let result = cavity_triangles(&cavity_grid, &[0], 1, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], &mask);

        assert!(result.mesh.triangle_count() > 0);
        assert_eq!(result.area, 0.0);
    }

    #[test]
    fn step_and_offset_rescale_vertex_coordinates() {
        let mut cavity_grid: LabelGrid = Grid3::new([5, 5, 5]);
        *cavity_grid.get_mut(2, 2, 2) = -1;
        let mask = no_mask([5, 5, 5]);

        let unit = cavity_triangles(&cavity_grid, &[0], 1, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0], &mask);
        let scaled = cavity_triangles(&cavity_grid, &[0], 1, [2.0, 2.0, 2.0], [1.0, 1.0, 1.0], &mask);

        assert_eq!(unit.mesh.vertex_count(), scaled.mesh.vertex_count());
        for (a, b) in unit.mesh.vertices.iter().zip(scaled.mesh.vertices.iter()) {
            assert!((b.x - (a.x * 2.0 + 1.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn gradient_uses_one_sided_difference_at_boundary() {
        let mut counts: Grid3<u16> = Grid3::new([4, 4, 4]);
        *counts.get_mut(0, 1, 1) = 10;
        *counts.get_mut(1, 1, 1) = 20;
        let g = gradient_at(&counts, [0, 1, 1]);
        assert_eq!(g[0], 10.0);
    }
}
