//! Intersection scanner (component **I**): the symmetric cavity-adjacency matrix.
//!
//! There is no directly corresponding pass in the reference crate (which has
//! no notion of discrete cavity domains); this module follows §4.5 of the
//! specification directly, reusing the crate's `Grid3`/label-sign conventions.

use log::debug;

/// The 13 directional offsets covering half of the 26-neighborhood (each
/// undirected pair of neighboring voxels visited exactly once).
const HALF_NEIGHBORHOOD: [[i32; 3]; 13] = [
    [-1, -1, -1],
    [-1, -1, 0],
    [-1, -1, 1],
    [-1, 0, -1],
    [-1, 0, 0],
    [-1, 0, 1],
    [-1, 1, -1],
    [-1, 1, 0],
    [-1, 1, 1],
    [0, -1, -1],
    [0, -1, 0],
    [0, -1, 1],
    [0, 0, -1],
];

use crate::grid::LabelGrid;

/// Computes the `domain_count x domain_count` symmetric adjacency matrix
/// (row-major, `adj[a * domain_count + b]`): `adj[a][b] = 1` iff some voxel
/// labeled cavity `a` has a half-neighborhood neighbor labeled cavity `b`.
pub fn cavity_intersections(cavity_grid: &LabelGrid, domain_count: usize) -> Vec<u8> {
    debug!(
        "cavity_intersections: dims={:?} domain_count={}",
        cavity_grid.dims(),
        domain_count
    );

    let mut adj = vec![0u8; domain_count * domain_count];
    let dims = cavity_grid.dims();

    for i in 1..dims[0] as i32 - 1 {
        for j in 1..dims[1] as i32 - 1 {
            for k in 1..dims[2] as i32 - 1 {
                let value = *cavity_grid.get(i, j, k);
                if value >= 0 {
                    continue;
                }
                let a = (-value - 1) as usize;

                for offset in HALF_NEIGHBORHOOD {
                    let neighbor = *cavity_grid.get(i + offset[0], j + offset[1], k + offset[2]);
                    if neighbor >= 0 {
                        continue;
                    }
                    let b = (-neighbor - 1) as usize;
                    adj[a * domain_count + b] = 1;
                    adj[b * domain_count + a] = 1;
                }
            }
        }
    }

    debug!("cavity_intersections: done");
    adj
}
