//! Shared scalar aliases used across the grid, subgrid and voxelization passes.

/// A single coordinate component in voxel space. Signed so that translated
/// positions (which may land outside `[0, dim)`) can be represented directly.
pub type Coord = i32;

/// A 3D voxel-space position.
pub type Pos3 = [Coord; 3];

/// Flat array index / stride component. Kept 64-bit so that
/// `i*sx + j*sy + k*sz` cannot overflow even for very large grids.
pub type Stride = i64;

/// Grid label value (see [`crate::grid::Grid`] for the sign encoding).
pub type Label = i64;

pub(crate) type HashState = fxhash::FxBuildHasher;
pub(crate) type SetType<K> = std::collections::HashSet<K, HashState>;

pub(crate) fn new_set<K>() -> SetType<K> {
    SetType::with_hasher(HashState::default())
}

/// Adds two voxel positions component-wise.
#[inline]
pub fn add(a: Pos3, b: Pos3) -> Pos3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Squared Euclidean distance between two voxel positions.
#[inline]
pub fn squared_distance(a: Pos3, b: Pos3) -> i64 {
    let dx = (a[0] - b[0]) as i64;
    let dy = (a[1] - b[1]) as i64;
    let dz = (a[2] - b[2]) as i64;
    dx * dx + dy * dy + dz * dz
}
