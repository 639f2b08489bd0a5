//!
//! Numerical core for molecular-cavity discovery: voxelization of atom spheres
//! under periodic boundary conditions, cavity assignment, marching-cubes
//! cavity surface extraction, and cavity adjacency. Entry point is the
//! [analysis::analyze_cavities] function.
//!

/// Re-export the version of nalgebra used by this crate
pub use nalgebra;

/// Pipeline orchestration entry point (`CavityAnalysis`, `analyze_cavities`)
pub mod analysis;
/// Cavity assigner: labels in-volume voxels with the nearest cavity domain
pub mod cavities;
/// Translation-vector marking of the discretization grid
pub mod discretization;
/// Structured error type for the fallible construction steps
pub mod error;
/// Dense 3D arrays with explicit per-axis strides
pub mod grid;
/// Cavity-adjacency matrix under periodicity
pub mod intersections;
/// Modified marching-cubes cavity surface extraction
pub mod marching_cubes;
/// Triangle mesh type produced by the cavity mesher
pub mod mesh;
/// Spatial hash over coarse cubic cells
pub mod subgrid;
/// Ordered list of periodic translation vectors
pub mod translations;
mod types;
/// Atom voxelizer: paints discretized atom spheres onto the label grid
pub mod voxelizer;
/// Workspace for reusing allocated memory between repeated analyses
pub(crate) mod workspace;

pub use analysis::{analyze_cavities, analyze_cavities_inplace, AnalysisInputs, CavityAnalysis, Parameters};
pub use error::CavityAnalysisError;
pub use grid::{DiscretizationMask, Grid3, LabelGrid};
pub use marching_cubes::CavityMesh;
pub use mesh::TriMesh;
pub use subgrid::Subgrid;
pub use translations::TranslationTable;
pub use types::{Coord, Label, Pos3, Stride};
