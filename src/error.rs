//! Error type for the fallible construction steps of the cavity analysis core.
//!
//! The five numerical passes themselves (D, S, A, C, M, I) are infallible given
//! validated inputs, mirroring the reference implementation's split between a
//! fallible `UniformGrid::from_aabb`/`GridConstructionError` and the infallible
//! density-map/marching-cubes passes that run after it.

use thiserror::Error as ThisError;

/// Error returned while constructing a [`crate::grid::Grid`], [`crate::subgrid::Subgrid`]
/// or [`crate::translations::TranslationTable`] from caller-supplied parameters.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum CavityAnalysisError {
    /// One or more grid dimensions were zero.
    #[error("grid dimensions must be non-zero, got {0:?}")]
    ZeroDimension([usize; 3]),
    /// The subgrid cube edge length was not positive.
    #[error("subgrid cube_edge must be > 0, got {0}")]
    InvalidCubeEdge(i32),
    /// A translation table required to be non-empty was empty.
    #[error("translation table must not be empty")]
    EmptyTranslationTable,
    /// The zero vector was found in a translation table that must exclude it
    /// (the discretization marker's table, see §3 of the specification).
    #[error("translation table must not contain the zero vector")]
    ZeroTranslationPresent,
}
