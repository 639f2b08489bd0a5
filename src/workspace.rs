//! Workspace for reusing allocated memory between repeated cavity analyses.
//!
//! Modeled directly on the reference crate's `ReconstructionWorkspace`/
//! `LocalReconstructionWorkspace` pair (`workspace.rs`): a thread-local
//! collection of per-thread scratch buffers, so that [`crate::analysis::analyze_cavities_inplace`]
//! run repeatedly (e.g. across successive simulation frames) does not
//! reallocate its mesh and grid buffers every call.

use std::cell::RefCell;
use std::fmt;
use std::fmt::Debug;
use thread_local::ThreadLocal;

use crate::mesh::TriMesh;

/// Collection of all thread-local workspaces used to reduce allocations on
/// subsequent cavity analyses.
#[derive(Default)]
pub struct CavityWorkspace {
    #[allow(dead_code)]
    local_workspaces: ThreadLocal<RefCell<LocalCavityWorkspace>>,
}

impl CavityWorkspace {
    /// Returns a reference to a thread-local workspace.
    #[allow(dead_code)]
    pub(crate) fn get_local(&self) -> &RefCell<LocalCavityWorkspace> {
        self.local_workspaces.get_or_default()
    }
}

impl Clone for CavityWorkspace {
    /// Returns a new default workspace without any allocated memory.
    fn clone(&self) -> Self {
        CavityWorkspace::default()
    }
}

impl Debug for CavityWorkspace {
    /// Only prints the name of the type to the formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CavityWorkspace").finish()
    }
}

/// Workspace used by [`crate::analysis::analyze_cavities_inplace`] internally
/// to re-use allocated memory across calls.
#[derive(Default)]
pub(crate) struct LocalCavityWorkspace {
    /// Scratch mesh buffer reused across repeated [`crate::marching_cubes::cavity_triangles`] calls.
    #[allow(dead_code)]
    pub mesh: TriMesh,
}
