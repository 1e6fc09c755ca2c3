//! Open documents, their regions and their synthetic projections.
//!
//! [`Workspace`] is the single entry point for updates: it owns each
//! document's [`SnapshotManager`](crate::snapshot::SnapshotManager), runs the
//! generators through a memo cache, assembles the synthetic documents and
//! publishes them as one [`Generation`].

mod cancel;
mod document;
mod document_set;
mod memo;
mod synthetic;
mod workspace;

pub use cancel::{CancellationToken, Cancelled, RequestGeneration};
pub use document::{Region, RegionDescriptor};
pub use document_set::DocumentSet;
pub use memo::GeneratorCache;
pub use synthetic::{Generation, SyntheticDocument, SyntheticId, SyntheticKind};
pub use workspace::{Workspace, WorkspaceError};
