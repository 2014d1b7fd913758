//! Developer tooling: the live debug panel and a read-only scene inspector.
//!
//! # Invariants
//! - The panel never touches scene state; edits surface as [`PanelEvent`]s that the
//!   owning demo applies.
//! - Numeric params are always stored clamped to their min/max and snapped to step.

mod inspector;
mod panel;

pub use inspector::{ObjectInfo, SceneInspector, SceneSummary};
pub use panel::{DebugPanel, PanelError, PanelEvent, ParamKind, ParamValue};
