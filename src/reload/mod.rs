//! Reload notification sources.
//!
//! # Data Flow
//! ```text
//! ManualTrigger::fire / set_status ─┐
//! FileTrigger (notify watcher)      ├─→ Listeners::emit(ReloadEvent)
//! SIGHUP (lifecycle::signals)       ┘       → HotRouter::listen callback
//!                                           → schedule_rebuild()
//! ```
//!
//! # Design Decisions
//! - Triggers carry no payload beyond "something changed"
//! - Listeners are plain callbacks so any thread can fire them
//! - Listeners must not block; the adapter only spawns a task

pub mod file;
pub mod manual;
pub mod trigger;

pub use file::{FileTrigger, TriggerError};
pub use manual::ManualTrigger;
pub use trigger::{ReloadEvent, ReloadListener, ReloadStatus, ReloadTrigger};
