//! 基础设施层 - 外部 helper 进程与快照采集

pub mod capture;
pub mod helper;

pub use capture::{HelperSnapshotSource, SnapshotSource, UnavailableSnapshotSource};
pub use helper::{kill_descendants, resolve_helper, run_helper};
