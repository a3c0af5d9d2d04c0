pub mod engine;
pub mod scheduler;
pub mod status;

pub use engine::{CycleOutcome, EngineSettings, SyncEngine, SyncPhase, SyncReport, SyncStats};
pub use scheduler::SyncScheduler;
pub use status::{StatusBoard, StatusLevel, SyncStatus};
