pub mod app;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod storage;
pub mod sync;
pub mod transfer;
pub mod view;

// Re-export commonly used types and functions
pub use app::QuoteApp;
pub use collection::{QuoteCollection, SharedCollection};
pub use config::{Config, SyncSettings};
pub use error::{QuoteError, Result};
pub use models::{Origin, Quote};
pub use sync::{StatusLevel, SyncReport, SyncStatus};
pub use transfer::ImportSummary;
pub use view::Filter;
