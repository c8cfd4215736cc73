//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]).
//! This module adds the wrappers that give the same data context: collections
//! with empty-state messages, operation results, and status lines.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │   Wrappers &    │    │    Markdown     │
//! │ (Lead, Timeline)│───▶│  Result Types   │───▶│ (Terminal/MCP)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`collections`]: Leads, Definitions, Documents, ActivityLog
//! - [`results`]: CreateResult, UpdateResult, DeleteResult, TransitionResult
//! - [`status`]: OperationStatus for confirmations and refusals
//! - [`datetime`]: Local timestamp formatting
//!
//! ```rust
//! use helios_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Lead 4 moved to lead_completed".to_string());
//! assert!(status.to_string().starts_with("Success:"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{ActivityLog, Definitions, Documents, Leads};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, TransitionResult, UpdateResult};
pub use status::{OperationStatus, Outcome};
