//! Leave-request approval workflow for a school-management system.
//!
//! A leave request is created by a teacher (personal leave, straight to the
//! admin) or by a student (routed through the class teacher first), then
//! moves one-way through review until an admin approves or rejects it. The
//! engine talks to a pluggable [`store::DocumentStore`] and reports every
//! outcome through a [`notify::NotificationSink`]; it holds no state of its
//! own, so the whole workflow can be exercised in-memory.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leaveflow::notify::TracingSink;
//! use leaveflow::store::MemoryStore;
//! use leaveflow::LeaveWorkflowEngine;
//!
//! # async fn demo() -> Result<(), leaveflow::WorkflowError> {
//! let engine = LeaveWorkflowEngine::new(Arc::new(MemoryStore::new()), Arc::new(TracingSink));
//! for record in engine.admin_inbox().await? {
//!     println!("{} awaiting decision", record.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod session;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use engine::{DEFAULT_COLLECTION, LeaveFeed, LeaveWorkflowEngine};
pub use error::WorkflowError;
pub use model::{ActorRole, CreateLeave, LeaveRecord, LeaveRequest, LeaveStatus};
pub use session::Session;
