//! Client-side orchestration core for the HalalGuard compliance dashboard.
//!
//! The crate normalizes free-form transaction input, submits batches to the
//! remote classification service, reconciles the asynchronous response back
//! onto the working set, and derives the aggregate views the dashboard reads.
//! Two independent live loops (metrics polling, push notifications) maintain
//! their own state and never touch the analysis working set.

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod telemetry;
