//! Shared types for the warden cluster placement engine and pod manager.
//!
//! This crate provides the foundational types used by both sides of the
//! system:
//!
//! - **Identifiers**: lightweight string-backed newtypes for pod, job, and
//!   agent endpoint identity.
//! - **Resource model**: the typed value objects (§3 of the design) used by
//!   the placement engine's feasibility and scoring logic.
//! - **Error types**: the handful of error cases shared by both the
//!   scheduler and agent crates.
//!
//! # Example
//!
//! ```
//! use warden_core::{Endpoint, PodId};
//!
//! let endpoint = Endpoint::from("10.0.0.1:9527".to_string());
//! let pod_id = PodId::from("pod-0001".to_string());
//! assert_eq!(endpoint.as_str(), "10.0.0.1:9527");
//! assert_eq!(pod_id.to_string(), "pod-0001");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod job;
pub mod resource;

pub use error::{CoreError, Result};
pub use ids::{Endpoint, JobId, PodId};
pub use job::{JobDesc, JobInfo, JobOverview, JobType, PodRef, ScheduleAction, ScheduleInfo};
pub use resource::{AgentInfo, PodDescriptor, PodOnAgent, Resource, TaskDescriptor, Volume};
