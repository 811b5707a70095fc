//! Cluster placement engine: feasibility checking, load scoring, and
//! scale-up/scale-down/overload-preemption proposal generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Master                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │ push snapshot / job overview
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PlacementEngine                              │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────────┐   │
//! │  │  Scale-up   │ │ Scale-down  │ │   Overload Preemption    │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────────┘   │
//! │               uses: feasibility, load/history                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │ proposals
//!                              ▼
//! ```
//!
//! # Example
//!
//! ```
//! use warden_core::{AgentInfo, Endpoint, JobDesc, JobId, JobInfo, JobType, PodDescriptor, PodRef, PodId, Resource, TaskDescriptor};
//! use warden_scheduler::{PlacementEngine, SchedulerConfig};
//!
//! let engine = PlacementEngine::new(SchedulerConfig::default());
//! engine.sync_resources(vec![AgentInfo {
//!     endpoint: Endpoint::from("10.0.0.1:9527"),
//!     total: Resource { millicores: 1000, memory: 1 << 30, ..Default::default() },
//!     used: Resource::default(),
//!     free: Resource { millicores: 1000, memory: 1 << 30, ..Default::default() },
//!     unassigned: Resource { millicores: 1000, memory: 1 << 30, ..Default::default() },
//!     pods: Vec::new(),
//! }]);
//!
//! let job = JobInfo {
//!     job_id: JobId::from("job-1"),
//!     desc: JobDesc {
//!         priority: 1,
//!         replica: 1,
//!         job_type: JobType::Batch,
//!         pod: PodDescriptor {
//!             tasks: vec![TaskDescriptor {
//!                 requirement: Resource { millicores: 100, memory: 1 << 20, ..Default::default() },
//!                 launch_command: "true".into(),
//!             }],
//!         },
//!     },
//!     pods: vec![PodRef { pod_id: PodId::from("pod-1"), endpoint: None }],
//! };
//!
//! let proposals = engine.schedule_scale_up(&[job]);
//! assert_eq!(proposals.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod feasibility;
pub mod load;

pub use config::SchedulerConfig;
pub use engine::PlacementEngine;
pub use error::{Result, SchedulerError};
pub use feasibility::is_feasible;
pub use load::{is_overloaded, load, AgentHistory};
