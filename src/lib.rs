//! Procurement approval routing
//!
//! Decides, for a procurement request, which approvers must sign off and in
//! what order:
//!
//! - `extractor` finds implicit risk signals in free text and vendor names
//! - `assessment` scores the request, assigns a tier and gates each approver
//! - `workflow` expands an assessment into a display graph and resolves the
//!   status of persisted requests from their current-step pointer
//!
//! All routing operations are pure functions of the request and the loaded
//! `RoutingPolicy`. Policy loading is the only fallible step.

pub mod assessment;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod format;
pub mod policy;
pub mod workflow;

pub use engine::{
    assess_risk, build_workflow_graph, resolve_step_states, RoutingDecision, RoutingEngine,
};
pub use error::{RoutingError, RoutingResult};
pub use policy::{ConfigLoader, PolicyConfig, RoutingPolicy};
pub use workflow::{AssessmentSkips, CurrentStep, SkipPredicate, StepApplicability};

pub use procurement_types;
