//! Workflow graph construction and step state resolution

pub mod builder;
pub mod resolver;

pub use builder::{build_workflow_graph, FINAL_GROUP_LABEL, REVIEW_GROUP_LABEL};
pub use resolver::{
    resolve_step_states, AssessmentSkips, CurrentStep, SkipPredicate, StepApplicability,
};
