//! Deployment description for running the hello service on Fargate.
//!
//! The context lookup is read once into a typed [`DeploymentContext`], the
//! resolver derives how the service is exposed, and [`synth`] emits the full
//! pipeline and application description. Nothing here talks to a cloud API.

mod context;
mod resolver;
mod stack;
pub mod suppressions;

pub use context::{context_key, DeploymentContext, APP_STACK_ID, APP_STAGE_ID, PIPELINE_STACK_ID};
pub use resolver::{
    resolve, ApplicationProtocol, DomainPlan, HostedZoneRef, ProtocolPlan, ProvisioningPlan,
    SourceKind, SourcePlan, FALLBACK_REPO_NAME, SOURCE_BRANCH,
};
pub use stack::{synth, Assembly, BUILD_COMMANDS, PIPELINE_NAME, REPOSITORY_URL_OUTPUT};
