//! Typed deployment context.
//!
//! The context lookup is untyped at the boundary; this module reads it once
//! into [`DeploymentContext`] so the resolver only ever sees optional strings
//! and booleans.

use crate::config::{ConfigError, ContextLookup};

/// Stack holding the pipeline and its source
pub const PIPELINE_STACK_ID: &str = "HelloGoPipelineStack";

/// Stack holding the Fargate service and load balancer
pub const APP_STACK_ID: &str = "HelloGoAppStack";

/// Stage the pipeline deploys the application stack through
pub const APP_STAGE_ID: &str = "HelloGoAppStage";

/// Builds the lookup key for a context value owned by `stack_id`.
pub fn context_key(stack_id: &str, name: &str) -> String {
    format!("{}:{}", stack_id, name)
}

/// Deployment inputs, each optional. Empty strings are kept as given and
/// treated as absent by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentContext {
    pub github_repo_name: Option<String>,
    pub github_connection_arn: Option<String>,
    pub use_https: Option<bool>,
    pub domain_name: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub certificate_arn: Option<String>,
}

impl DeploymentContext {
    /// Reads every deployment input from the context lookup.
    ///
    /// Source settings are keyed under the pipeline stack, exposure settings
    /// under the application stack.
    pub fn from_lookup(lookup: &ContextLookup) -> Result<Self, ConfigError> {
        let pipeline = |name| context_key(PIPELINE_STACK_ID, name);
        let app = |name| context_key(APP_STACK_ID, name);

        Ok(Self {
            github_repo_name: lookup.string(&pipeline("githubRepoName"))?,
            github_connection_arn: lookup.string(&pipeline("githubConnectionArn"))?,
            use_https: lookup.flag(&app("useHttps"))?,
            domain_name: lookup.string(&app("domainName"))?,
            hosted_zone_id: lookup.string(&app("hostedZoneId"))?,
            certificate_arn: lookup.string(&app("certificateArn"))?,
        })
    }
}

/// Returns the value when present and non-empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lookup() {
        let ctx = DeploymentContext::from_lookup(&ContextLookup::default()).unwrap();
        assert_eq!(ctx, DeploymentContext::default());
    }

    #[test]
    fn test_keys_are_scoped_by_stack() {
        let mut lookup = ContextLookup::default();
        lookup.set("HelloGoPipelineStack:githubRepoName", "owner/repo");
        lookup.set("HelloGoPipelineStack:githubConnectionArn", "arn:conn");
        lookup.set("HelloGoAppStack:useHttps", "true");
        lookup.set("HelloGoAppStack:domainName", "example.com");
        lookup.set("HelloGoAppStack:hostedZoneId", "Z123");
        lookup.set("HelloGoAppStack:certificateArn", "arn:cert");
        // Wrong stack: ignored
        lookup.set("HelloGoAppStack:githubRepoName", "other/repo");

        let ctx = DeploymentContext::from_lookup(&lookup).unwrap();
        assert_eq!(ctx.github_repo_name.as_deref(), Some("owner/repo"));
        assert_eq!(ctx.github_connection_arn.as_deref(), Some("arn:conn"));
        assert_eq!(ctx.use_https, Some(true));
        assert_eq!(ctx.domain_name.as_deref(), Some("example.com"));
        assert_eq!(ctx.hosted_zone_id.as_deref(), Some("Z123"));
        assert_eq!(ctx.certificate_arn.as_deref(), Some("arn:cert"));
    }

    #[test]
    fn test_bad_flag_names_the_key() {
        let mut lookup = ContextLookup::default();
        lookup.set("HelloGoAppStack:useHttps", "enabled");
        let err = DeploymentContext::from_lookup(&lookup).unwrap_err();
        assert!(err.to_string().contains("HelloGoAppStack:useHttps"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("x".to_string())), Some("x"));
    }
}
