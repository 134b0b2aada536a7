//! Deployment configuration resolution.
//!
//! Turns a [`DeploymentContext`] into a [`ProvisioningPlan`]: which source the
//! pipeline pulls from, which protocol the public listener speaks, and whether
//! a custom domain, DNS zone and certificate are attached. Every input
//! combination yields a plan; unusual combinations are reported through
//! [`ProvisioningPlan::coherence_warnings`] rather than rejected.

use serde::Serialize;

use super::context::{non_empty, DeploymentContext};

/// Branch every pipeline source tracks
pub const SOURCE_BRANCH: &str = "main";

/// Repository created when no external connection is configured
pub const FALLBACK_REPO_NAME: &str = "hello-go-cdk";

/// Description given to the fallback repository
pub const FALLBACK_REPO_DESCRIPTION: &str = "Hello Go application and CDK stack";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Third-party repository reached through a code connection
    ExternalConnection,
    /// Managed repository provisioned alongside the pipeline
    FallbackManagedRepo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationProtocol {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePlan {
    pub kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_arn: Option<String>,
    pub branch: String,
}

impl SourcePlan {
    /// True when the pipeline must create its own repository and export its
    /// clone URL.
    pub fn creates_repository(&self) -> bool {
        self.kind == SourceKind::FallbackManagedRepo
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolPlan {
    pub listener: ApplicationProtocol,
    pub target: ApplicationProtocol,
    pub redirect_http: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedZoneRef {
    pub hosted_zone_id: String,
    pub zone_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone: Option<HostedZoneRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningPlan {
    pub source: SourcePlan,
    pub protocol: ProtocolPlan,
    pub domain: DomainPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
}

impl ProvisioningPlan {
    /// Notes on combinations the load balancer will likely refuse or that
    /// leave a certificate unused. Never affects the plan itself.
    ///
    /// An HTTPS listener needs a domain and hosted zone no matter what: the
    /// certificate ARN is added to the listener after the service exists and
    /// does not stand in for them.
    pub fn coherence_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let https = self.protocol.listener == ApplicationProtocol::Https;

        if https && self.domain.hosted_zone.is_none() {
            warnings.push(
                "HTTPS listener requested without a domain name and hosted zone; \
                 the load balanced service cannot be created"
                    .to_string(),
            );
        }
        if !https && self.certificate_arn.is_some() {
            warnings.push(
                "certificate attached to a plain HTTP listener; it will not be used".to_string(),
            );
        }

        warnings
    }
}

/// Resolves the deployment context into a provisioning plan.
pub fn resolve(context: &DeploymentContext) -> ProvisioningPlan {
    ProvisioningPlan {
        source: resolve_source(context),
        protocol: resolve_protocol(context),
        domain: resolve_domain(context),
        certificate_arn: non_empty(&context.certificate_arn).map(str::to_string),
    }
}

fn resolve_source(context: &DeploymentContext) -> SourcePlan {
    match (
        non_empty(&context.github_repo_name),
        non_empty(&context.github_connection_arn),
    ) {
        (Some(repo), Some(arn)) => SourcePlan {
            kind: SourceKind::ExternalConnection,
            repo_name: Some(repo.to_string()),
            connection_arn: Some(arn.to_string()),
            branch: SOURCE_BRANCH.to_string(),
        },
        _ => SourcePlan {
            kind: SourceKind::FallbackManagedRepo,
            repo_name: Some(FALLBACK_REPO_NAME.to_string()),
            connection_arn: None,
            branch: SOURCE_BRANCH.to_string(),
        },
    }
}

fn resolve_protocol(context: &DeploymentContext) -> ProtocolPlan {
    let https = context.use_https == Some(true);

    ProtocolPlan {
        listener: if https {
            ApplicationProtocol::Https
        } else {
            ApplicationProtocol::Http
        },
        // TLS terminates at the load balancer
        target: ApplicationProtocol::Http,
        redirect_http: https,
    }
}

fn resolve_domain(context: &DeploymentContext) -> DomainPlan {
    let Some(domain) = non_empty(&context.domain_name) else {
        return DomainPlan::default();
    };

    DomainPlan {
        name: Some(domain.to_string()),
        hosted_zone: non_empty(&context.hosted_zone_id).map(|zone| HostedZoneRef {
            hosted_zone_id: zone.to_string(),
            zone_name: domain.to_string(),
        }),
    }
}
