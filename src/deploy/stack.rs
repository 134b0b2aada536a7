//! Deployment description ("synthesis").
//!
//! Combines the resolved [`ProvisioningPlan`] with the fixed pipeline, service
//! and health-check settings into an [`Assembly`]: the document handed to the
//! provisioning service. Two stacks are described. The pipeline stack owns the
//! source and build; it deploys the application stack (Fargate service behind
//! an Application Load Balancer) through a single stage.

use serde::Serialize;

use super::context::{DeploymentContext, APP_STACK_ID, APP_STAGE_ID, PIPELINE_STACK_ID};
use super::resolver::{
    resolve, ApplicationProtocol, DomainPlan, ProtocolPlan, SourcePlan, FALLBACK_REPO_DESCRIPTION,
};
use super::suppressions::{SuppressionSet, APP_SUPPRESSIONS, PIPELINE_SUPPRESSIONS, RULE_PACK};
use crate::config::{
    AppConfig, DeployEnvironment, CONTAINER_HEALTHCHECK_COMMAND, CONTAINER_PORT,
    HEALTHCHECK_URL_PATH,
};

// =============================================================================
// Pipeline
// =============================================================================

pub const PIPELINE_NAME: &str = "HelloAppCDKPipeline";

/// Name of the shell step that builds and synthesizes
pub const SYNTH_STEP_NAME: &str = "Synth";

/// Commands run by the synth step, in order
pub const BUILD_COMMANDS: &[&str] = &[
    "npm install -g aws-cdk",
    "rustup toolchain install stable",
    "cargo build --release",
    "cdk synth",
];

/// Output exposing the clone URL of the fallback repository
pub const REPOSITORY_URL_OUTPUT: &str = "RepositoryURL";

// =============================================================================
// Service
// =============================================================================

pub const SERVICE_NAME: &str = "HelloService";
pub const LOAD_BALANCER_NAME: &str = "hello-alb";
pub const CONTAINER_NAME: &str = "HelloAppContainer";

/// Container build context, relative to the crate root. Holds the Dockerfile
/// that builds and runs `hellostack serve`.
pub const IMAGE_ASSET_DIR: &str = ".";
pub const IMAGE_PLATFORM: &str = "linux/amd64";
pub const CPU_ARCHITECTURE: &str = "X86_64";

/// Non-root user the container runs as
pub const CONTAINER_USER: &str = "1001";

pub const LOG_STREAM_PREFIX: &str = "HelloApp";

pub const DESIRED_COUNT: u32 = 2;

/// 256 = .25 vCPU
pub const TASK_CPU: u32 = 256;
pub const TASK_MEMORY_MIB: u32 = 512;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<DeployEnvironment>,
    pub compliance: ComplianceChecks,
    pub pipeline_stack: PipelineStack,
    /// Coherence notes from the resolver
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceChecks {
    pub rule_pack: &'static str,
    pub verbose: bool,
}

impl Default for ComplianceChecks {
    fn default() -> Self {
        Self {
            rule_pack: RULE_PACK,
            verbose: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStack {
    pub id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositorySpec>,
    pub outputs: Vec<OutputSpec>,
    pub pipeline: PipelineSpec,
    pub suppressions: SuppressionSet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySpec {
    pub name: String,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    pub id: &'static str,
    pub value: String,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    pub name: &'static str,
    pub self_mutation: bool,
    pub docker_enabled_for_synth: bool,
    pub docker_enabled_for_self_mutation: bool,
    pub synth: ShellStep,
    pub stages: Vec<StageSpec>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellStep {
    pub name: &'static str,
    pub input: SourcePlan,
    pub commands: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSpec {
    pub id: &'static str,
    pub compliance: ComplianceChecks,
    pub stacks: Vec<AppStack>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStack {
    pub id: &'static str,
    pub service: ServiceSpec,
    pub load_balancer: LoadBalancerSpec,
    pub suppressions: SuppressionSet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    pub service_name: &'static str,
    pub desired_count: u32,
    pub task: TaskSpec,
    pub container: ContainerSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub cpu: u32,
    pub memory_limit_mib: u32,
    pub cpu_architecture: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: &'static str,
    pub image: ImageAsset,
    pub user: &'static str,
    pub port_mappings: Vec<u16>,
    pub health_check: Vec<&'static str>,
    pub logging: LogDriver,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub directory: &'static str,
    pub platform: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDriver {
    pub driver: &'static str,
    pub stream_prefix: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    pub name: &'static str,
    pub protocol: ProtocolPlan,
    pub domain: DomainPlan,
    pub listener_certificates: Vec<String>,
    pub health_check: TargetHealthCheck,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetHealthCheck {
    pub path: &'static str,
    pub port: String,
    pub protocol: ApplicationProtocol,
}

/// Builds the deployment description for the given configuration and context.
pub fn synth(config: &AppConfig, context: &DeploymentContext) -> Assembly {
    let plan = resolve(context);
    let warnings = plan.coherence_warnings();

    tracing::info!(
        source = ?plan.source.kind,
        listener = ?plan.protocol.listener,
        domain = plan.domain.name.as_deref().unwrap_or("-"),
        hosted_zone = plan.domain.hosted_zone.is_some(),
        certificate = plan.certificate_arn.is_some(),
        "Resolved deployment plan"
    );
    for warning in &warnings {
        tracing::warn!(%warning, "Deployment plan is unusual");
    }

    let env = config.deploy.env.clone();
    let (repository, outputs) = if plan.source.creates_repository() {
        let name = plan.source.repo_name.clone().unwrap_or_default();
        let output = OutputSpec {
            id: REPOSITORY_URL_OUTPUT,
            value: clone_url_grc(&name, env.as_ref()),
            description: "Repository URL",
        };
        let repository = RepositorySpec {
            name,
            description: FALLBACK_REPO_DESCRIPTION,
        };
        (Some(repository), vec![output])
    } else {
        (None, Vec::new())
    };

    let app_stack = AppStack {
        id: APP_STACK_ID,
        service: service_spec(),
        load_balancer: LoadBalancerSpec {
            name: LOAD_BALANCER_NAME,
            protocol: plan.protocol,
            domain: plan.domain,
            listener_certificates: plan.certificate_arn.into_iter().collect(),
            health_check: TargetHealthCheck {
                path: HEALTHCHECK_URL_PATH,
                port: CONTAINER_PORT.to_string(),
                protocol: ApplicationProtocol::Http,
            },
        },
        suppressions: SuppressionSet::stack_wide(APP_SUPPRESSIONS),
    };

    let pipeline = PipelineSpec {
        name: PIPELINE_NAME,
        self_mutation: true,
        docker_enabled_for_synth: true,
        docker_enabled_for_self_mutation: true,
        synth: ShellStep {
            name: SYNTH_STEP_NAME,
            input: plan.source,
            commands: BUILD_COMMANDS,
        },
        stages: vec![StageSpec {
            id: APP_STAGE_ID,
            compliance: ComplianceChecks::default(),
            stacks: vec![app_stack],
        }],
    };

    Assembly {
        env,
        compliance: ComplianceChecks::default(),
        pipeline_stack: PipelineStack {
            id: PIPELINE_STACK_ID,
            repository,
            outputs,
            pipeline,
            suppressions: SuppressionSet::stack_wide(PIPELINE_SUPPRESSIONS),
        },
        warnings,
    }
}

fn service_spec() -> ServiceSpec {
    ServiceSpec {
        service_name: SERVICE_NAME,
        desired_count: DESIRED_COUNT,
        task: TaskSpec {
            cpu: TASK_CPU,
            memory_limit_mib: TASK_MEMORY_MIB,
            cpu_architecture: CPU_ARCHITECTURE,
        },
        container: ContainerSpec {
            name: CONTAINER_NAME,
            image: ImageAsset {
                directory: IMAGE_ASSET_DIR,
                platform: IMAGE_PLATFORM,
            },
            user: CONTAINER_USER,
            port_mappings: vec![CONTAINER_PORT],
            health_check: vec!["CMD-SHELL", CONTAINER_HEALTHCHECK_COMMAND],
            logging: LogDriver {
                driver: "awslogs",
                stream_prefix: LOG_STREAM_PREFIX,
            },
        },
    }
}

/// git-remote-codecommit clone URL. The region is left as a deploy-time
/// parameter for environment-agnostic stacks.
fn clone_url_grc(repo_name: &str, env: Option<&DeployEnvironment>) -> String {
    let region = env.map_or("${AWS::Region}", |env| env.region.as_str());
    format!("codecommit::{}://{}", region, repo_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_url_grc() {
        assert_eq!(
            clone_url_grc("hello-go-cdk", None),
            "codecommit::${AWS::Region}://hello-go-cdk"
        );
        let env = DeployEnvironment {
            account: "123456789012".to_string(),
            region: "eu-west-1".to_string(),
        };
        assert_eq!(
            clone_url_grc("hello-go-cdk", Some(&env)),
            "codecommit::eu-west-1://hello-go-cdk"
        );
    }

    #[test]
    fn test_service_spec_is_fixed() {
        let spec = service_spec();
        assert_eq!(spec.desired_count, 2);
        assert_eq!(spec.task.cpu, 256);
        assert_eq!(spec.task.memory_limit_mib, 512);
        assert_eq!(spec.container.port_mappings, vec![8080]);
        assert_eq!(
            spec.container.health_check,
            vec!["CMD-SHELL", "curl -f http://localhost:8080/healthcheck || exit 1"]
        );
        assert_eq!(spec.container.logging.stream_prefix, "HelloApp");
    }

    #[test]
    fn test_image_asset_dir_has_a_dockerfile() {
        let dockerfile = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join(IMAGE_ASSET_DIR)
            .join("Dockerfile");
        let contents = std::fs::read_to_string(&dockerfile).unwrap();
        assert!(contents.contains(&format!("EXPOSE {}", CONTAINER_PORT)));
        assert!(contents.contains(&format!("USER {}", CONTAINER_USER)));
        assert!(contents.contains("hellostack"));
        // The container health check shells out to curl
        assert!(contents.contains("curl"));
    }

    #[test]
    fn test_build_commands_end_with_build_then_synth() {
        let n = BUILD_COMMANDS.len();
        assert_eq!(BUILD_COMMANDS[n - 2], "cargo build --release");
        assert_eq!(BUILD_COMMANDS[n - 1], "cdk synth");
    }
}
