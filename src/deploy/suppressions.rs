//! Compliance-check exceptions.
//!
//! Each table lists the `AwsSolutions` rules a stack is exempt from, with the
//! recorded justification and, for wildcard-permission rules, the exact
//! action/resource patterns the exemption covers. All entries are applied to
//! the stack and every construct below it.

use serde::Serialize;

/// Rule pack the compliance checker runs
pub const RULE_PACK: &str = "AwsSolutions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suppression {
    pub id: &'static str,
    pub reason: &'static str,
    #[serde(skip_serializing_if = "is_unscoped")]
    pub applies_to: &'static [&'static str],
}

/// Suppressions attached to one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionSet {
    /// Whether the exemptions also cover every construct below the stack
    pub apply_to_children: bool,
    pub entries: &'static [Suppression],
}

impl SuppressionSet {
    /// Stack-wide exemptions, inherited by all children.
    pub const fn stack_wide(entries: &'static [Suppression]) -> Self {
        Self {
            apply_to_children: true,
            entries,
        }
    }
}

fn is_unscoped(patterns: &&'static [&'static str]) -> bool {
    patterns.is_empty()
}

const fn rule(id: &'static str, reason: &'static str) -> Suppression {
    Suppression {
        id,
        reason,
        applies_to: &[],
    }
}

pub const PIPELINE_SUPPRESSIONS: &[Suppression] = &[
    rule(
        "AwsSolutions-S1",
        "CDK Pipeline does not need server access logs for Artifacts bucket",
    ),
    rule("AwsSolutions-CB3", "CDK Pipeline builds docker images"),
    rule(
        "AwsSolutions-CB4",
        "CDK Pipeline does not need an AWS KMS key on Artifacts bucket",
    ),
    Suppression {
        id: "AwsSolutions-IAM5",
        reason: "CDK Pipeline needs full access to Artifacts bucket",
        applies_to: &[
            "Action::s3:List*",
            "Action::s3:GetObject*",
            "Resource::<CDKPipelineArtifactsBucket88CFD064.Arn>/*",
            "Action::s3:GetBucket*",
            "Resource::<CDKPipelineArtifactsBucket88CFD064.Arn>",
        ],
    },
    Suppression {
        id: "AwsSolutions-IAM5",
        reason: "CDK Pipeline needs more wildcard access",
        applies_to: &[
            "Action::s3:*",
            "Action::s3:DeleteObject*",
            "Action::s3:Abort*",
            "Resource::*",
            "Resource::arn:*:iam::<AWS::AccountId>:role/*",
            "Resource::arn:<AWS::Partition>:codebuild:<AWS::Region>:<AWS::AccountId>:report-group/*",
            "Resource::arn:<AWS::Partition>:codebuild:<AWS::Region>:<AWS::AccountId>:report-group/<CDKPipelineBuildSynthCdkBuildProjectE1276695>-*",
            "Resource::arn:<AWS::Partition>:codebuild:<AWS::Region>:<AWS::AccountId>:report-group/<CDKPipelineUpdatePipelineSelfMutation7AA6B177>-*",
            "Resource::arn:<AWS::Partition>:logs:<AWS::Region>:<AWS::AccountId>:log-group:/aws/codebuild/*",
            "Resource::arn:<AWS::Partition>:logs:<AWS::Region>:<AWS::AccountId>:log-group:/aws/codebuild/<CDKPipelineBuildSynthCdkBuildProjectE1276695>:*",
            "Resource::arn:<AWS::Partition>:logs:<AWS::Region>:<AWS::AccountId>:log-group:/aws/codebuild/<CDKPipelineUpdatePipelineSelfMutation7AA6B177>:*",
        ],
    },
];

pub const APP_SUPPRESSIONS: &[Suppression] = &[
    rule("AwsSolutions-ELB2", "Demo doesn't use access logs"),
    rule("AwsSolutions-VPC7", "Demo doesn't use VPC flow logs"),
    rule(
        "AwsSolutions-ECS4",
        "Demo doesn't use CloudWatch Container Insights",
    ),
    rule(
        "AwsSolutions-EC23",
        "Security Group used by ALB with listeners on 80 and 443",
    ),
    rule(
        "AwsSolutions-IAM5",
        "TaskDef/ExecutionRole needs wildcard access",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_belongs_to_the_rule_pack() {
        for s in PIPELINE_SUPPRESSIONS.iter().chain(APP_SUPPRESSIONS) {
            assert!(s.id.starts_with("AwsSolutions-"), "{}", s.id);
            assert!(!s.reason.is_empty(), "{} has no reason", s.id);
        }
    }

    #[test]
    fn test_only_wildcard_rules_are_scoped() {
        let scoped: Vec<_> = PIPELINE_SUPPRESSIONS
            .iter()
            .chain(APP_SUPPRESSIONS)
            .filter(|s| !s.applies_to.is_empty())
            .collect();
        assert_eq!(scoped.len(), 2);
        assert!(scoped.iter().all(|s| s.id == "AwsSolutions-IAM5"));
    }

    #[test]
    fn test_stack_wide_set_applies_to_children() {
        let set = SuppressionSet::stack_wide(APP_SUPPRESSIONS);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["applyToChildren"], true);
        assert_eq!(json["entries"].as_array().unwrap().len(), APP_SUPPRESSIONS.len());
    }

    #[test]
    fn test_unscoped_entry_omits_applies_to() {
        let json = serde_json::to_value(APP_SUPPRESSIONS[0]).unwrap();
        assert_eq!(json["id"], "AwsSolutions-ELB2");
        assert!(json.get("appliesTo").is_none());
    }
}
