//! 评分策略解析
//!
//! 提交信封携带的 grader_settings 只是引用名，真正的策略
//! 在进程配置中按名索引。未配置的引用在入口处立即失败，
//! 而不是带着坏引用进入路由。

use crate::config::{GraderPolicy, GradingConfig};
use crate::errors::{ControllerError, Result};

/// 按引用名解析评分策略
pub fn resolve_policy(config: &GradingConfig, grader_settings: &str) -> Result<GraderPolicy> {
    config.policies.get(grader_settings).cloned().ok_or_else(|| {
        ControllerError::invalid_grader_policy(format!("未配置的评分策略引用: {grader_settings:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(name: &str, policy: GraderPolicy) -> GradingConfig {
        let mut policies = HashMap::new();
        policies.insert(name.to_string(), policy);
        GradingConfig {
            peer_grade_target: 1,
            claim_timeout: 1800,
            policies,
        }
    }

    #[test]
    fn known_reference_resolves() {
        let config = config_with("essay_ml", GraderPolicy::MachineLearning { min_to_use_ml: 10 });
        let policy = resolve_policy(&config, "essay_ml").unwrap();
        assert_eq!(policy, GraderPolicy::MachineLearning { min_to_use_ml: 10 });
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let config = config_with("essay_ml", GraderPolicy::MachineLearning { min_to_use_ml: 10 });
        let err = resolve_policy(&config, "no_such_policy").unwrap_err();
        assert_eq!(err.code(), "E013");
    }

    #[test]
    fn empty_reference_is_rejected() {
        let config = config_with("essay_peer", GraderPolicy::Peer { min_to_use_peer: 5 });
        assert!(resolve_policy(&config, "").is_err());
    }
}
