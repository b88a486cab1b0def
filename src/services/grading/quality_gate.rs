//! 基础质量检查
//!
//! 对提交文本做一次廉价的准入检查，分数只有 0/1 两档：
//! 0 表示拒绝进入评分流程，1 表示放行。

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result;

/// 放行所需的最少词数
const MIN_RESPONSE_WORDS: usize = 3;

/// 质量检查结果
///
/// details 随记录一并落库，供人工排查拒绝原因。
#[derive(Debug, Clone, Serialize)]
pub struct QualityCheckResult {
    /// 0 = 拒绝，1 = 放行
    pub score: i32,
    pub word_count: usize,
    pub reason: Option<String>,
}

impl QualityCheckResult {
    pub fn passed(&self) -> bool {
        self.score > 0
    }
}

/// 质量检查器
///
/// 检查本身可能依赖外部服务，失败（Err）与"检查完成但判 0 分"
/// 是两种不同结果：前者整个提交处理失败，后者提交被正常拒绝。
#[async_trait]
pub trait QualityCheck: Send + Sync {
    async fn evaluate(&self, response_text: &str) -> Result<QualityCheckResult>;
}

/// 内置的启发式检查器：空白或过短的回答直接拒绝
#[derive(Debug, Default)]
pub struct BasicQualityCheck;

#[async_trait]
impl QualityCheck for BasicQualityCheck {
    async fn evaluate(&self, response_text: &str) -> Result<QualityCheckResult> {
        let word_count = response_text.split_whitespace().count();

        let result = if word_count == 0 {
            QualityCheckResult {
                score: 0,
                word_count,
                reason: Some("回答为空".to_string()),
            }
        } else if word_count < MIN_RESPONSE_WORDS {
            QualityCheckResult {
                score: 0,
                word_count,
                reason: Some(format!("回答过短: {word_count} 词")),
            }
        } else {
            QualityCheckResult {
                score: 1,
                word_count,
                reason: None,
            }
        };

        Ok(result)
    }
}
