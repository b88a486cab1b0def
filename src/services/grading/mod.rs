//! 评分路由与质量门
//!
//! 质量门解读外部基础检查的结果，路由器根据策略配置和
//! 校准计数决定下一个评分人类型。

pub mod policy;
pub mod quality_gate;
pub mod router;

pub use quality_gate::{BasicQualityCheck, QualityCheck, QualityCheckResult};
pub use router::CalibrationCounters;

use std::sync::Arc;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::Storage;

/// 读取某位置的校准计数，经过对象缓存
///
/// 计数允许轻微滞后：过期读最多让一份提交的路由偏移一次，
/// 不构成正确性问题。
pub async fn calibration_counters(
    storage: &Arc<dyn Storage>,
    cache: &Arc<dyn ObjectCache>,
    location: &str,
) -> Result<CalibrationCounters> {
    let key = format!("calibration:{location}");

    if let CacheResult::Found(json) = cache.get_raw(&key).await {
        if let Ok(counters) = serde_json::from_str::<CalibrationCounters>(&json) {
            return Ok(counters);
        }
        cache.remove(&key).await;
    }

    let (graded_by_instructor, pending_instructor) =
        storage.count_graded_and_pending_instructor(location).await?;
    let counters = CalibrationCounters {
        graded_by_instructor,
        pending_instructor,
    };

    if let Ok(json) = serde_json::to_string(&counters) {
        cache
            .insert_raw(key, json, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(counters)
}
