//! 评分路由器
//!
//! 纯函数：策略 + 校准计数 → 下一个评分人类型。
//! 机器评分与同伴评分都需要足够的教师校准样例，
//! 不足时回落到教师评分来积累校准量。

use serde::{Deserialize, Serialize};

use crate::config::GraderPolicy;
use crate::models::submissions::entities::GraderType;

/// 某位置的校准计数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationCounters {
    /// 已有教师成功评分记录的提交数
    pub graded_by_instructor: u64,
    /// 已路由给教师且仍未评完的提交数
    pub pending_instructor: u64,
}

impl CalibrationCounters {
    /// 校准总量：已评 + 在途一并计入，避免在途提交重复触发回落
    pub fn sum(&self) -> i64 {
        (self.graded_by_instructor + self.pending_instructor) as i64
    }
}

/// 根据策略和校准计数决定下一个评分人类型
///
/// 阈值比较是闭区间下界（达到阈值即可切换）。
pub fn route(policy: &GraderPolicy, counters: CalibrationCounters) -> GraderType {
    let calibrated = counters.sum();

    match policy {
        GraderPolicy::MachineLearning { min_to_use_ml } => {
            if calibrated >= *min_to_use_ml {
                GraderType::MachineLearning
            } else {
                GraderType::Instructor
            }
        }
        GraderPolicy::Peer { min_to_use_peer } => {
            if calibrated >= *min_to_use_peer {
                GraderType::Peer
            } else {
                GraderType::Instructor
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(graded: u64, pending: u64) -> CalibrationCounters {
        CalibrationCounters {
            graded_by_instructor: graded,
            pending_instructor: pending,
        }
    }

    #[test]
    fn ml_below_threshold_falls_back_to_instructor() {
        let policy = GraderPolicy::MachineLearning { min_to_use_ml: 10 };
        assert_eq!(route(&policy, counters(9, 0)), GraderType::Instructor);
        assert_eq!(route(&policy, counters(4, 5)), GraderType::Instructor);
    }

    #[test]
    fn ml_at_threshold_routes_to_ml() {
        let policy = GraderPolicy::MachineLearning { min_to_use_ml: 10 };
        assert_eq!(route(&policy, counters(10, 0)), GraderType::MachineLearning);
        assert_eq!(route(&policy, counters(6, 4)), GraderType::MachineLearning);
        assert_eq!(route(&policy, counters(100, 0)), GraderType::MachineLearning);
    }

    #[test]
    fn peer_below_threshold_falls_back_to_instructor() {
        let policy = GraderPolicy::Peer { min_to_use_peer: 5 };
        assert_eq!(route(&policy, counters(4, 0)), GraderType::Instructor);
        assert_eq!(route(&policy, counters(0, 0)), GraderType::Instructor);
    }

    #[test]
    fn peer_at_threshold_routes_to_peer() {
        let policy = GraderPolicy::Peer { min_to_use_peer: 5 };
        assert_eq!(route(&policy, counters(5, 0)), GraderType::Peer);
        assert_eq!(route(&policy, counters(2, 3)), GraderType::Peer);
    }

    #[test]
    fn pending_instructor_submissions_count_toward_calibration() {
        // 在途的教师评分任务也计入校准量，避免同一批提交
        // 全部回落给教师
        let policy = GraderPolicy::Peer { min_to_use_peer: 5 };
        assert_eq!(route(&policy, counters(0, 5)), GraderType::Peer);
    }
}
