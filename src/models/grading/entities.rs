use serde::{Deserialize, Serialize};

use crate::models::submissions::entities::GraderType;

// 单次评分结果状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum GraderStatus {
    #[serde(rename = "S")]
    Success,
    #[serde(rename = "F")]
    Failure,
}

impl GraderStatus {
    pub const SUCCESS: &'static str = "S";
    pub const FAILURE: &'static str = "F";
}

impl<'de> Deserialize<'de> for GraderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for GraderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GraderStatus::Success => Self::SUCCESS,
            GraderStatus::Failure => Self::FAILURE,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GraderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::SUCCESS => Ok(GraderStatus::Success),
            Self::FAILURE => Ok(GraderStatus::Failure),
            _ => Err(format!("Invalid grader status: {s}")),
        }
    }
}

// 评分记录业务实体（创建后不可变，归属于被评的提交）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: i64,
    pub submission_id: i64,
    pub score: i32,
    pub feedback: String,
    pub grader_id: String,
    pub grader_type: GraderType,
    pub status: GraderStatus,
    pub confidence: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 待持久化的评分记录属性
#[derive(Debug, Clone)]
pub struct NewGradeRecord {
    pub submission_id: i64,
    pub score: i32,
    pub feedback: String,
    pub grader_id: String,
    pub grader_type: GraderType,
    pub status: GraderStatus,
    pub confidence: f64,
}
