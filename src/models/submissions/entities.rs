use serde::{Deserialize, Serialize};

// 提交生命周期状态
//
// created → basic_check_pending → (rejected | waiting_to_be_graded)
//         → being_graded → graded
// rejected 为终态；同伴评分下 graded 之前可能多次回到 waiting_to_be_graded。
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Created,           // 已建档，尚未处理
    BasicCheckPending, // 等待基础质量检查
    Rejected,          // 未通过基础检查（终态）
    WaitingToBeGraded, // 等待被认领评分
    BeingGraded,       // 已被某个评分人认领
    Graded,            // 本轮评分完成
}

impl SubmissionState {
    pub const CREATED: &'static str = "created";
    pub const BASIC_CHECK_PENDING: &'static str = "basic_check_pending";
    pub const REJECTED: &'static str = "rejected";
    pub const WAITING_TO_BE_GRADED: &'static str = "waiting_to_be_graded";
    pub const BEING_GRADED: &'static str = "being_graded";
    pub const GRADED: &'static str = "graded";
}

impl<'de> Deserialize<'de> for SubmissionState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionState::Created => Self::CREATED,
            SubmissionState::BasicCheckPending => Self::BASIC_CHECK_PENDING,
            SubmissionState::Rejected => Self::REJECTED,
            SubmissionState::WaitingToBeGraded => Self::WAITING_TO_BE_GRADED,
            SubmissionState::BeingGraded => Self::BEING_GRADED,
            SubmissionState::Graded => Self::GRADED,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SubmissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::CREATED => Ok(SubmissionState::Created),
            Self::BASIC_CHECK_PENDING => Ok(SubmissionState::BasicCheckPending),
            Self::REJECTED => Ok(SubmissionState::Rejected),
            Self::WAITING_TO_BE_GRADED => Ok(SubmissionState::WaitingToBeGraded),
            Self::BEING_GRADED => Ok(SubmissionState::BeingGraded),
            Self::GRADED => Ok(SubmissionState::Graded),
            _ => Err(format!("Invalid submission state: {s}")),
        }
    }
}

// 评分人类型（两字母代码与原始队列系统保持线上兼容）
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum GraderType {
    #[serde(rename = "BC")]
    BasicCheck,
    #[serde(rename = "ML")]
    MachineLearning,
    #[serde(rename = "IN")]
    Instructor,
    #[serde(rename = "PE")]
    Peer,
}

impl GraderType {
    pub const BASIC_CHECK: &'static str = "BC";
    pub const MACHINE_LEARNING: &'static str = "ML";
    pub const INSTRUCTOR: &'static str = "IN";
    pub const PEER: &'static str = "PE";
}

impl<'de> Deserialize<'de> for GraderType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for GraderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GraderType::BasicCheck => Self::BASIC_CHECK,
            GraderType::MachineLearning => Self::MACHINE_LEARNING,
            GraderType::Instructor => Self::INSTRUCTOR,
            GraderType::Peer => Self::PEER,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GraderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::BASIC_CHECK => Ok(GraderType::BasicCheck),
            Self::MACHINE_LEARNING => Ok(GraderType::MachineLearning),
            Self::INSTRUCTOR => Ok(GraderType::Instructor),
            Self::PEER => Ok(GraderType::Peer),
            _ => Err(format!("Invalid grader type: {s}")),
        }
    }
}

// 提交业务实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub prompt: String,
    pub rubric: String,
    pub student_id: String,
    pub problem_id: String,
    pub location: String,
    pub course_id: String,
    pub student_response: String,
    pub student_submission_time: chrono::DateTime<chrono::Utc>,
    pub xqueue_submission_id: String,
    pub xqueue_submission_key: String,
    pub xqueue_queue_name: String,
    pub max_score: i32,
    pub grader_settings: String,
    pub state: SubmissionState,
    pub next_grader_type: GraderType,
    pub claimed_by: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 待建档的提交属性
///
/// 字段元组唯一标识一份提交：相同信封重复投递必须返回已有实体，
/// 由指纹列上的唯一约束在存储边界保证。
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub prompt: String,
    pub rubric: String,
    pub student_id: String,
    pub problem_id: String,
    pub location: String,
    pub course_id: String,
    pub student_response: String,
    pub student_submission_time: chrono::DateTime<chrono::Utc>,
    pub xqueue_submission_id: String,
    pub xqueue_submission_key: String,
    pub xqueue_queue_name: String,
    pub max_score: i32,
    pub grader_settings: String,
    pub state: SubmissionState,
    pub next_grader_type: GraderType,
}

impl NewSubmission {
    /// 身份元组的 SHA-256 指纹（十六进制）
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for field in [
            self.prompt.as_str(),
            self.rubric.as_str(),
            self.student_id.as_str(),
            self.problem_id.as_str(),
            self.location.as_str(),
            self.course_id.as_str(),
            self.student_response.as_str(),
            self.xqueue_submission_id.as_str(),
            self.xqueue_submission_key.as_str(),
            self.xqueue_queue_name.as_str(),
            self.grader_settings.as_str(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(self.student_submission_time.timestamp().to_be_bytes());
        hasher.update(self.max_score.to_be_bytes());
        hasher.update(self.state.to_string().as_bytes());

        format!("{:x}", hasher.finalize())
    }
}
