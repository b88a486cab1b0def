use serde::Deserialize;

/// xqueue 拉取脚本提交的原始信封
///
/// header 和 body 本身是 JSON 字符串，需要经过入站校验器解析。
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub xqueue_header: String,
    pub xqueue_body: String,
}

/// 信封 header（必须包含全部三个键）
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EnvelopeHeader {
    pub submission_id: String,
    pub submission_key: String,
    pub queue_name: String,
}

/// 评分上下文载荷（body.grader_payload，自身又是 JSON 字符串）
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GraderPayload {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub rubric: String,
    pub location: String,
    pub course_id: String,
    /// 缺省时回落到 location
    pub problem_id: Option<String>,
    #[serde(default)]
    pub grader_settings: String,
}

/// 学生信息（body.student_info，自身又是 JSON 字符串）
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StudentInfo {
    pub anonymous_student_id: String,
    /// 格式 YYYYMMDDHHMMSS，在建档时解析
    pub submission_time: String,
}

/// 信封 body（必须包含 grader_payload / student_response / student_info）
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeBody {
    pub grader_payload: GraderPayload,
    pub student_response: String,
    pub student_info: StudentInfo,
    pub max_score: i32,
}

/// 校验通过后的规范化信封
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionEnvelope {
    pub header: EnvelopeHeader,
    pub body: EnvelopeBody,
}
