use serde::Serialize;

/// 认领成功后返回给同伴评分客户端的作业内容
#[derive(Debug, Clone, Serialize)]
pub struct PeerSubmissionResponse {
    pub submission_id: i64,
    pub submission_key: String,
    pub student_response: String,
    pub prompt: String,
    pub rubric: String,
    pub max_score: i32,
}

/// 评分保存成功的应答载荷
#[derive(Debug, Clone, Serialize)]
pub struct GradeSaved {
    pub msg: String,
}
