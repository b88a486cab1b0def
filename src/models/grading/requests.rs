use serde::Deserialize;

/// 同伴评分认领请求（GET 查询参数）
#[derive(Debug, Clone, Deserialize)]
pub struct PeerClaimQuery {
    pub grader_id: String,
    pub location: String,
}

/// 同伴评分提交请求
///
/// 六个字段全部必填；score 以原始字符串接收，解析失败时
/// 将原值回显给调用方便于诊断。
#[derive(Debug, Clone, Deserialize)]
pub struct SaveGradeRequest {
    pub location: String,
    pub grader_id: String,
    pub submission_id: i64,
    /// 目前只接收不校验，保留作向前兼容的授权字段
    pub submission_key: String,
    pub score: String,
    pub feedback: String,
}
