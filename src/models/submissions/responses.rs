use serde::Serialize;

/// 提交受理成功的应答载荷
#[derive(Debug, Clone, Serialize)]
pub struct SubmitAccepted {
    pub message: String,
}
