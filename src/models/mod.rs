pub mod auth;
pub mod common;
pub mod grading;
pub mod submissions;
pub mod users;

pub use common::reply::EngineReply;
pub use common::response::ApiResponse;

/// 内部 API 业务状态码
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorCode {
    Success = 200,
    BadRequest = 400,
    Unauthorized = 401,
    NotFound = 404,
    InternalServerError = 500,
    AuthFailed = 1001,
}

/// 程序启动时间（用于状态探针）
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
