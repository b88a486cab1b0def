//! 面向队列/LMS 客户端的版本化应答
//!
//! 所有引擎侧接口统一返回 `{version, success, message|error}`。

use serde::{Deserialize, Serialize};

/// 引擎接口协议版本
pub const INTERFACE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReply<T> {
    pub version: u32,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> EngineReply<T> {
    pub fn success(message: T) -> Self {
        Self {
            version: INTERFACE_VERSION,
            success: true,
            message: Some(message),
            error: None,
        }
    }
}

impl EngineReply<()> {
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            version: INTERFACE_VERSION,
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
