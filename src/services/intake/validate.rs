//! 入站信封校验
//!
//! 信封来自外部队列拉取脚本：header 与 body 是 JSON 字符串，
//! body 里的 grader_payload 与 student_info 又各自嵌套一层
//! JSON 字符串。任何缺键或解析失败都归为同一种校验错误，
//! 调用方统一回 "Incorrect format"。

use serde_json::Value;

use crate::errors::{ControllerError, Result};
use crate::models::submissions::requests::{
    EnvelopeBody, EnvelopeHeader, GraderPayload, StudentInfo, SubmitRequest, SubmissionEnvelope,
};

const HEADER_KEYS: [&str; 3] = ["submission_id", "submission_key", "queue_name"];
const BODY_KEYS: [&str; 3] = ["grader_payload", "student_response", "student_info"];

fn invalid(what: impl std::fmt::Display) -> ControllerError {
    ControllerError::invalid_reply(format!("信封校验失败: {what}"))
}

/// 把 JSON 字符串解析为对象
fn parse_object(raw: &str, what: &str) -> Result<serde_json::Map<String, Value>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|_| invalid(format!("{what} 不是合法 JSON")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid(format!("{what} 不是对象"))),
    }
}

/// 取出嵌套字段并解析为对象
///
/// 字段正常情况下是 JSON 字符串；已经展开成对象的也接受。
fn nested_object(
    map: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<serde_json::Map<String, Value>> {
    match map.get(key) {
        Some(Value::String(raw)) => parse_object(raw, key),
        Some(Value::Object(obj)) => Ok(obj.clone()),
        Some(_) => Err(invalid(format!("{key} 不是对象"))),
        None => Err(invalid(format!("缺少键 {key}"))),
    }
}

/// 校验原始信封并规范化为类型化结构
pub fn validate_reply(raw: &SubmitRequest) -> Result<SubmissionEnvelope> {
    let header_map = parse_object(&raw.xqueue_header, "xqueue_header")?;
    let body_map = parse_object(&raw.xqueue_body, "xqueue_body")?;

    for key in HEADER_KEYS {
        if !header_map.contains_key(key) {
            return Err(invalid(format!("header 缺少键 {key}")));
        }
    }
    for key in BODY_KEYS {
        if !body_map.contains_key(key) {
            return Err(invalid(format!("body 缺少键 {key}")));
        }
    }

    let header: EnvelopeHeader = serde_json::from_value(Value::Object(header_map))
        .map_err(|e| invalid(format!("header 解析失败: {e}")))?;

    let grader_payload: GraderPayload =
        serde_json::from_value(Value::Object(nested_object(&body_map, "grader_payload")?))
            .map_err(|e| invalid(format!("grader_payload 解析失败: {e}")))?;

    let student_info: StudentInfo =
        serde_json::from_value(Value::Object(nested_object(&body_map, "student_info")?))
            .map_err(|e| invalid(format!("student_info 解析失败: {e}")))?;

    let student_response = body_map
        .get("student_response")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("student_response 不是字符串"))?
        .to_string();

    // max_score 允许 10 或 10.0，但不接受带小数部分的值
    let max_score = body_map
        .get("max_score")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| invalid("缺少有效的 max_score"))?;
    if max_score.fract() != 0.0 || max_score < i32::MIN as f64 || max_score > i32::MAX as f64 {
        return Err(invalid(format!("max_score 不是整数: {max_score}")));
    }
    let max_score = max_score as i32;

    Ok(SubmissionEnvelope {
        header,
        body: EnvelopeBody {
            grader_payload,
            student_response,
            student_info,
            max_score,
        },
    })
}
