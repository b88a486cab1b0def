//! 请求参数反序列化错误的统一处理
//!
//! actix 默认把反序列化失败回 400 纯文本。内部 API 统一成
//! `ApiResponse` JSON 格式；面向队列/LMS 的引擎接口则必须维持
//! 版本化信封 `{version, success, error}`（HTTP 200，错误走
//! success=false），由各自 scope 上注册的处理器区分。

use actix_web::{HttpRequest, error::Error};

use crate::models::{ApiResponse, EngineReply, ErrorCode};

/// JSON body 解析错误（内部 API）
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> Error {
    let message = format!("Invalid JSON payload: {err}");
    actix_web::error::InternalError::from_response(
        err,
        actix_web::HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// 查询参数解析错误（内部 API）
pub fn query_error_handler(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> Error {
    let message = format!("Invalid query parameters: {err}");
    actix_web::error::InternalError::from_response(
        err,
        actix_web::HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// JSON body 解析错误（引擎接口，版本化信封）
pub fn engine_json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> Error {
    let reply = EngineReply::error(format!("Incorrect format: {err}"));
    actix_web::error::InternalError::from_response(
        err,
        actix_web::HttpResponse::Ok().json(reply),
    )
    .into()
}

/// 查询参数解析错误（引擎接口，版本化信封）
pub fn engine_query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &HttpRequest,
) -> Error {
    let reply = EngineReply::error(format!("Incorrect format: {err}"));
    actix_web::error::InternalError::from_response(
        err,
        actix_web::HttpResponse::Ok().json(reply),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test::TestRequest, web};

    use crate::models::grading::requests::{PeerClaimQuery, SaveGradeRequest};

    #[actix_web::test]
    async fn engine_json_errors_keep_the_versioned_envelope() {
        // 缺 score 字段的 save_grade 请求体
        let raw = r#"{"location":"loc-1","grader_id":"g1","submission_id":1,
                      "submission_key":"k","feedback":"Good"}"#;
        let serde_err = serde_json::from_str::<SaveGradeRequest>(raw).unwrap_err();
        let payload_err = actix_web::error::JsonPayloadError::Deserialize(serde_err);

        let req = TestRequest::default().to_http_request();
        let err = engine_json_error_handler(payload_err, &req);
        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("score"));
    }

    #[actix_web::test]
    async fn engine_query_errors_keep_the_versioned_envelope() {
        // 缺 grader_id 的认领查询串
        let query_err = web::Query::<PeerClaimQuery>::from_query("location=loc-1").unwrap_err();

        let req = TestRequest::default().to_http_request();
        let err = engine_query_error_handler(query_err, &req);
        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("grader_id"));
    }

    #[actix_web::test]
    async fn internal_json_errors_stay_400_api_response() {
        let serde_err = serde_json::from_str::<SaveGradeRequest>("{}").unwrap_err();
        let payload_err = actix_web::error::JsonPayloadError::Deserialize(serde_err);

        let req = TestRequest::default().to_http_request();
        let err = json_error_handler(payload_err, &req);
        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["code"], 400);
    }
}
