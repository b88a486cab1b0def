//! 提交接收流水线
//!
//! 建档（幂等）→ 基础质量检查 → 路由决策。重复信封在建档处
//! 短路返回，不会重跑质量检查或产生第二条检查记录。

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::GradingConfig;
use crate::errors::Result;
use crate::models::grading::entities::{GraderStatus, NewGradeRecord};
use crate::models::submissions::entities::{GraderType, NewSubmission, SubmissionState};
use crate::models::submissions::requests::SubmissionEnvelope;
use crate::services::grading::{self, CalibrationCounters, QualityCheck};
use crate::storage::Storage;

/// 信封中 submission_time 的格式
const SUBMISSION_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// 基础检查记录的署名
const QUALITY_GATE_GRADER_ID: &str = "quality-gate";

/// 流水线结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitOutcome {
    /// 相同信封已建档过，返回已有实体，未重新处理
    Duplicate,
    /// 未通过基础检查（属于正常受理）
    Rejected,
    /// 已通过检查并完成路由
    Routed(GraderType),
}

/// 从规范化信封构造建档属性
pub fn build_new_submission(envelope: &SubmissionEnvelope) -> Result<NewSubmission> {
    let payload = &envelope.body.grader_payload;
    let info = &envelope.body.student_info;

    let submission_time =
        NaiveDateTime::parse_from_str(&info.submission_time, SUBMISSION_TIME_FORMAT)?.and_utc();

    Ok(NewSubmission {
        prompt: payload.prompt.clone(),
        rubric: payload.rubric.clone(),
        student_id: info.anonymous_student_id.clone(),
        problem_id: payload
            .problem_id
            .clone()
            .unwrap_or_else(|| payload.location.clone()),
        location: payload.location.clone(),
        course_id: payload.course_id.clone(),
        student_response: envelope.body.student_response.clone(),
        student_submission_time: submission_time,
        xqueue_submission_id: envelope.header.submission_id.clone(),
        xqueue_submission_key: envelope.header.submission_key.clone(),
        xqueue_queue_name: envelope.header.queue_name.clone(),
        max_score: envelope.body.max_score,
        grader_settings: payload.grader_settings.clone(),
        state: SubmissionState::Created,
        next_grader_type: GraderType::BasicCheck,
    })
}

/// 受理一份已通过信封校验的提交
pub async fn process_submission(
    storage: &Arc<dyn Storage>,
    quality: &dyn QualityCheck,
    grading_config: &GradingConfig,
    counters: CalibrationCounters,
    envelope: &SubmissionEnvelope,
) -> Result<SubmitOutcome> {
    // 路由策略在进入流水线前解析，坏引用不建档
    let policy = grading::policy::resolve_policy(
        grading_config,
        &envelope.body.grader_payload.grader_settings,
    )?;

    let attrs = build_new_submission(envelope)?;
    let (submission, created) = storage.get_or_create_submission(attrs).await?;

    if !created {
        info!(
            submission_id = submission.id,
            xqueue_submission_id = %submission.xqueue_submission_id,
            "重复信封，返回已有提交"
        );
        return Ok(SubmitOutcome::Duplicate);
    }

    storage
        .transition_submission_state(
            submission.id,
            SubmissionState::Created,
            SubmissionState::BasicCheckPending,
        )
        .await?;

    let check = quality.evaluate(&submission.student_response).await?;

    storage
        .create_grade_record(NewGradeRecord {
            submission_id: submission.id,
            score: check.score,
            feedback: serde_json::to_string(&check)?,
            grader_id: QUALITY_GATE_GRADER_ID.to_string(),
            grader_type: GraderType::BasicCheck,
            status: GraderStatus::Success,
            confidence: 1.0,
        })
        .await?;

    if !check.passed() {
        storage
            .transition_submission_state(
                submission.id,
                SubmissionState::BasicCheckPending,
                SubmissionState::Rejected,
            )
            .await?;
        info!(submission_id = submission.id, "提交未通过基础检查");
        return Ok(SubmitOutcome::Rejected);
    }

    let next = grading::router::route(&policy, counters);

    if !storage
        .set_submission_routing(submission.id, next, SubmissionState::WaitingToBeGraded)
        .await?
    {
        warn!(submission_id = submission.id, "路由决策未命中任何提交");
    }

    info!(
        submission_id = submission.id,
        next_grader_type = %next,
        "提交已受理并完成路由"
    );

    Ok(SubmitOutcome::Routed(next))
}

/// HTTP 入口：校验信封并走流水线，协议层始终回 200
///
/// 队列客户端只认 `{version, success, ...}` 信封，错误通过
/// success=false 传递而不是 HTTP 状态码。
pub async fn handle_submit(
    service: &super::IntakeService,
    raw: crate::models::submissions::requests::SubmitRequest,
    request: &actix_web::HttpRequest,
) -> actix_web::Result<actix_web::HttpResponse> {
    use crate::models::EngineReply;
    use crate::models::submissions::responses::SubmitAccepted;
    use actix_web::HttpResponse;

    let envelope = match super::validate::validate_reply(&raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("信封校验失败: {e}");
            return Ok(HttpResponse::Ok().json(EngineReply::error("Incorrect format")));
        }
    };

    let storage = service.get_storage(request);
    let cache = service.get_cache(request);
    let quality = service.get_quality(request);
    let grading_config = &crate::config::AppConfig::get().grading;

    let counters = match grading::calibration_counters(
        &storage,
        &cache,
        &envelope.body.grader_payload.location,
    )
    .await
    {
        Ok(counters) => counters,
        Err(e) => {
            tracing::error!("读取校准计数失败: {e}");
            return Ok(HttpResponse::Ok().json(EngineReply::error("Failed to handle submission.")));
        }
    };

    match process_submission(&storage, quality.as_ref(), grading_config, counters, &envelope).await
    {
        Ok(_) => Ok(HttpResponse::Ok().json(EngineReply::success(SubmitAccepted {
            message: "Saved successfully.".to_string(),
        }))),
        // 建档之前的失败与处理阶段的失败对客户端是两种文案
        Err(e) if matches!(e.code(), "E009" | "E013") => {
            warn!("无法建档: {e}");
            Ok(HttpResponse::Ok().json(EngineReply::error("Unable to create submission.")))
        }
        Err(e) => {
            tracing::error!("提交处理失败: {e}");
            Ok(HttpResponse::Ok().json(EngineReply::error("Failed to handle submission.")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraderPolicy;
    use crate::models::submissions::requests::SubmitRequest;
    use crate::services::grading::BasicQualityCheck;
    use crate::services::intake::validate::validate_reply;
    use crate::storage::memory::MemoryStorage;
    use serde_json::json;
    use std::collections::HashMap;

    fn envelope_with_response(response: &str) -> SubmissionEnvelope {
        let header = json!({
            "submission_id": "17",
            "submission_key": "abc123",
            "queue_name": "open-ended"
        });
        let payload = json!({
            "prompt": "Explain photosynthesis.",
            "rubric": "<rubric/>",
            "location": "i4x://org/course/problem/p1",
            "course_id": "org/course/run",
            "grader_settings": "essay_peer"
        });
        let info = json!({
            "anonymous_student_id": "student-1",
            "submission_time": "20260115093000"
        });
        let body = json!({
            "grader_payload": payload.to_string(),
            "student_response": response,
            "student_info": info.to_string(),
            "max_score": 10
        });
        validate_reply(&SubmitRequest {
            xqueue_header: header.to_string(),
            xqueue_body: body.to_string(),
        })
        .unwrap()
    }

    fn grading_config(min_to_use_peer: i64) -> GradingConfig {
        let mut policies = HashMap::new();
        policies.insert(
            "essay_peer".to_string(),
            GraderPolicy::Peer { min_to_use_peer },
        );
        GradingConfig {
            peer_grade_target: 1,
            claim_timeout: 1800,
            policies,
        }
    }

    fn no_calibration() -> CalibrationCounters {
        CalibrationCounters {
            graded_by_instructor: 0,
            pending_instructor: 0,
        }
    }

    #[tokio::test]
    async fn fresh_submission_is_routed_to_instructor_without_calibration() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let envelope = envelope_with_response("Plants convert light into chemical energy.");

        let outcome = process_submission(
            &storage,
            &BasicQualityCheck,
            &grading_config(5),
            no_calibration(),
            &envelope,
        )
        .await
        .unwrap();

        assert_eq!(outcome, SubmitOutcome::Routed(GraderType::Instructor));

        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::WaitingToBeGraded);
        assert_eq!(submission.next_grader_type, GraderType::Instructor);
        assert_eq!(submission.problem_id, "i4x://org/course/problem/p1");
    }

    #[tokio::test]
    async fn calibrated_location_routes_to_peer() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let envelope = envelope_with_response("Plants convert light into chemical energy.");
        let counters = CalibrationCounters {
            graded_by_instructor: 5,
            pending_instructor: 0,
        };

        let outcome = process_submission(
            &storage,
            &BasicQualityCheck,
            &grading_config(5),
            counters,
            &envelope,
        )
        .await
        .unwrap();

        assert_eq!(outcome, SubmitOutcome::Routed(GraderType::Peer));
    }

    #[tokio::test]
    async fn duplicate_envelope_short_circuits() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let envelope = envelope_with_response("Plants convert light into chemical energy.");
        let config = grading_config(5);

        let first = process_submission(
            &storage,
            &BasicQualityCheck,
            &config,
            no_calibration(),
            &envelope,
        )
        .await
        .unwrap();
        let second = process_submission(
            &storage,
            &BasicQualityCheck,
            &config,
            no_calibration(),
            &envelope,
        )
        .await
        .unwrap();

        assert!(matches!(first, SubmitOutcome::Routed(_)));
        assert_eq!(second, SubmitOutcome::Duplicate);
        // 重复投递不得建出第二份实体
        assert!(storage.get_submission_by_id(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_quality_check_rejects_submission() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let envelope = envelope_with_response("   ");

        let outcome = process_submission(
            &storage,
            &BasicQualityCheck,
            &grading_config(5),
            no_calibration(),
            &envelope,
        )
        .await
        .unwrap();

        assert_eq!(outcome, SubmitOutcome::Rejected);
        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::Rejected);
        // 被拒绝的提交不进入路由，next_grader_type 停留在基础检查
        assert_eq!(submission.next_grader_type, GraderType::BasicCheck);
    }

    #[tokio::test]
    async fn unknown_policy_reference_fails_before_creating_anything() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut envelope = envelope_with_response("Plants convert light into chemical energy.");
        envelope.body.grader_payload.grader_settings = "no_such_policy".to_string();

        let err = process_submission(
            &storage,
            &BasicQualityCheck,
            &grading_config(5),
            no_calibration(),
            &envelope,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "E013");
        assert!(storage.get_submission_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_submission_time_is_a_date_parse_error() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut envelope = envelope_with_response("Plants convert light into chemical energy.");
        envelope.body.student_info.submission_time = "2026-01-15".to_string();

        let err = process_submission(
            &storage,
            &BasicQualityCheck,
            &grading_config(5),
            no_calibration(),
            &envelope,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "E009");
    }
}
