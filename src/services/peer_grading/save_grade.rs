//! 保存同伴评分
//!
//! 评分记录是只追加的事实；提交是否评完由成功同伴评分的
//! 条数对照目标值决定：达标迁移到 graded，未达标释放回
//! 等待队列供下一位评分人认领。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::errors::{ControllerError, Result};
use crate::models::EngineReply;
use crate::models::grading::entities::{GraderStatus, NewGradeRecord};
use crate::models::grading::requests::SaveGradeRequest;
use crate::models::grading::responses::GradeSaved;
use crate::models::submissions::entities::{GraderType, SubmissionState};
use crate::storage::Storage;

use super::PeerGradingService;

/// 同伴评分的固定置信度
const PEER_GRADE_CONFIDENCE: f64 = 1.0;

/// 保存结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeOutcome {
    /// 达到目标条数，提交评分完成
    Completed,
    /// 未达标，已释放回等待队列
    ReturnedToQueue,
}

/// 评语连同分数包装成展示用的 HTML 片段后落库
fn render_feedback(score: i32, raw: &str) -> String {
    format!("<div class=\"feedback\"><p>Score: {score}</p><p>{raw}</p></div>")
}

/// 解析评分人提交的分数字符串
///
/// 非整数直接拒绝并回显原值，不落任何记录。
fn parse_score(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ControllerError::invalid_score(format!("无法解析的分数: {raw:?}")))
}

/// 记录一条同伴评分并推进提交状态
pub async fn record_peer_grade(
    storage: &Arc<dyn Storage>,
    peer_grade_target: u64,
    request: &SaveGradeRequest,
) -> Result<GradeOutcome> {
    let score = parse_score(&request.score)?;

    let submission = storage
        .get_submission_by_id(request.submission_id)
        .await?
        .ok_or_else(|| {
            ControllerError::not_found(format!("提交不存在: {}", request.submission_id))
        })?;

    if submission.location != request.location {
        return Err(ControllerError::validation(format!(
            "location 与提交不符: {} != {}",
            request.location, submission.location
        )));
    }

    if score < 0 || score > submission.max_score {
        return Err(ControllerError::invalid_score(format!(
            "分数超出范围 [0, {}]: {score}",
            submission.max_score
        )));
    }

    storage
        .create_grade_record(NewGradeRecord {
            submission_id: submission.id,
            score,
            feedback: render_feedback(score, &request.feedback),
            grader_id: request.grader_id.clone(),
            grader_type: GraderType::Peer,
            status: GraderStatus::Success,
            confidence: PEER_GRADE_CONFIDENCE,
        })
        .await?;

    let successful = storage.count_successful_peer_grades(submission.id).await?;

    if successful >= peer_grade_target {
        if !storage
            .transition_submission_state(
                submission.id,
                SubmissionState::BeingGraded,
                SubmissionState::Graded,
            )
            .await?
        {
            warn!(submission_id = submission.id, "完成迁移未命中，提交不在认领态");
        }
        info!(
            submission_id = submission.id,
            peer_grades = successful,
            "同伴评分达标，提交评分完成"
        );
        Ok(GradeOutcome::Completed)
    } else {
        if !storage.release_submission(submission.id).await? {
            warn!(submission_id = submission.id, "释放未命中，提交不在认领态");
        }
        info!(
            submission_id = submission.id,
            peer_grades = successful,
            target = peer_grade_target,
            "同伴评分未达标，提交释放回等待队列"
        );
        Ok(GradeOutcome::ReturnedToQueue)
    }
}

/// HTTP 入口
pub async fn handle_save_grade(
    service: &PeerGradingService,
    payload: SaveGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let target = crate::config::AppConfig::get().grading.peer_grade_target;

    match record_peer_grade(&storage, target, &payload).await {
        Ok(_) => Ok(HttpResponse::Ok().json(EngineReply::success(GradeSaved {
            msg: "Posted to queue.".to_string(),
        }))),
        Err(e) if e.code() == "E014" => {
            warn!("拒绝无效分数: {e}");
            Ok(HttpResponse::Ok().json(EngineReply::error(e.message().to_string())))
        }
        Err(e) => {
            tracing::error!("保存评分失败: {e}");
            Ok(HttpResponse::Ok().json(EngineReply::error("Could not save grade.")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::NewSubmission;
    use crate::services::peer_grading::next::claim_next;
    use crate::storage::memory::MemoryStorage;

    fn waiting_submission() -> NewSubmission {
        NewSubmission {
            prompt: "prompt".into(),
            rubric: "rubric".into(),
            student_id: "author".into(),
            problem_id: "p1".into(),
            location: "loc-1".into(),
            course_id: "course-1".into(),
            student_response: "answer".into(),
            student_submission_time: chrono::Utc::now(),
            xqueue_submission_id: "17".into(),
            xqueue_submission_key: "key".into(),
            xqueue_queue_name: "open-ended".into(),
            max_score: 10,
            grader_settings: "essay_peer".into(),
            state: SubmissionState::WaitingToBeGraded,
            next_grader_type: GraderType::Peer,
        }
    }

    fn grade_request(grader_id: &str, score: &str) -> SaveGradeRequest {
        SaveGradeRequest {
            location: "loc-1".into(),
            grader_id: grader_id.into(),
            submission_id: 1,
            submission_key: "key".into(),
            score: score.into(),
            feedback: "Good".into(),
        }
    }

    #[tokio::test]
    async fn claim_then_grade_completes_submission() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission())
            .await
            .unwrap();

        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();

        let outcome = record_peer_grade(&storage, 1, &grade_request("grader-1", "8"))
            .await
            .unwrap();
        assert_eq!(outcome, GradeOutcome::Completed);

        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::Graded);
        assert!(submission.claimed_by.is_none());
        assert_eq!(storage.count_successful_peer_grades(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn below_target_returns_to_queue_until_reached() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission())
            .await
            .unwrap();

        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();
        let outcome = record_peer_grade(&storage, 2, &grade_request("grader-1", "8"))
            .await
            .unwrap();
        assert_eq!(outcome, GradeOutcome::ReturnedToQueue);

        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::WaitingToBeGraded);

        // 第二位评分人补齐目标条数
        claim_next(&storage, "loc-1", "grader-2")
            .await
            .unwrap()
            .unwrap();
        let outcome = record_peer_grade(&storage, 2, &grade_request("grader-2", "9"))
            .await
            .unwrap();
        assert_eq!(outcome, GradeOutcome::Completed);
    }

    #[tokio::test]
    async fn non_integer_score_leaves_no_record() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission())
            .await
            .unwrap();
        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();

        let err = record_peer_grade(&storage, 1, &grade_request("grader-1", "high"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");
        assert!(err.message().contains("high"));

        assert_eq!(storage.count_successful_peer_grades(1).await.unwrap(), 0);
        // 提交仍保持认领态，评分人可以改正后重交
        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::BeingGraded);
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission())
            .await
            .unwrap();
        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();

        let err = record_peer_grade(&storage, 1, &grade_request("grader-1", "11"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");
    }

    #[tokio::test]
    async fn unknown_submission_is_not_found() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let err = record_peer_grade(&storage, 1, &grade_request("grader-1", "8"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn feedback_is_wrapped_in_html_with_score() {
        let rendered = render_feedback(8, "Good analysis");
        assert_eq!(
            rendered,
            "<div class=\"feedback\"><p>Score: 8</p><p>Good analysis</p></div>"
        );
    }

    #[tokio::test]
    async fn mismatched_location_is_rejected() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission())
            .await
            .unwrap();
        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();

        let mut request = grade_request("grader-1", "8");
        request.location = "loc-2".into();
        let err = record_peer_grade(&storage, 1, &request).await.unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn grader_is_not_offered_submission_again() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission())
            .await
            .unwrap();
        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();
        record_peer_grade(&storage, 1, &grade_request("grader-1", "8"))
            .await
            .unwrap();

        // 评完后同一评分人不会再被派发这份提交
        assert!(claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .is_none());
    }
}
