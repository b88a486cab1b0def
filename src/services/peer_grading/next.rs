//! 认领下一份待评提交
//!
//! 候选列表与认领之间存在竞争窗口，认领用状态 CAS 兜底：
//! 对每个候选最多一次认领尝试，第一个命中的返回给评分人。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use crate::errors::Result;
use crate::models::EngineReply;
use crate::models::grading::requests::PeerClaimQuery;
use crate::models::grading::responses::PeerSubmissionResponse;
use crate::storage::Storage;

use super::PeerGradingService;

/// 单次认领最多考察的候选数
const CLAIM_BATCH: u64 = 10;

/// 尝试为评分人认领一份提交
///
/// 每个候选走一次 CAS，输掉竞争就换下一个；整批都输掉
/// 返回 None，由评分人稍后重试。
pub async fn claim_next(
    storage: &Arc<dyn Storage>,
    location: &str,
    grader_id: &str,
) -> Result<Option<PeerSubmissionResponse>> {
    let candidates = storage
        .list_claimable_submissions(location, grader_id, CLAIM_BATCH)
        .await?;

    for candidate in candidates {
        if storage.claim_submission(candidate.id, grader_id).await? {
            return Ok(Some(PeerSubmissionResponse {
                submission_id: candidate.id,
                submission_key: candidate.xqueue_submission_key,
                student_response: candidate.student_response,
                prompt: candidate.prompt,
                rubric: candidate.rubric,
                max_score: candidate.max_score,
            }));
        }
        debug!(submission_id = candidate.id, "认领竞争失败，尝试下一候选");
    }

    Ok(None)
}

/// HTTP 入口
///
/// 无可评提交是常态而非故障，只记 debug 日志，协议层回
/// success=false。
pub async fn handle_get_next(
    service: &PeerGradingService,
    query: PeerClaimQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match claim_next(&storage, &query.location, &query.grader_id).await {
        Ok(Some(response)) => Ok(HttpResponse::Ok().json(EngineReply::success(response))),
        Ok(None) => {
            debug!(
                location = %query.location,
                grader_id = %query.grader_id,
                "当前无可认领的提交"
            );
            Ok(HttpResponse::Ok().json(EngineReply::error("No current grading.")))
        }
        Err(e) => {
            tracing::error!("认领提交失败: {e}");
            Ok(HttpResponse::Ok().json(EngineReply::error("Error getting next submission.")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::{
        GraderType, NewSubmission, SubmissionState,
    };
    use crate::storage::memory::MemoryStorage;

    fn waiting_submission(n: u32, student_id: &str) -> NewSubmission {
        NewSubmission {
            prompt: "prompt".into(),
            rubric: "rubric".into(),
            student_id: student_id.into(),
            problem_id: "p1".into(),
            location: "loc-1".into(),
            course_id: "course-1".into(),
            student_response: format!("answer {n}"),
            student_submission_time: chrono::Utc::now(),
            xqueue_submission_id: format!("{n}"),
            xqueue_submission_key: format!("key-{n}"),
            xqueue_queue_name: "open-ended".into(),
            max_score: 10,
            grader_settings: "essay_peer".into(),
            state: SubmissionState::WaitingToBeGraded,
            next_grader_type: GraderType::Peer,
        }
    }

    #[tokio::test]
    async fn claims_first_available_submission() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission(1, "student-1"))
            .await
            .unwrap();

        let claimed = claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claimed.submission_id, 1);
        assert_eq!(claimed.submission_key, "key-1");

        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::BeingGraded);
        assert_eq!(submission.claimed_by.as_deref(), Some("grader-1"));
    }

    #[tokio::test]
    async fn own_submission_is_never_offered() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission(1, "grader-1"))
            .await
            .unwrap();

        assert!(claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn empty_queue_yields_none() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        assert!(claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn stale_claim_is_released_and_reclaimable() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .get_or_create_submission(waiting_submission(1, "author"))
            .await
            .unwrap();
        claim_next(&storage, "loc-1", "grader-1")
            .await
            .unwrap()
            .unwrap();

        // 时限内的认领不受清扫影响
        assert_eq!(storage.release_stale_claims(3600).await.unwrap(), 0);
        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::BeingGraded);

        // 时限为零时刚认领的提交也算过期
        assert_eq!(storage.release_stale_claims(0).await.unwrap(), 1);
        let submission = storage.get_submission_by_id(1).await.unwrap().unwrap();
        assert_eq!(submission.state, SubmissionState::WaitingToBeGraded);
        assert!(submission.claimed_by.is_none());

        // 释放后可被其他评分人认领
        let reclaimed = claim_next(&storage, "loc-1", "grader-2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reclaimed.submission_id, 1);
    }

    #[tokio::test]
    async fn concurrent_claims_never_share_a_submission() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        for n in 1..=3u32 {
            storage
                .get_or_create_submission(waiting_submission(n, "author"))
                .await
                .unwrap();
        }

        // 5 个评分人抢 3 份提交，每份至多被认领一次
        let mut handles = Vec::new();
        for g in 0..5 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                claim_next(&storage, "loc-1", &format!("grader-{g}")).await
            }));
        }

        let mut claimed_ids = Vec::new();
        for handle in handles {
            if let Some(response) = handle.await.unwrap().unwrap() {
                claimed_ids.push(response.submission_id);
            }
        }

        claimed_ids.sort_unstable();
        let total = claimed_ids.len();
        claimed_ids.dedup();
        assert_eq!(claimed_ids.len(), total, "同一份提交被认领了两次");
        assert_eq!(total, 3, "每份提交恰好被认领一次");
    }
}
