pub mod next;
pub mod save_grade;

pub use next::claim_next;
pub use save_grade::{GradeOutcome, record_peer_grade};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

/// 同伴评分服务
pub struct PeerGradingService {
    storage: Option<Arc<dyn Storage>>,
}

impl PeerGradingService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 认领下一份待评提交
    pub async fn get_next_submission(
        &self,
        query: crate::models::grading::requests::PeerClaimQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        next::handle_get_next(self, query, request).await
    }

    // 保存同伴评分
    pub async fn save_grade(
        &self,
        payload: crate::models::grading::requests::SaveGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        save_grade::handle_save_grade(self, payload, request).await
    }
}
