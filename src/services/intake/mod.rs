pub mod submit;
pub mod validate;

pub use submit::{SubmitOutcome, process_submission};
pub use validate::validate_reply;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::services::grading::QualityCheck;
use crate::storage::Storage;

/// 提交接收服务
pub struct IntakeService {
    storage: Option<Arc<dyn Storage>>,
}

impl IntakeService {
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

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Arc<dyn ObjectCache> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
            .expect("Object cache not found in app data")
            .get_ref()
            .clone()
    }

    pub(crate) fn get_quality(&self, request: &HttpRequest) -> Arc<dyn QualityCheck> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn QualityCheck>>>()
            .expect("Quality check not found in app data")
            .get_ref()
            .clone()
    }

    // 接收 xqueue 信封
    pub async fn submit(
        &self,
        raw: crate::models::submissions::requests::SubmitRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::handle_submit(self, raw, request).await
    }
}
