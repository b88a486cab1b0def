use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::json;

use crate::config::AppConfig;
use crate::models::{ApiResponse, AppStartTime};

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    // 状态探针
    pub async fn status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let config = AppConfig::get();

        let uptime_seconds = request
            .app_data::<actix_web::web::Data<AppStartTime>>()
            .map(|start| (chrono::Utc::now() - start.start_datetime).num_seconds())
            .unwrap_or(0);

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            json!({
                "status": "OK",
                "system_name": config.app.system_name,
                "environment": config.app.environment,
                "version": env!("CARGO_PKG_VERSION"),
                "uptime_seconds": uptime_seconds,
            }),
            "Service is healthy",
        )))
    }
}
