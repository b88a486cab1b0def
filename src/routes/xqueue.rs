use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::submissions::requests::SubmitRequest;
use crate::services::IntakeService;
use crate::utils::engine_json_error_handler;

// 懒加载的全局 IntakeService 实例
static INTAKE_SERVICE: Lazy<IntakeService> = Lazy::new(IntakeService::new_lazy);

pub async fn submit(
    req: HttpRequest,
    envelope: web::Json<SubmitRequest>,
) -> ActixResult<HttpResponse> {
    INTAKE_SERVICE.submit(envelope.into_inner(), &req).await
}

// 配置路由（xqueue 拉取脚本的回调入口）
pub fn configure_xqueue_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/grading_controller")
            // 引擎接口的反序列化错误也必须走版本化信封
            .app_data(web::JsonConfig::default().error_handler(engine_json_error_handler))
            .wrap(middlewares::RequireJWT)
            .route("/submit", web::post().to(submit)),
    );
}
