use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grading::requests::{PeerClaimQuery, SaveGradeRequest};
use crate::services::PeerGradingService;
use crate::utils::{engine_json_error_handler, engine_query_error_handler};

// 懒加载的全局 PeerGradingService 实例
static PEER_GRADING_SERVICE: Lazy<PeerGradingService> = Lazy::new(PeerGradingService::new_lazy);

pub async fn get_next_submission(
    req: HttpRequest,
    query: web::Query<PeerClaimQuery>,
) -> ActixResult<HttpResponse> {
    PEER_GRADING_SERVICE
        .get_next_submission(query.into_inner(), &req)
        .await
}

pub async fn save_grade(
    req: HttpRequest,
    payload: web::Json<SaveGradeRequest>,
) -> ActixResult<HttpResponse> {
    PEER_GRADING_SERVICE
        .save_grade(payload.into_inner(), &req)
        .await
}

// 配置路由（LMS 同伴评分视图的回调入口）
pub fn configure_peer_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/peer_grading")
            // 引擎接口的反序列化错误也必须走版本化信封
            .app_data(web::JsonConfig::default().error_handler(engine_json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(engine_query_error_handler))
            .wrap(middlewares::RequireJWT)
            .route("/get_next_submission", web::get().to(get_next_submission))
            .route("/save_grade", web::post().to(save_grade)),
    );
}
