use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::cache::ObjectCache;
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

/// 处理登出
///
/// 令牌本身到期前仍然有效（JWT 无法撤销），这里只清掉缓存里的
/// 用户条目，让中间件下次回源数据库。
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(token) = JwtUtils::extract_token_from_request(request) {
        if let Some(cache) = request.app_data::<actix_web::web::Data<std::sync::Arc<dyn ObjectCache>>>()
        {
            cache.remove(&format!("user:{token}")).await;
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Goodbye")))
}
