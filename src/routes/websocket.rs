use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::Deserialize;

use crate::services::websocket::WebSocketService;

#[derive(Debug, Deserialize)]
pub struct WsConnectQuery {
    pub token: String,
}

pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<WsConnectQuery>,
) -> ActixResult<HttpResponse> {
    WebSocketService::upgrade(&req, body, &query.token).await
}

// 握手使用查询参数认证，不经过 RequireJWT
pub fn configure_websocket_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/ws", web::get().to(connect));
}
