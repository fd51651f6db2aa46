use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::Utc;

use super::SystemService;
use crate::models::{
    AppStartTime, ApiResponse,
    system::responses::{SystemSettingsResponse, WebSocketStatusResponse},
};
use crate::services::websocket::ConnectionManager;

/// 运行参数与运行时长
pub async fn get_settings(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let uptime_seconds = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| (Utc::now() - start.start_datetime).num_seconds())
        .unwrap_or_default();

    let response = SystemSettingsResponse {
        system_name: config.app.system_name.clone(),
        environment: config.app.environment.clone(),
        log_level: config.app.log_level.clone(),
        exam_status_poll_interval: config.exam.status_poll_interval,
        submit_grace_period: config.exam.submit_grace_period,
        uptime_seconds,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}

/// 在线连接数和班级组数
pub async fn get_ws_status(
    _service: &SystemService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let manager = ConnectionManager::get();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        WebSocketStatusResponse {
            online_users: manager.online_count(),
            class_groups: manager.group_count(),
        },
        "WebSocket status retrieved successfully",
    )))
}
