use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::error;

use super::ClassUserService;
use crate::models::{
    ApiResponse, ErrorCode,
    class_users::{entities::ClassUserRole, requests::JoinClassRequest},
};
use crate::services::websocket::ConnectionManager;
use crate::services::{current_user, error_response, storage_error};

pub async fn join_class(
    service: &ClassUserService,
    request: &HttpRequest,
    class_id: i64,
    join_data: JoinClassRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    // 班级与邀请码必须同时匹配
    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) if class.invite_code == join_data.invite_code.trim() => class,
        Ok(_) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassInviteCodeInvalid,
                "Class not found or invite code is invalid",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get class", e)),
    };

    match storage
        .get_class_user_by_user_id_and_class_id(user.id, class.id)
        .await
    {
        Ok(Some(_)) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::ClassAlreadyJoined,
                "User has already joined the class",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(storage_error("Failed to check class membership", e)),
    }

    match storage
        .join_class(user.id, class.id, ClassUserRole::Student)
        .await
    {
        Ok(class_user) => {
            // 已在线的连接立即加入班级分组
            ConnectionManager::get().join_group(class.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                class_user,
                "Class joined successfully",
            )))
        }
        Err(e) => {
            error!("Error joining class: {}", e);
            Ok(storage_error("Failed to join class", e))
        }
    }
}
