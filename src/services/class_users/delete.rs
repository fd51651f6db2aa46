use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ClassUserService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::classes::ensure_class_teacher;
use crate::services::websocket::ConnectionManager;
use crate::services::{current_user, error_response, storage_error};

/// 移除成员：本人退出，或班级教师/管理员移除
pub async fn remove_class_member(
    service: &ClassUserService,
    request: &HttpRequest,
    class_id: i64,
    class_user_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassNotFound,
                "Class not found",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get class", e)),
    };

    let member = match storage.get_class_user_by_id(class_id, class_user_id).await {
        Ok(Some(member)) => member,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassUserNotFound,
                "Class member not found",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get class member", e)),
    };

    if member.user_id == class.teacher_id {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "The class owner cannot leave the class",
        ));
    }

    if member.user_id != user.id
        && let Err(response) = ensure_class_teacher(&storage, &class, &user).await
    {
        return Ok(response);
    }

    match storage.leave_class(member.user_id, class_id).await {
        Ok(true) => {
            ConnectionManager::get().leave_group(class_id, member.user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Class member removed successfully",
            )))
        }
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ClassUserNotFound,
            "Class member not found",
        )),
        Err(e) => Ok(storage_error("Failed to remove class member", e)),
    }
}
