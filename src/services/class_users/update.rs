use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ClassUserService;
use crate::models::{ApiResponse, ErrorCode, class_users::requests::UpdateClassUserRequest};
use crate::services::{error_response, storage_error};

/// 修改成员的班级角色，调用者权限由 RequireClassRole 校验
pub async fn update_class_member(
    service: &ClassUserService,
    request: &HttpRequest,
    class_id: i64,
    class_user_id: i64,
    update_data: UpdateClassUserRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (class, member) = match tokio::try_join!(
        storage.get_class_by_id(class_id),
        storage.get_class_user_by_id(class_id, class_user_id)
    ) {
        Ok((Some(class), Some(member))) => (class, member),
        Ok((None, _)) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassNotFound,
                "Class not found",
            ));
        }
        Ok((_, None)) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassUserNotFound,
                "Class member not found",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get class member", e)),
    };

    // 负责教师的角色固定
    if member.user_id == class.teacher_id {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Cannot change the role of the class owner",
        ));
    }

    match storage
        .update_class_user(class_id, class_user_id, update_data)
        .await
    {
        Ok(Some(class_user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            class_user,
            "Class member updated successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ClassUserNotFound,
            "Class member not found",
        )),
        Err(e) => Ok(storage_error("Failed to update class member", e)),
    }
}
