use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::responses::{ClassDetailResponse, ClassPreviewResponse},
    users::entities::UserBrief,
};
use crate::services::{current_user, error_response, storage_error};

/// 班级详情，成员权限由 RequireClassRole 校验
pub async fn get_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
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
        Err(e) => return Ok(storage_error("Failed to get class information", e)),
    };

    let teacher = match storage.get_user_by_id(class.teacher_id).await {
        Ok(teacher) => teacher.as_ref().map(UserBrief::from),
        Err(e) => return Ok(storage_error("Failed to get class teacher", e)),
    };

    let member_count = match storage.count_class_members(class_id).await {
        Ok(count) => count,
        Err(e) => return Ok(storage_error("Failed to count class members", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassDetailResponse {
            class,
            teacher,
            member_count,
        },
        "Class information retrieved successfully",
    )))
}

/// 通过邀请码预览班级，加入前使用
pub async fn get_class_by_code(
    service: &ClassService,
    request: &HttpRequest,
    code: String,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let class = match storage.get_class_by_code(&code).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassInviteCodeInvalid,
                "Invite code is invalid",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get class information", e)),
    };

    let teacher = match storage.get_user_by_id(class.teacher_id).await {
        Ok(teacher) => teacher.as_ref().map(UserBrief::from),
        Err(e) => return Ok(storage_error("Failed to get class teacher", e)),
    };

    let joined = match storage
        .get_class_user_by_user_id_and_class_id(user.id, class.id)
        .await
    {
        Ok(member) => member.is_some(),
        Err(e) => return Ok(storage_error("Failed to check class membership", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassPreviewResponse {
            id: class.id,
            name: class.name,
            description: class.description,
            teacher,
            joined,
        },
        "Class information retrieved successfully",
    )))
}
