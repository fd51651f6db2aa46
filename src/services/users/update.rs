use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::requests::UpdateUserRequest};
use crate::services::{error_response, invalidate_user_cache, storage_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_message};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(ref email) = update_data.email {
        let email = email.trim().to_lowercase();
        if let Err(msg) = validate_email(&email) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::UserEmailInvalid,
                msg,
            ));
        }

        if let Ok(Some(existing)) = storage.get_user_by_email(&email).await
            && existing.id != user_id
        {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            ));
        }
        update_data.email = Some(email);
    }

    if let Some(ref password) = update_data.password {
        if let Err(msg) = validate_password_message(password) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::UserPasswordInvalid,
                msg,
            ));
        }

        match hash_password(password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                return Ok(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                ));
            }
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            // 角色或状态可能已变化，缓存中的旧用户不能再用
            invalidate_user_cache(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "User information updated successfully",
            )))
        }
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::UserNotFound,
            "User not found",
        )),
        Err(e) => Ok(storage_error("Failed to update user information", e)),
    }
}
