use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::auth::responses::UserInfoResponse;
use crate::models::users::requests::UpdateUserRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, invalidate_user_cache, storage_error};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{validate_email, validate_password_message};

use super::AuthService;

pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let current_user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    // 邮箱唯一性
    let email = update_data.email.map(|e| e.trim().to_lowercase());
    if let Some(ref email) = email {
        if let Err(msg) = validate_email(email) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::UserEmailInvalid,
                msg,
            ));
        }

        if let Ok(Some(existing_user)) = storage.get_user_by_email(email).await
            && existing_user.id != current_user.id
        {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::UserEmailAlreadyExists,
                "该邮箱已被使用",
            ));
        }
    }

    // 修改密码需要验证当前密码
    let hashed_password = match update_data.new_password {
        Some(ref new_password) => {
            let current_ok = update_data
                .current_password
                .as_deref()
                .is_some_and(|p| verify_password(p, &current_user.password_hash));
            if !current_ok {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::UserPasswordInvalid,
                    "当前密码错误",
                ));
            }

            if let Err(msg) = validate_password_message(new_password) {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::UserPasswordInvalid,
                    msg,
                ));
            }

            match hash_password(new_password) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    return Ok(error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        format!("密码哈希失败: {e}"),
                    ));
                }
            }
        }
        None => None,
    };

    // 不包含 role 和 status
    let storage_update = UpdateUserRequest {
        email,
        password: hashed_password,
        role: None,
        status: None,
        display_name: update_data.display_name,
        avatar_url: update_data.avatar_url,
    };

    match storage.update_user(current_user.id, storage_update).await {
        Ok(Some(user)) => {
            invalidate_user_cache(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserInfoResponse { user },
                "用户信息更新成功",
            )))
        }
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::UserNotFound,
            "用户不存在",
        )),
        Err(e) => Ok(storage_error("更新用户信息失败", e)),
    }
}
