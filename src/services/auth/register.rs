use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    auth::requests::RegisterRequest,
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::services::error_response;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_message, validate_username};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let username = register_request.username.trim().to_string();
    let email = register_request.email.trim().to_lowercase();

    if let Err(msg) = validate_username(&username) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UserNameInvalid,
            msg,
        ));
    }

    if let Err(msg) = validate_email(&email) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UserEmailInvalid,
            msg,
        ));
    }

    if let Err(msg) = validate_password_message(&register_request.password) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UserPasswordInvalid,
            msg,
        ));
    }

    if let Err(response) = ensure_unique(&storage, &username, &email).await {
        return Ok(response);
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::RegisterFailed,
                format!("密码哈希失败: {e}"),
            ));
        }
    };

    let create_request = CreateUserRequest {
        username,
        email,
        password: password_hash,
        role: UserRole::Student,
        display_name: register_request.display_name,
        avatar_url: None,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            tracing::info!("New student registered: {}", user.username);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "注册成功")))
        }
        Err(e) => Ok(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::RegisterFailed,
            format!("注册失败: {e}"),
        )),
    }
}

/// 用户名与邮箱均未被占用
pub(crate) async fn ensure_unique(
    storage: &Arc<dyn Storage>,
    username: &str,
    email: &str,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_username(username).await {
        Ok(Some(_)) => {
            return Err(error_response(
                StatusCode::CONFLICT,
                ErrorCode::UserNameAlreadyExists,
                "Username already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                format!("Register failed: {e}"),
            ));
        }
    }

    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(error_response(
            StatusCode::CONFLICT,
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        )),
        Ok(None) => Ok(()),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            format!("Register failed: {e}"),
        )),
    }
}
