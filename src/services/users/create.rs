use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::requests::CreateUserRequest};
use crate::services::auth::register::ensure_unique;
use crate::services::{error_response, storage_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_message, validate_username};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_lowercase();

    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UserNameInvalid,
            msg,
        ));
    }

    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UserEmailInvalid,
            msg,
        ));
    }

    if let Err(msg) = validate_password_message(&user_data.password) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::UserPasswordInvalid,
            msg,
        ));
    }

    if let Err(response) = ensure_unique(&storage, &user_data.username, &user_data.email).await {
        return Ok(response);
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                format!("Password hashing failed: {e}"),
            ));
        }
    };

    match storage.create_user(user_data).await {
        Ok(user) => {
            tracing::info!("User {} created with role {}", user.username, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "User created successfully")))
        }
        Err(e) => Ok(storage_error("User creation failed", e)),
    }
}
