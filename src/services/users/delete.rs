use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_user_cache, storage_error};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        ));
    }

    match storage.delete_user(user_id).await {
        Ok(true) => {
            invalidate_user_cache(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::UserNotFound,
            "User not found",
        )),
        Err(e) => Ok(storage_error("User deletion failed", e)),
    }
}
