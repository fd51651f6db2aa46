use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ClassUserService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, storage_error};

pub async fn get_class_member(
    service: &ClassUserService,
    request: &HttpRequest,
    class_id: i64,
    class_user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_class_user_by_id(class_id, class_user_id).await {
        Ok(Some(class_user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            class_user,
            "Class member retrieved successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ClassUserNotFound,
            "Class member not found",
        )),
        Err(e) => Ok(storage_error("Failed to get class member", e)),
    }
}
