use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{ClassService, load_owned_class};
use crate::models::{ApiResponse, ErrorCode, classes::requests::UpdateClassRequest};
use crate::services::{current_user, error_response, storage_error};

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    mut update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_owned_class(&storage, class_id, &user).await {
        return Ok(response);
    }

    if let Some(ref name) = update_data.name {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "Class name must be 1-100 characters",
            ));
        }
        update_data.name = Some(name.to_string());
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            class,
            "Class updated successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ClassNotFound,
            "Class not found",
        )),
        Err(e) => Ok(storage_error("Failed to update class", e)),
    }
}
