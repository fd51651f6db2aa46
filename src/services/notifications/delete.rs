use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{NotificationService, load_own_notification};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, storage_error};

pub async fn delete_notification(
    service: &NotificationService,
    request: &HttpRequest,
    notification_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_own_notification(&storage, notification_id, user.id).await {
        return Ok(response);
    }

    match storage.delete_notification(notification_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Notification deleted successfully",
        ))),
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::NotificationNotFound,
            "Notification not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete notification", e)),
    }
}
