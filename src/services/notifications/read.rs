use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{NotificationService, load_own_notification};
use crate::models::ApiResponse;
use crate::models::notifications::responses::MarkAllReadResponse;
use crate::services::{current_user, storage_error};

pub async fn mark_as_read(
    service: &NotificationService,
    request: &HttpRequest,
    notification_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let notification = match load_own_notification(&storage, notification_id, user.id).await {
        Ok(notification) => notification,
        Err(response) => return Ok(response),
    };

    if notification.is_read {
        return Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Notification already read",
        )));
    }

    match storage.mark_notification_read(notification_id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Notification marked as read",
        ))),
        Err(e) => Ok(storage_error("Failed to mark notification as read", e)),
    }
}

pub async fn mark_all_as_read(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    match storage.mark_all_notifications_read(user.id).await {
        Ok(marked_count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkAllReadResponse { marked_count },
            "All notifications marked as read",
        ))),
        Err(e) => Ok(storage_error("Failed to mark notifications as read", e)),
    }
}
