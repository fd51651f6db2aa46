pub mod count;
pub mod delete;
pub mod list;
pub mod read;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::notifications::{
    entities::Notification,
    requests::{CreateNotificationRequest, NotificationListQuery},
};
use crate::services::{error_response, storage_error, websocket::push_notifications};
use crate::storage::Storage;

super::define_service!(NotificationService);

impl NotificationService {
    pub async fn list_notifications(
        &self,
        request: &HttpRequest,
        query: NotificationListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_notifications(self, request, query).await
    }

    pub async fn get_unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        count::get_unread_count(self, request).await
    }

    pub async fn mark_as_read(
        &self,
        request: &HttpRequest,
        notification_id: i64,
    ) -> ActixResult<HttpResponse> {
        read::mark_as_read(self, request, notification_id).await
    }

    pub async fn mark_all_as_read(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        read::mark_all_as_read(self, request).await
    }

    pub async fn delete_notification(
        &self,
        request: &HttpRequest,
        notification_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_notification(self, request, notification_id).await
    }
}

/// 写入通知并推送给在线用户，失败只记录日志
pub(crate) async fn notify_users(
    storage: &Arc<dyn Storage>,
    user_ids: &[i64],
    req: CreateNotificationRequest,
) -> usize {
    if user_ids.is_empty() {
        return 0;
    }

    let notification_type = req.notification_type;
    match storage.create_notifications(user_ids, req).await {
        Ok(notifications) => {
            let count = notifications.len();
            push_notifications(notifications);
            count
        }
        Err(e) => {
            tracing::error!(
                "Failed to create {} notifications for {} users: {}",
                notification_type,
                user_ids.len(),
                e
            );
            0
        }
    }
}

// 只能操作自己的通知，不存在与不属于自己统一返回 404
async fn load_own_notification(
    storage: &Arc<dyn Storage>,
    notification_id: i64,
    user_id: i64,
) -> Result<Notification, HttpResponse> {
    match storage.get_notification_by_id(notification_id).await {
        Ok(Some(notification)) if notification.user_id == user_id => Ok(notification),
        Ok(_) => Err(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::NotificationNotFound,
            "Notification not found",
        )),
        Err(e) => Err(storage_error("Failed to get notification", e)),
    }
}
