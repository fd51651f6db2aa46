use serde::Deserialize;
use ts_rs::TS;

use super::entities::{NotificationType, ReferenceType};

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct NotificationListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub unread_only: Option<bool>,
}

/// 内部创建通知用，批量发送给多个用户
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
}
