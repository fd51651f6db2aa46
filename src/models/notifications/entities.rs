use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::string_enum;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum NotificationType {
    ExamAssigned, // 考试已分配到班级
    ExamOpened,   // 考试开始
    ExamClosed,   // 考试结束
    ResultReady,  // 成绩已出
    System,
}

string_enum!(NotificationType {
    ExamAssigned => "exam_assigned",
    ExamOpened => "exam_opened",
    ExamClosed => "exam_closed",
    ResultReady => "result_ready",
    System => "system",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum ReferenceType {
    Exam,
    Result,
    Class,
}

string_enum!(ReferenceType {
    Exam => "exam",
    Result => "result",
    Class => "class",
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
