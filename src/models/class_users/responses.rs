use serde::Serialize;
use ts_rs::TS;

use crate::models::{PaginationInfo, class_users::entities::ClassMember};

/// 班级成员列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class-user.ts")]
pub struct ClassMemberListResponse {
    pub items: Vec<ClassMember>,
    pub pagination: PaginationInfo,
}
