use super::entities::Class;
use crate::models::common::PaginationInfo;
use crate::models::users::entities::UserBrief;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListResponse {
    pub items: Vec<Class>,
    pub pagination: PaginationInfo,
}

// 班级详情
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassDetailResponse {
    pub class: Class,
    pub teacher: Option<UserBrief>,
    pub member_count: i64,
}

// 通过邀请码查询时不返回邀请码本身以外的敏感信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassPreviewResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub teacher: Option<UserBrief>,
    pub joined: bool,
}
