use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::string_enum;
use crate::models::users::entities::UserBrief;

// 班级内角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/class-user.ts")]
pub enum ClassUserRole {
    Student, // 学生
    Teacher, // 教师（含助教）
}

string_enum!(ClassUserRole {
    Student => "student",
    Teacher => "teacher",
});

impl ClassUserRole {
    pub fn class_teacher_roles() -> &'static [&'static ClassUserRole] {
        &[&Self::Teacher]
    }
    pub fn all_roles() -> &'static [&'static ClassUserRole] {
        &[&Self::Student, &Self::Teacher]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class-user.ts")]
pub struct ClassUser {
    pub id: i64,
    pub class_id: i64,
    pub user_id: i64,
    pub role: ClassUserRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 成员列表项：班级成员关系 + 用户信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class-user.ts")]
pub struct ClassMember {
    #[serde(flatten)]
    #[ts(flatten)]
    pub membership: ClassUser,
    pub user: UserBrief,
}
