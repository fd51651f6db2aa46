//! 业务数据模型
//!
//! 与 `entity` 模块中的数据库实体分离，所有对外的请求/响应结构都在这里定义。

/// 为以 snake_case 字符串存储的枚举生成 `as_str` / `Display` / `FromStr`
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {s}", stringify!($name))),
                }
            }
        }
    };
}

pub(crate) use string_enum;

pub mod auth;
pub mod class_users;
pub mod classes;
pub mod common;
pub mod exams;
pub mod notifications;
pub mod questions;
pub mod results;
pub mod subjects;
pub mod system;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码，写入响应体的 `code` 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotActive = 2002,

    // 用户
    UserNotFound = 2100,
    UserNameInvalid = 2102,
    UserEmailInvalid = 2103,
    UserPasswordInvalid = 2104,
    UserNameAlreadyExists = 2105,
    UserEmailAlreadyExists = 2106,
    CanNotDeleteCurrentUser = 2107,

    // 班级
    ClassNotFound = 3000,
    ClassPermissionDenied = 3001,
    ClassInviteCodeInvalid = 3002,
    ClassAlreadyJoined = 3003,
    ClassUserNotFound = 3004,

    // 题库
    SubjectNotFound = 4000,
    SubjectCodeAlreadyExists = 4001,
    SubjectInUse = 4002,
    ChapterNotFound = 4003,
    QuestionNotFound = 4100,
    QuestionInvalid = 4101,
    QuestionInUse = 4102,

    // 考试
    ExamNotFound = 5000,
    ExamInvalid = 5001,
    ExamNotEditable = 5002,
    ExamNotPublished = 5003,
    ExamNotOpen = 5004,
    ExamNotAssigned = 5005,
    ExamAttemptsExhausted = 5006,
    ExamAlreadyAssigned = 5007,
    ExamQuestionPoolInsufficient = 5008,
    ExamHasResults = 5009,

    // 考试记录
    ResultNotFound = 5100,
    ResultAlreadySubmitted = 5101,
    ResultTimeExpired = 5102,
    AnswerInvalid = 5103,

    // 通知
    NotificationNotFound = 6000,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::ExamNotOpen as i32, 5004);
        assert_eq!(ErrorCode::ResultTimeExpired as i32, 5102);
    }
}
