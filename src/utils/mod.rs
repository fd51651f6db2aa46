pub mod extractor;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeChapterIdI64, SafeClassIdI64, SafeClassUserIdI64, SafeExamIdI64, SafeInviteCode,
    SafeNotificationIdI64, SafeQuestionIdI64, SafeResultIdI64, SafeSubjectIdI64, SafeUserIdI64,
};
pub use parameter_error_handler::{json_error_handler, query_error_handler};
pub use sql::{contains_any, escape_like_pattern};
