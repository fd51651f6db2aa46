//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod answers;
pub mod chapters;
pub mod class_users;
pub mod classes;
pub mod exam_assignments;
pub mod exam_details;
pub mod exams;
pub mod notifications;
pub mod questions;
pub mod results;
pub mod student_answers;
pub mod subjects;
pub mod users;

use chrono::{DateTime, Utc};

/// 秒级时间戳转 UTC 时间
pub(crate) fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

/// 解析以 JSON 文本存储的 ID 列表
pub(crate) fn parse_id_list(raw: &str) -> Vec<i64> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub(crate) fn encode_id_list(ids: &[i64]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}
