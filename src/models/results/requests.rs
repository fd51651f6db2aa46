use serde::Deserialize;
use ts_rs::TS;

use super::entities::ResultStatus;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct SaveAnswerRequest {
    pub question_id: i64,
    /// 空数组表示清空作答
    pub selected_answer_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub exam_id: Option<i64>,
    pub student_id: Option<i64>,
    pub status: Option<ResultStatus>,
}

/// 开始考试时写入的新记录，作答序号由存储层在事务内分配
#[derive(Debug, Clone)]
pub struct NewResult {
    pub exam_id: i64,
    pub student_id: i64,
    pub question_order: Vec<i64>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub deadline_at: chrono::DateTime<chrono::Utc>,
    pub max_score: f64,
    pub total_questions: i32,
}
