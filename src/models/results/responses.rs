use serde::Serialize;
use ts_rs::TS;

use super::entities::ExamResult;
use crate::models::common::PaginationInfo;
use crate::models::questions::entities::{Answer, QuestionType};
use crate::models::users::entities::UserBrief;

// 试卷选项，不含正确性
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct PaperAnswer {
    pub id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct PaperQuestion {
    pub question_id: i64,
    pub content: String,
    pub question_type: QuestionType,
    pub score: f64,
    pub answers: Vec<PaperAnswer>,
    pub selected_answer_ids: Vec<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ExamPaperResponse {
    pub result: ExamResult,
    pub exam_title: String,
    pub remaining_seconds: i64,
    pub questions: Vec<PaperQuestion>,
}

// 交卷后的逐题回顾
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ReviewItem {
    pub question_id: i64,
    pub content: String,
    pub question_type: QuestionType,
    pub score: f64,
    pub earned: f64,
    pub is_correct: bool,
    pub selected_answer_ids: Vec<i64>,
    pub correct_answer_ids: Vec<i64>,
    pub answers: Vec<Answer>,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultDetailResponse {
    pub result: ExamResult,
    pub exam_title: String,
    pub pass_score: f64,
    /// 考试不公开答案时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Vec<ReviewItem>>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultListItem {
    pub result: ExamResult,
    pub exam_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<UserBrief>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultListResponse {
    pub items: Vec<ResultListItem>,
    pub pagination: PaginationInfo,
}
