use serde::Deserialize;
use ts_rs::TS;

use super::entities::{Difficulty, QuestionType};

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct AnswerInput {
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct CreateQuestionRequest {
    pub subject_id: i64,
    pub chapter_id: Option<i64>,
    pub content: String,
    pub question_type: QuestionType,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
    pub answers: Vec<AnswerInput>,
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

/// 提供 `answers` 时整体替换原有选项
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct UpdateQuestionRequest {
    pub chapter_id: Option<i64>,
    pub content: Option<String>,
    pub question_type: Option<QuestionType>,
    pub difficulty: Option<Difficulty>,
    pub explanation: Option<String>,
    pub is_active: Option<bool>,
    pub answers: Option<Vec<AnswerInput>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct QuestionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub subject_id: Option<i64>,
    pub chapter_id: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}
