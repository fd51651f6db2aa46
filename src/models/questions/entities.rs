use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::string_enum;

// 题型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub enum QuestionType {
    SingleChoice,   // 单选
    MultipleChoice, // 多选
    TrueFalse,      // 判断
}

string_enum!(QuestionType {
    SingleChoice => "single_choice",
    MultipleChoice => "multiple_choice",
    TrueFalse => "true_false",
});

impl QuestionType {
    /// 作答时最多只能选一个选项
    pub fn is_single_select(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::TrueFalse)
    }
}

// 难度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

string_enum!(Difficulty {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

// 选项
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
    pub is_correct: bool,
    pub order_index: i32,
}

// 题目（含选项）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct Question {
    pub id: i64,
    pub subject_id: i64,
    pub chapter_id: Option<i64>,
    pub content: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
    pub created_by: i64,
    pub is_active: bool,
    pub answers: Vec<Answer>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    pub fn correct_answer_ids(&self) -> Vec<i64> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.id)
            .collect()
    }
}
