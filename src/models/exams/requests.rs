use serde::Deserialize;
use ts_rs::TS;

use super::entities::ExamStatus;
use crate::models::questions::entities::{Difficulty, QuestionType};

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct CreateExamRequest {
    pub subject_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub pass_score: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default)]
    pub shuffle_answers: bool,
    #[serde(default = "default_show_result")]
    pub show_result: bool,
}

fn default_max_attempts() -> i32 {
    1
}

fn default_show_result() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct UpdateExamRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub pass_score: Option<f64>,
    pub max_attempts: Option<i32>,
    pub shuffle_questions: Option<bool>,
    pub shuffle_answers: Option<bool>,
    pub show_result: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub subject_id: Option<i64>,
    pub status: Option<ExamStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamQuestionInput {
    pub question_id: i64,
    pub score: f64,
}

// 手动组卷：按数组顺序排列
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct SetExamQuestionsRequest {
    pub questions: Vec<ExamQuestionInput>,
}

// 随机组卷规则
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct GenerateRule {
    pub chapter_id: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
    pub count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct GenerateExamQuestionsRequest {
    pub rules: Vec<GenerateRule>,
    /// 指定随机种子时结果可复现
    #[ts(type = "number | null")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct AssignExamRequest {
    pub class_id: i64,
}

/// 列表可见范围，由服务层根据调用者角色决定
#[derive(Debug, Clone, PartialEq)]
pub enum ExamScope {
    All,
    CreatedBy(i64),
    // 学生：仅已发布且分配到这些班级的考试
    AssignedToClasses(Vec<i64>),
}
