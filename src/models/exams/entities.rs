use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::questions::entities::Question;
use crate::models::string_enum;

// 考试发布状态（持久化）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub enum ExamStatus {
    Draft,     // 草稿，可编辑
    Published, // 已发布，不可编辑
}

string_enum!(ExamStatus {
    Draft => "draft",
    Published => "published",
});

// 考试阶段，由发布状态和时间窗口计算得出
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub enum ExamPhase {
    Draft,
    Upcoming,
    Open,
    Closed,
}

string_enum!(ExamPhase {
    Draft => "draft",
    Upcoming => "upcoming",
    Open => "open",
    Closed => "closed",
});

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct Exam {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub pass_score: f64,
    pub max_attempts: i32,
    pub shuffle_questions: bool,
    pub shuffle_answers: bool,
    pub show_result: bool,
    pub status: ExamStatus,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Exam {
    pub fn is_published(&self) -> bool {
        self.status == ExamStatus::Published
    }
}

// 试卷中的一道题
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamDetail {
    pub id: i64,
    pub exam_id: i64,
    pub question_id: i64,
    pub order_index: i32,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamAssignment {
    pub id: i64,
    pub exam_id: i64,
    pub class_id: i64,
    pub assigned_by: i64,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

// 试卷题目 + 题目内容（教师视图）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamQuestion {
    pub order_index: i32,
    pub score: f64,
    pub question: Question,
}
