use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::string_enum;

// 考试记录状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub enum ResultStatus {
    InProgress,    // 作答中
    Submitted,     // 学生交卷
    AutoSubmitted, // 超时由系统交卷
}

string_enum!(ResultStatus {
    InProgress => "in_progress",
    Submitted => "submitted",
    AutoSubmitted => "auto_submitted",
});

impl ResultStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, ResultStatus::InProgress)
    }
}

// 一次考试记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ExamResult {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub attempt_no: i32,
    pub status: ResultStatus,
    /// 本次作答的题目顺序
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub question_order: Vec<i64>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub deadline_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score: f64,
    pub max_score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub passed: bool,
}

// 作答记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct StudentAnswer {
    pub id: i64,
    pub result_id: i64,
    pub question_id: i64,
    pub selected_answer_ids: Vec<i64>,
    pub is_correct: bool,
    pub score: f64,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

/// 交卷时写入的单题判分
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_answer_ids: Vec<i64>,
    pub is_correct: bool,
    pub score: f64,
}

/// 交卷时写入的汇总
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGrade {
    pub score: f64,
    pub max_score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
}

/// 交卷判分函数：输入事务内读到的作答，输出汇总
pub type Grader = dyn Fn(&[StudentAnswer]) -> ResultGrade + Send + Sync;

/// 开始作答的结果
#[derive(Debug, Clone)]
pub enum AttemptStart {
    Started(ExamResult),
    /// 已有未交卷的作答
    Resumed(ExamResult),
    /// 作答次数已用完
    Exhausted,
}
