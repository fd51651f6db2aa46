use serde::Serialize;
use ts_rs::TS;

use super::entities::{Exam, ExamAssignment, ExamPhase, ExamQuestion};
use crate::models::common::PaginationInfo;

// 考试列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub exam: Exam,
    pub phase: ExamPhase,
    pub question_count: i64,
    pub total_score: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamListResponse {
    pub items: Vec<ExamSummary>,
    pub pagination: PaginationInfo,
}

// 学生看到的考试详情不含题目
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamDetailResponse {
    pub summary: ExamSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<ExamQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<ExamAssignment>>,
    /// 学生视图：已用次数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_used: Option<i64>,
}

// 分数段
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ScoreBucket {
    pub range: String,
    pub count: i64,
}

// 单题正确率
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct QuestionStat {
    pub question_id: i64,
    pub answered: i64,
    pub correct: i64,
    pub correct_rate: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/exam.ts")]
pub struct ExamStatsResponse {
    pub exam_id: i64,
    pub max_score: f64,
    pub attempt_count: i64,
    pub submitted_count: i64,
    pub student_count: i64,
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub lowest_score: Option<f64>,
    pub pass_rate: Option<f64>,
    pub score_distribution: Vec<ScoreBucket>,
    pub question_stats: Vec<QuestionStat>,
}
