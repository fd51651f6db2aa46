//! 考试记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub attempt_no: i32,
    pub status: String,
    // JSON 数组
    #[sea_orm(column_type = "Text")]
    pub question_order: String,
    pub started_at: i64,
    pub deadline_at: i64,
    pub submitted_at: Option<i64>,
    #[sea_orm(column_type = "Double")]
    pub score: f64,
    #[sea_orm(column_type = "Double")]
    pub max_score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub passed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::student_answers::Entity")]
    StudentAnswers,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::student_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAnswers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_result(self) -> crate::models::results::entities::ExamResult {
        use super::{parse_id_list, ts_to_datetime};
        use crate::models::results::entities::{ExamResult, ResultStatus};

        ExamResult {
            id: self.id,
            exam_id: self.exam_id,
            student_id: self.student_id,
            attempt_no: self.attempt_no,
            status: self
                .status
                .parse::<ResultStatus>()
                .unwrap_or(ResultStatus::InProgress),
            question_order: parse_id_list(&self.question_order),
            started_at: ts_to_datetime(self.started_at),
            deadline_at: ts_to_datetime(self.deadline_at),
            submitted_at: self.submitted_at.map(ts_to_datetime),
            score: self.score,
            max_score: self.max_score,
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            passed: self.passed,
        }
    }
}
