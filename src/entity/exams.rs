//! 考试实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub start_time: i64,
    pub end_time: i64,
    #[sea_orm(column_type = "Double")]
    pub pass_score: f64,
    pub max_attempts: i32,
    pub shuffle_questions: bool,
    pub shuffle_answers: bool,
    pub show_result: bool,
    pub status: String,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam_details::Entity")]
    ExamDetails,
    #[sea_orm(has_many = "super::exam_assignments::Entity")]
    ExamAssignments,
    #[sea_orm(has_many = "super::results::Entity")]
    Results,
}

impl Related<super::exam_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamDetails.def()
    }
}

impl Related<super::exam_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamAssignments.def()
    }
}

impl Related<super::results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Results.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_exam(self) -> crate::models::exams::entities::Exam {
        use super::ts_to_datetime;
        use crate::models::exams::entities::{Exam, ExamStatus};

        Exam {
            id: self.id,
            subject_id: self.subject_id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            start_time: ts_to_datetime(self.start_time),
            end_time: ts_to_datetime(self.end_time),
            pass_score: self.pass_score,
            max_attempts: self.max_attempts,
            shuffle_questions: self.shuffle_questions,
            shuffle_answers: self.shuffle_answers,
            show_result: self.show_result,
            status: self.status.parse::<ExamStatus>().unwrap_or(ExamStatus::Draft),
            created_by: self.created_by,
            created_at: ts_to_datetime(self.created_at),
            updated_at: ts_to_datetime(self.updated_at),
        }
    }
}
