//! 作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub result_id: i64,
    pub question_id: i64,
    // JSON 数组
    #[sea_orm(column_type = "Text")]
    pub selected_answer_ids: String,
    pub is_correct: bool,
    #[sea_orm(column_type = "Double")]
    pub score: f64,
    pub answered_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::results::Entity",
        from = "Column::ResultId",
        to = "super::results::Column::Id"
    )]
    Result,
}

impl Related<super::results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Result.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student_answer(self) -> crate::models::results::entities::StudentAnswer {
        use super::{parse_id_list, ts_to_datetime};

        crate::models::results::entities::StudentAnswer {
            id: self.id,
            result_id: self.result_id,
            question_id: self.question_id,
            selected_answer_ids: parse_id_list(&self.selected_answer_ids),
            is_correct: self.is_correct,
            score: self.score,
            answered_at: ts_to_datetime(self.answered_at),
        }
    }
}
