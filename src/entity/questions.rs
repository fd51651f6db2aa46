//! 题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub chapter_id: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub question_type: String,
    pub difficulty: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub explanation: Option<String>,
    pub created_by: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(has_many = "super::answers::Entity")]
    Answers,
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 选项由存储层单独查询后传入
    pub fn into_question(
        self,
        answers: Vec<super::answers::Model>,
    ) -> crate::models::questions::entities::Question {
        use super::ts_to_datetime;
        use crate::models::questions::entities::{Difficulty, Question, QuestionType};

        let mut answers: Vec<_> = answers.into_iter().map(|a| a.into_answer()).collect();
        answers.sort_by_key(|a| (a.order_index, a.id));

        Question {
            id: self.id,
            subject_id: self.subject_id,
            chapter_id: self.chapter_id,
            content: self.content,
            question_type: self
                .question_type
                .parse::<QuestionType>()
                .unwrap_or(QuestionType::SingleChoice),
            difficulty: self
                .difficulty
                .parse::<Difficulty>()
                .unwrap_or(Difficulty::Medium),
            explanation: self.explanation,
            created_by: self.created_by,
            is_active: self.is_active,
            answers,
            created_at: ts_to_datetime(self.created_at),
            updated_at: ts_to_datetime(self.updated_at),
        }
    }
}
