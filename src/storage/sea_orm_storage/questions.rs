//! 题库存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as Answers,
    Model as AnswerModel,
};
use crate::entity::exam_details::{Column as DetailColumn, Entity as ExamDetails};
use crate::entity::exams::{Column as ExamColumn, Entity as Exams};
use crate::entity::questions::{ActiveModel, Column, Entity as Questions, Model};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationQuery,
    exams::entities::ExamStatus,
    questions::{
        entities::Question,
        requests::{AnswerInput, CreateQuestionRequest, QuestionListQuery, UpdateQuestionRequest},
        responses::QuestionListResponse,
    },
};
use crate::utils::contains_any;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 按顺序写入选项
async fn insert_answers<C: ConnectionTrait>(
    conn: &C,
    question_id: i64,
    answers: Vec<AnswerInput>,
) -> Result<()> {
    for (index, answer) in answers.into_iter().enumerate() {
        AnswerActiveModel {
            question_id: Set(question_id),
            content: Set(answer.content),
            is_correct: Set(answer.is_correct),
            order_index: Set(index as i32),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("写入选项失败: {e}")))?;
    }
    Ok(())
}

impl SeaOrmStorage {
    /// 为题目加载选项
    async fn attach_answers(&self, models: Vec<Model>) -> Result<Vec<Question>> {
        if models.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let answers = Answers::find()
            .filter(AnswerColumn::QuestionId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询选项失败: {e}")))?;

        let mut grouped: HashMap<i64, Vec<AnswerModel>> = HashMap::new();
        for answer in answers {
            grouped.entry(answer.question_id).or_default().push(answer);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let answers = grouped.remove(&m.id).unwrap_or_default();
                m.into_question(answers)
            })
            .collect())
    }

    /// 创建题目及选项
    pub async fn create_question_impl(
        &self,
        created_by: i64,
        req: CreateQuestionRequest,
    ) -> Result<Question> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let question = ActiveModel {
            subject_id: Set(req.subject_id),
            chapter_id: Set(req.chapter_id),
            content: Set(req.content),
            question_type: Set(req.question_type.to_string()),
            difficulty: Set(req.difficulty.to_string()),
            explanation: Set(req.explanation),
            created_by: Set(created_by),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("创建题目失败: {e}")))?;

        let question_id = question.id;
        insert_answers(&txn, question_id, req.answers).await?;

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_question_by_id_impl(question_id)
            .await?
            .ok_or_else(|| ExamSystemError::not_found(format!("题目 {question_id} 不存在")))
    }

    /// 通过 ID 获取题目（含选项）
    pub async fn get_question_by_id_impl(&self, question_id: i64) -> Result<Option<Question>> {
        let model = Questions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询题目失败: {e}")))?;

        match model {
            Some(m) => Ok(self.attach_answers(vec![m]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 批量获取题目（含选项）
    pub async fn get_questions_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let models = Questions::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("批量查询题目失败: {e}")))?;

        self.attach_answers(models).await
    }

    /// 分页列出题目
    pub async fn list_questions_with_pagination_impl(
        &self,
        query: QuestionListQuery,
    ) -> Result<QuestionListResponse> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = Questions::find();

        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        if let Some(chapter_id) = query.chapter_id {
            select = select.filter(Column::ChapterId.eq(chapter_id));
        }

        if let Some(difficulty) = query.difficulty {
            select = select.filter(Column::Difficulty.eq(difficulty.to_string()));
        }

        if let Some(question_type) = query.question_type {
            select = select.filter(Column::QuestionType.eq(question_type.to_string()));
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(contains_any(&[Column::Content], search.trim()));
        }

        let select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);
        let (models, pagination) = self.fetch_page(select, page, size, "题目").await?;

        Ok(QuestionListResponse {
            items: self.attach_answers(models).await?,
            pagination,
        })
    }

    /// 科目下所有启用的题目
    pub async fn list_active_questions_impl(&self, subject_id: i64) -> Result<Vec<Question>> {
        let models = Questions::find()
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询题目池失败: {e}")))?;

        self.attach_answers(models).await
    }

    /// 更新题目，提供选项时在同一事务内整体替换
    pub async fn update_question_impl(
        &self,
        question_id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>> {
        if self.get_question_by_id_impl(question_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(question_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(chapter_id) = update.chapter_id {
            model.chapter_id = Set(Some(chapter_id));
        }

        if let Some(content) = update.content {
            model.content = Set(content);
        }

        if let Some(question_type) = update.question_type {
            model.question_type = Set(question_type.to_string());
        }

        if let Some(difficulty) = update.difficulty {
            model.difficulty = Set(difficulty.to_string());
        }

        if let Some(explanation) = update.explanation {
            model.explanation = Set(Some(explanation));
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        model
            .update(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新题目失败: {e}")))?;

        if let Some(answers) = update.answers {
            Answers::delete_many()
                .filter(AnswerColumn::QuestionId.eq(question_id))
                .exec(&txn)
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("删除旧选项失败: {e}")))?;

            insert_answers(&txn, question_id, answers).await?;
        }

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_question_by_id_impl(question_id).await
    }

    /// 删除题目，选项级联删除
    pub async fn delete_question_impl(&self, question_id: i64) -> Result<bool> {
        let result = Questions::delete_by_id(question_id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除题目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 题目是否被考试引用
    pub async fn is_question_in_exam_impl(
        &self,
        question_id: i64,
        published_only: bool,
    ) -> Result<bool> {
        let exam_ids: Vec<i64> = ExamDetails::find()
            .select_only()
            .column(DetailColumn::ExamId)
            .filter(DetailColumn::QuestionId.eq(question_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询试卷题目失败: {e}")))?;

        if exam_ids.is_empty() {
            return Ok(false);
        }
        if !published_only {
            return Ok(true);
        }

        let published = Exams::find()
            .filter(ExamColumn::Id.is_in(exam_ids))
            .filter(ExamColumn::Status.eq(ExamStatus::Published.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试状态失败: {e}")))?;

        Ok(published > 0)
    }
}
