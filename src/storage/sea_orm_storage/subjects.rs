//! 科目与章节存储操作

use super::SeaOrmStorage;
use crate::entity::chapters::{
    ActiveModel as ChapterActiveModel, Column as ChapterColumn, Entity as Chapters,
};
use crate::entity::exams::{Column as ExamColumn, Entity as Exams};
use crate::entity::questions::{Column as QuestionColumn, Entity as Questions};
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginationQuery,
    subjects::{
        entities::{Chapter, Subject},
        requests::{
            CreateChapterRequest, CreateSubjectRequest, SubjectListQuery, UpdateChapterRequest,
            UpdateSubjectRequest,
        },
        responses::SubjectListResponse,
    },
};
use crate::utils::contains_any;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建科目
    pub async fn create_subject_impl(
        &self,
        created_by: i64,
        req: CreateSubjectRequest,
    ) -> Result<Subject> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            code: Set(req.code),
            name: Set(req.name),
            description: Set(req.description),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("创建科目失败: {e}")))?;

        Ok(result.into_subject())
    }

    pub async fn get_subject_by_id_impl(&self, subject_id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(subject_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询科目失败: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    pub async fn get_subject_by_code_impl(&self, code: &str) -> Result<Option<Subject>> {
        let result = Subjects::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询科目失败: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    /// 分页列出科目
    pub async fn list_subjects_with_pagination_impl(
        &self,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = Subjects::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(contains_any(&[Column::Code, Column::Name], search.trim()));
        }

        let select = select.order_by_asc(Column::Code);
        let (subjects, pagination) = self.fetch_page(select, page, size, "科目").await?;

        Ok(SubjectListResponse {
            items: subjects.into_iter().map(|m| m.into_subject()).collect(),
            pagination,
        })
    }

    /// 更新科目
    pub async fn update_subject_impl(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        if self.get_subject_by_id_impl(subject_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(subject_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(code) = update.code {
            model.code = Set(code);
        }

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新科目失败: {e}")))?;

        Ok(Some(result.into_subject()))
    }

    /// 删除科目，章节级联删除
    pub async fn delete_subject_impl(&self, subject_id: i64) -> Result<bool> {
        let result = Subjects::delete_by_id(subject_id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除科目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 科目是否仍被题目或考试引用
    pub async fn is_subject_in_use_impl(&self, subject_id: i64) -> Result<bool> {
        if self.count_questions_by_subject_impl(subject_id).await? > 0 {
            return Ok(true);
        }

        let exams = Exams::find()
            .filter(ExamColumn::SubjectId.eq(subject_id))
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询科目考试失败: {e}")))?;

        Ok(exams > 0)
    }

    pub async fn count_questions_by_subject_impl(&self, subject_id: i64) -> Result<i64> {
        let count = Questions::find()
            .filter(QuestionColumn::SubjectId.eq(subject_id))
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("统计科目题目失败: {e}")))?;

        Ok(count as i64)
    }

    /// 创建章节，未指定顺序时排在最后
    pub async fn create_chapter_impl(
        &self,
        subject_id: i64,
        req: CreateChapterRequest,
    ) -> Result<Chapter> {
        let now = chrono::Utc::now().timestamp();

        let order_index = match req.order_index {
            Some(index) => index,
            None => {
                let last = Chapters::find()
                    .filter(ChapterColumn::SubjectId.eq(subject_id))
                    .order_by_desc(ChapterColumn::OrderIndex)
                    .one(&self.db)
                    .await
                    .map_err(|e| {
                        ExamSystemError::database_operation(format!("查询章节失败: {e}"))
                    })?;
                last.map(|c| c.order_index + 1).unwrap_or(0)
            }
        };

        let model = ChapterActiveModel {
            subject_id: Set(subject_id),
            name: Set(req.name),
            description: Set(req.description),
            order_index: Set(order_index),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("创建章节失败: {e}")))?;

        Ok(result.into_chapter())
    }

    pub async fn get_chapter_by_id_impl(&self, chapter_id: i64) -> Result<Option<Chapter>> {
        let result = Chapters::find_by_id(chapter_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询章节失败: {e}")))?;

        Ok(result.map(|m| m.into_chapter()))
    }

    /// 按顺序列出科目下的章节
    pub async fn list_chapters_impl(&self, subject_id: i64) -> Result<Vec<Chapter>> {
        let result = Chapters::find()
            .filter(ChapterColumn::SubjectId.eq(subject_id))
            .order_by_asc(ChapterColumn::OrderIndex)
            .order_by_asc(ChapterColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询章节列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_chapter()).collect())
    }

    pub async fn update_chapter_impl(
        &self,
        chapter_id: i64,
        update: UpdateChapterRequest,
    ) -> Result<Option<Chapter>> {
        if self.get_chapter_by_id_impl(chapter_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ChapterActiveModel {
            id: Set(chapter_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(order_index) = update.order_index {
            model.order_index = Set(order_index);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新章节失败: {e}")))?;

        Ok(Some(result.into_chapter()))
    }

    /// 删除章节，题目的 chapter_id 置空
    pub async fn delete_chapter_impl(&self, chapter_id: i64) -> Result<bool> {
        let result = Chapters::delete_by_id(chapter_id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除章节失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
