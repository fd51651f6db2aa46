//! 考试、试卷题目与考试分配存储操作

use std::collections::BTreeMap;

use super::SeaOrmStorage;
use crate::entity::exam_assignments::{
    ActiveModel as AssignmentActiveModel, Column as AssignmentColumn, Entity as ExamAssignments,
};
use crate::entity::exam_details::{
    ActiveModel as DetailActiveModel, Column as DetailColumn, Entity as ExamDetails,
};
use crate::entity::exams::{ActiveModel, Column, Entity as Exams};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, PaginationQuery,
    exams::{
        entities::{Exam, ExamAssignment, ExamDetail, ExamStatus},
        requests::{CreateExamRequest, ExamListQuery, ExamScope, UpdateExamRequest},
    },
};
use crate::utils::contains_any;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建考试（草稿）
    pub async fn create_exam_impl(&self, created_by: i64, req: CreateExamRequest) -> Result<Exam> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            subject_id: Set(req.subject_id),
            title: Set(req.title),
            description: Set(req.description),
            duration_minutes: Set(req.duration_minutes),
            start_time: Set(req.start_time.timestamp()),
            end_time: Set(req.end_time.timestamp()),
            pass_score: Set(req.pass_score),
            max_attempts: Set(req.max_attempts),
            shuffle_questions: Set(req.shuffle_questions),
            shuffle_answers: Set(req.shuffle_answers),
            show_result: Set(req.show_result),
            status: Set(ExamStatus::Draft.to_string()),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("创建考试失败: {e}")))?;

        Ok(result.into_exam())
    }

    pub async fn get_exam_by_id_impl(&self, exam_id: i64) -> Result<Option<Exam>> {
        let result = Exams::find_by_id(exam_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试失败: {e}")))?;

        Ok(result.map(|m| m.into_exam()))
    }

    /// 分页列出考试
    pub async fn list_exams_with_pagination_impl(
        &self,
        query: ExamListQuery,
        scope: ExamScope,
    ) -> Result<PaginatedResponse<Exam>> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = Exams::find();

        match scope {
            ExamScope::All => {}
            ExamScope::CreatedBy(user_id) => {
                select = select.filter(Column::CreatedBy.eq(user_id));
            }
            ExamScope::AssignedToClasses(class_ids) => {
                let exam_ids = self.list_assigned_exam_ids(&class_ids).await?;
                if exam_ids.is_empty() {
                    return Ok(PaginatedResponse::new(
                        vec![],
                        PaginationInfo::new(page, size, 0),
                    ));
                }
                select = select
                    .filter(Column::Id.is_in(exam_ids))
                    .filter(Column::Status.eq(ExamStatus::Published.to_string()));
            }
        }

        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(contains_any(&[Column::Title], search.trim()));
        }

        let select = select.order_by_desc(Column::StartTime).order_by_desc(Column::Id);
        let (exams, pagination) = self.fetch_page(select, page, size, "考试").await?;

        Ok(PaginatedResponse::new(
            exams.into_iter().map(|m| m.into_exam()).collect(),
            pagination,
        ))
    }

    /// 分配到给定班级的考试 ID
    async fn list_assigned_exam_ids(&self, class_ids: &[i64]) -> Result<Vec<i64>> {
        if class_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut ids: Vec<i64> = ExamAssignments::find()
            .select_only()
            .column(AssignmentColumn::ExamId)
            .filter(AssignmentColumn::ClassId.is_in(class_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试分配失败: {e}")))?;

        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// 更新考试
    pub async fn update_exam_impl(
        &self,
        exam_id: i64,
        update: UpdateExamRequest,
    ) -> Result<Option<Exam>> {
        if self.get_exam_by_id_impl(exam_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(exam_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(duration) = update.duration_minutes {
            model.duration_minutes = Set(duration);
        }
        if let Some(start_time) = update.start_time {
            model.start_time = Set(start_time.timestamp());
        }
        if let Some(end_time) = update.end_time {
            model.end_time = Set(end_time.timestamp());
        }
        if let Some(pass_score) = update.pass_score {
            model.pass_score = Set(pass_score);
        }
        if let Some(max_attempts) = update.max_attempts {
            model.max_attempts = Set(max_attempts);
        }
        if let Some(shuffle) = update.shuffle_questions {
            model.shuffle_questions = Set(shuffle);
        }
        if let Some(shuffle) = update.shuffle_answers {
            model.shuffle_answers = Set(shuffle);
        }
        if let Some(show_result) = update.show_result {
            model.show_result = Set(show_result);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新考试失败: {e}")))?;

        Ok(Some(result.into_exam()))
    }

    /// 修改发布状态
    pub async fn set_exam_status_impl(&self, exam_id: i64, status: ExamStatus) -> Result<bool> {
        let result = Exams::update_many()
            .col_expr(Column::Status, sea_orm::sea_query::Expr::value(status.to_string()))
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(exam_id))
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新考试状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除考试，试卷题目与分配级联删除
    pub async fn delete_exam_impl(&self, exam_id: i64) -> Result<bool> {
        let result = Exams::delete_by_id(exam_id)
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("删除考试失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 整体替换试卷题目
    pub async fn replace_exam_details_impl(
        &self,
        exam_id: i64,
        questions: Vec<(i64, f64)>,
    ) -> Result<Vec<ExamDetail>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("开启事务失败: {e}")))?;

        ExamDetails::delete_many()
            .filter(DetailColumn::ExamId.eq(exam_id))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("清空试卷题目失败: {e}")))?;

        let mut details = Vec::with_capacity(questions.len());
        for (index, (question_id, score)) in questions.into_iter().enumerate() {
            let detail = DetailActiveModel {
                exam_id: Set(exam_id),
                question_id: Set(question_id),
                order_index: Set(index as i32),
                score: Set(score),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("写入试卷题目失败: {e}")))?;
            details.push(detail.into_exam_detail());
        }

        txn.commit()
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(details)
    }

    /// 列出若干考试的题目，按考试与题序排列
    pub async fn list_exam_details_impl(&self, exam_ids: &[i64]) -> Result<Vec<ExamDetail>> {
        if exam_ids.is_empty() {
            return Ok(vec![]);
        }

        let result = ExamDetails::find()
            .filter(DetailColumn::ExamId.is_in(exam_ids.iter().copied()))
            .order_by_asc(DetailColumn::ExamId)
            .order_by_asc(DetailColumn::OrderIndex)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询试卷题目失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_exam_detail()).collect())
    }

    pub async fn create_exam_assignment_impl(
        &self,
        exam_id: i64,
        class_id: i64,
        assigned_by: i64,
    ) -> Result<ExamAssignment> {
        let model = AssignmentActiveModel {
            exam_id: Set(exam_id),
            class_id: Set(class_id),
            assigned_by: Set(assigned_by),
            assigned_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("分配考试失败: {e}")))?;

        Ok(result.into_assignment())
    }

    pub async fn delete_exam_assignment_impl(&self, exam_id: i64, class_id: i64) -> Result<bool> {
        let result = ExamAssignments::delete_many()
            .filter(AssignmentColumn::ExamId.eq(exam_id))
            .filter(AssignmentColumn::ClassId.eq(class_id))
            .exec(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("取消考试分配失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_exam_assignments_impl(&self, exam_id: i64) -> Result<Vec<ExamAssignment>> {
        let result = ExamAssignments::find()
            .filter(AssignmentColumn::ExamId.eq(exam_id))
            .order_by_asc(AssignmentColumn::AssignedAt)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试分配失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 已发布且有分配的考试
    pub async fn list_assigned_published_exams_impl(
        &self,
    ) -> Result<Vec<(Exam, Vec<ExamAssignment>)>> {
        let assignments = ExamAssignments::find()
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试分配失败: {e}")))?;

        let mut grouped: BTreeMap<i64, Vec<ExamAssignment>> = BTreeMap::new();
        for assignment in assignments {
            grouped
                .entry(assignment.exam_id)
                .or_default()
                .push(assignment.into_assignment());
        }

        if grouped.is_empty() {
            return Ok(vec![]);
        }

        let exams = Exams::find()
            .filter(Column::Id.is_in(grouped.keys().copied()))
            .filter(Column::Status.eq(ExamStatus::Published.to_string()))
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询已发布考试失败: {e}")))?;

        Ok(exams
            .into_iter()
            .map(|m| {
                let assignments = grouped.remove(&m.id).unwrap_or_default();
                (m.into_exam(), assignments)
            })
            .collect())
    }

    pub async fn is_exam_assigned_to_classes_impl(
        &self,
        exam_id: i64,
        class_ids: &[i64],
    ) -> Result<bool> {
        if class_ids.is_empty() {
            return Ok(false);
        }

        let count = ExamAssignments::find()
            .filter(AssignmentColumn::ExamId.eq(exam_id))
            .filter(AssignmentColumn::ClassId.is_in(class_ids.iter().copied()))
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询考试分配失败: {e}")))?;

        Ok(count > 0)
    }
}
