//! 考试记录与作答存储操作

use super::SeaOrmStorage;
use crate::entity::encode_id_list;
use crate::entity::results::{ActiveModel, Column, Entity as Results};
use crate::entity::student_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as StudentAnswers,
};
use crate::errors::{ExamSystemError, Result};
use crate::models::{
    PaginatedResponse, PaginationQuery,
    results::{
        entities::{AttemptStart, ExamResult, Grader, ResultStatus, StudentAnswer},
        requests::{NewResult, ResultListQuery},
    },
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

/// 同一学生同一场考试中未交卷的记录
async fn in_progress_result<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    student_id: i64,
) -> Result<Option<ExamResult>> {
    let result = Results::find()
        .filter(Column::ExamId.eq(exam_id))
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::Status.eq(ResultStatus::InProgress.to_string()))
        .order_by_desc(Column::AttemptNo)
        .one(conn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("查询作答记录失败: {e}")))?;

    Ok(result.map(|m| m.into_result()))
}

async fn count_attempts_in<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    student_id: i64,
) -> Result<u64> {
    Results::find()
        .filter(Column::ExamId.eq(exam_id))
        .filter(Column::StudentId.eq(student_id))
        .count(conn)
        .await
        .map_err(|e| ExamSystemError::database_operation(format!("统计作答次数失败: {e}")))
}

fn begin_failed(e: DbErr) -> ExamSystemError {
    ExamSystemError::database_operation(format!("开启事务失败: {e}"))
}

fn commit_failed(e: DbErr) -> ExamSystemError {
    ExamSystemError::database_operation(format!("提交事务失败: {e}"))
}

/// 并发开始时最多重试的次数
const START_RETRIES: usize = 3;

impl SeaOrmStorage {
    /// 开始作答：查重、计数与写入在同一事务内完成
    ///
    /// `(exam_id, student_id, attempt_no)` 唯一；并发写入撞上唯一约束时重新走一遍，
    /// 此时会读到对方刚创建的作答并返回 `Resumed`。
    pub async fn start_result_impl(
        &self,
        result: NewResult,
        max_attempts: i32,
    ) -> Result<AttemptStart> {
        for _ in 0..START_RETRIES {
            let txn = self.db.begin().await.map_err(begin_failed)?;

            if let Some(existing) =
                in_progress_result(&txn, result.exam_id, result.student_id).await?
            {
                txn.commit().await.map_err(commit_failed)?;
                return Ok(AttemptStart::Resumed(existing));
            }

            let used = count_attempts_in(&txn, result.exam_id, result.student_id).await?;
            if used >= max_attempts.max(0) as u64 {
                txn.commit().await.map_err(commit_failed)?;
                return Ok(AttemptStart::Exhausted);
            }

            let model = ActiveModel {
                exam_id: Set(result.exam_id),
                student_id: Set(result.student_id),
                attempt_no: Set(used as i32 + 1),
                status: Set(ResultStatus::InProgress.to_string()),
                question_order: Set(encode_id_list(&result.question_order)),
                started_at: Set(result.started_at.timestamp()),
                deadline_at: Set(result.deadline_at.timestamp()),
                submitted_at: Set(None),
                score: Set(0.0),
                max_score: Set(result.max_score),
                correct_count: Set(0),
                total_questions: Set(result.total_questions),
                passed: Set(false),
                ..Default::default()
            };

            match model.insert(&txn).await {
                Ok(created) => {
                    txn.commit().await.map_err(commit_failed)?;
                    return Ok(AttemptStart::Started(created.into_result()));
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    debug!(
                        "Concurrent start for exam {} student {}, retrying",
                        result.exam_id, result.student_id
                    );
                    txn.rollback().await.map_err(|e| {
                        ExamSystemError::database_operation(format!("回滚事务失败: {e}"))
                    })?;
                }
                Err(e) => {
                    return Err(ExamSystemError::database_operation(format!(
                        "创建作答记录失败: {e}"
                    )));
                }
            }
        }

        Err(ExamSystemError::conflict("开始作答冲突，请重试"))
    }

    pub async fn get_result_by_id_impl(&self, result_id: i64) -> Result<Option<ExamResult>> {
        let result = Results::find_by_id(result_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询作答记录失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 学生在某场考试中未交卷的记录
    pub async fn find_in_progress_result_impl(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamResult>> {
        in_progress_result(&self.db, exam_id, student_id).await
    }

    pub async fn count_attempts_impl(&self, exam_id: i64, student_id: i64) -> Result<i64> {
        Ok(count_attempts_in(&self.db, exam_id, student_id).await? as i64)
    }

    pub async fn count_results_by_exam_impl(&self, exam_id: i64) -> Result<u64> {
        Results::find()
            .filter(Column::ExamId.eq(exam_id))
            .count(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("统计作答记录失败: {e}")))
    }

    /// 分页列出作答记录
    pub async fn list_results_with_pagination_impl(
        &self,
        query: ResultListQuery,
    ) -> Result<PaginatedResponse<ExamResult>> {
        let (page, size) = PaginationQuery::new(query.page, query.size).resolve();

        let mut select = Results::find();

        if let Some(exam_id) = query.exam_id {
            select = select.filter(Column::ExamId.eq(exam_id));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let select = select.order_by_desc(Column::StartedAt).order_by_desc(Column::Id);
        let (results, pagination) = self.fetch_page(select, page, size, "作答记录").await?;

        Ok(PaginatedResponse::new(
            results.into_iter().map(|m| m.into_result()).collect(),
            pagination,
        ))
    }

    pub async fn list_results_by_exam_impl(&self, exam_id: i64) -> Result<Vec<ExamResult>> {
        let results = Results::find()
            .filter(Column::ExamId.eq(exam_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询作答记录失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_result()).collect())
    }

    /// 截止时间早于 cutoff 且仍在作答中的记录
    pub async fn list_expired_in_progress_results_impl(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ExamResult>> {
        let results = Results::find()
            .filter(Column::Status.eq(ResultStatus::InProgress.to_string()))
            .filter(Column::DeadlineAt.lt(cutoff.timestamp()))
            .order_by_asc(Column::DeadlineAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                ExamSystemError::database_operation(format!("查询超时作答记录失败: {e}"))
            })?;

        Ok(results.into_iter().map(|m| m.into_result()).collect())
    }

    /// 保存某题的选择，已有则覆盖；作答已结束时返回 `None`
    ///
    /// 先对作答记录做一次带 `status = in_progress` 条件的空更新以取得行锁，
    /// 与交卷事务互斥：交卷之后到达的保存会被拒绝，之前到达的会被计分。
    pub async fn save_student_answer_impl(
        &self,
        result_id: i64,
        question_id: i64,
        selected_answer_ids: Vec<i64>,
    ) -> Result<Option<StudentAnswer>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let locked = Results::update_many()
            .col_expr(Column::Status, Expr::value(ResultStatus::InProgress.to_string()))
            .filter(Column::Id.eq(result_id))
            .filter(Column::Status.eq(ResultStatus::InProgress.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("锁定作答记录失败: {e}")))?;

        if locked.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        let row = AnswerActiveModel {
            result_id: Set(result_id),
            question_id: Set(question_id),
            selected_answer_ids: Set(encode_id_list(&selected_answer_ids)),
            is_correct: Set(false),
            score: Set(0.0),
            answered_at: Set(now),
            ..Default::default()
        };

        StudentAnswers::insert(row)
            .on_conflict(
                OnConflict::columns([AnswerColumn::ResultId, AnswerColumn::QuestionId])
                    .update_columns([AnswerColumn::SelectedAnswerIds, AnswerColumn::AnsweredAt])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("保存作答失败: {e}")))?;

        let saved = StudentAnswers::find()
            .filter(AnswerColumn::ResultId.eq(result_id))
            .filter(AnswerColumn::QuestionId.eq(question_id))
            .one(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询作答失败: {e}")))?;

        txn.commit().await.map_err(commit_failed)?;

        Ok(saved.map(|m| m.into_student_answer()))
    }

    pub async fn list_student_answers_impl(
        &self,
        result_ids: &[i64],
    ) -> Result<Vec<StudentAnswer>> {
        if result_ids.is_empty() {
            return Ok(vec![]);
        }

        let answers = StudentAnswers::find()
            .filter(AnswerColumn::ResultId.is_in(result_ids.iter().copied()))
            .order_by_asc(AnswerColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询作答失败: {e}")))?;

        Ok(answers
            .into_iter()
            .map(|m| m.into_student_answer())
            .collect())
    }

    /// 结束作答并写入评分
    ///
    /// 先以 `status = in_progress` 为条件切换状态，手动交卷与自动交卷并发时只有一方生效；
    /// 之后在同一事务内读取作答并判分，保证分数与已保存的作答一致。
    pub async fn finalize_result_impl(
        &self,
        result_id: i64,
        status: ResultStatus,
        grader: &Grader,
    ) -> Result<Option<ExamResult>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(begin_failed)?;

        let closed = Results::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::SubmittedAt, Expr::value(now))
            .filter(Column::Id.eq(result_id))
            .filter(Column::Status.eq(ResultStatus::InProgress.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("更新作答记录失败: {e}")))?;

        if closed.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        let answers: Vec<StudentAnswer> = StudentAnswers::find()
            .filter(AnswerColumn::ResultId.eq(result_id))
            .all(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("查询作答失败: {e}")))?
            .into_iter()
            .map(|m| m.into_student_answer())
            .collect();

        let grade = grader(&answers);

        Results::update_many()
            .col_expr(Column::Score, Expr::value(grade.score))
            .col_expr(Column::MaxScore, Expr::value(grade.max_score))
            .col_expr(Column::CorrectCount, Expr::value(grade.correct_count))
            .col_expr(Column::TotalQuestions, Expr::value(grade.total_questions))
            .col_expr(Column::Passed, Expr::value(grade.passed))
            .filter(Column::Id.eq(result_id))
            .exec(&txn)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("写入成绩失败: {e}")))?;

        for answer in grade.answers {
            StudentAnswers::update_many()
                .col_expr(AnswerColumn::IsCorrect, Expr::value(answer.is_correct))
                .col_expr(AnswerColumn::Score, Expr::value(answer.score))
                .filter(AnswerColumn::ResultId.eq(result_id))
                .filter(AnswerColumn::QuestionId.eq(answer.question_id))
                .exec(&txn)
                .await
                .map_err(|e| ExamSystemError::database_operation(format!("写入题目得分失败: {e}")))?;
        }

        txn.commit().await.map_err(commit_failed)?;

        self.get_result_by_id_impl(result_id).await
    }
}
