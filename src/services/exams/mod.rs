pub mod assign;
pub mod compose;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod phase;
pub mod publish;
pub mod stats;
pub mod update;

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use chrono::{DateTime, Utc};

use crate::models::ErrorCode;
use crate::models::exams::{
    entities::{Exam, ExamDetail, ExamQuestion},
    requests::{
        AssignExamRequest, CreateExamRequest, ExamListQuery, GenerateExamQuestionsRequest,
        SetExamQuestionsRequest, UpdateExamRequest,
    },
    responses::ExamSummary,
};
use crate::models::users::entities::User;
use crate::services::{error_response, forbidden, storage_error};
use crate::storage::Storage;

pub use phase::{attempt_deadline, exam_phase};

super::define_service!(
    /// 考试的组卷、发布与分配
    ExamService
);

impl ExamService {
    pub async fn list_exams(
        &self,
        request: &HttpRequest,
        query: ExamListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_exams(self, request, query).await
    }

    pub async fn create_exam(
        &self,
        request: &HttpRequest,
        exam_data: CreateExamRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_exam(self, request, exam_data).await
    }

    pub async fn get_exam(&self, request: &HttpRequest, exam_id: i64) -> ActixResult<HttpResponse> {
        get::get_exam(self, request, exam_id).await
    }

    pub async fn update_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        update_data: UpdateExamRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_exam(self, request, exam_id, update_data).await
    }

    pub async fn delete_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_exam(self, request, exam_id).await
    }

    pub async fn set_exam_questions(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        body: SetExamQuestionsRequest,
    ) -> ActixResult<HttpResponse> {
        compose::set_exam_questions(self, request, exam_id, body).await
    }

    pub async fn generate_exam_questions(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        body: GenerateExamQuestionsRequest,
    ) -> ActixResult<HttpResponse> {
        compose::generate_exam_questions(self, request, exam_id, body).await
    }

    pub async fn publish_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        publish::publish_exam(self, request, exam_id).await
    }

    pub async fn unpublish_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        publish::unpublish_exam(self, request, exam_id).await
    }

    pub async fn assign_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        body: AssignExamRequest,
    ) -> ActixResult<HttpResponse> {
        assign::assign_exam(self, request, exam_id, body).await
    }

    pub async fn unassign_exam(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        assign::unassign_exam(self, request, exam_id, class_id).await
    }

    pub async fn list_exam_assignments(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        assign::list_exam_assignments(self, request, exam_id).await
    }

    pub async fn get_exam_stats(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        stats::get_exam_stats(self, request, exam_id).await
    }
}

/// 考试基础字段校验
pub fn validate_exam_fields(
    title: &str,
    duration_minutes: i32,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_attempts: i32,
    pass_score: f64,
) -> Result<(), String> {
    let title_len = title.trim().chars().count();
    if title_len == 0 || title_len > 200 {
        return Err("Exam title must be 1-200 characters".to_string());
    }
    if duration_minutes < 1 {
        return Err("Duration must be at least 1 minute".to_string());
    }
    if start_time >= end_time {
        return Err("Start time must be before end time".to_string());
    }
    if max_attempts < 1 {
        return Err("Max attempts must be at least 1".to_string());
    }
    if !pass_score.is_finite() || pass_score < 0.0 {
        return Err("Pass score cannot be negative".to_string());
    }
    Ok(())
}

pub(crate) fn invalid_exam(msg: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, ErrorCode::ExamInvalid, msg)
}

pub(crate) fn exam_not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, ErrorCode::ExamNotFound, "Exam not found")
}

pub(crate) async fn load_exam(
    storage: &Arc<dyn Storage>,
    exam_id: i64,
) -> Result<Exam, HttpResponse> {
    match storage.get_exam_by_id(exam_id).await {
        Ok(Some(exam)) => Ok(exam),
        Ok(None) => Err(exam_not_found()),
        Err(e) => Err(storage_error("Failed to get exam", e)),
    }
}

/// 考试创建者或管理员
pub(crate) fn can_manage_exam(exam: &Exam, user: &User) -> bool {
    user.is_admin() || exam.created_by == user.id
}

pub(crate) async fn load_managed_exam(
    storage: &Arc<dyn Storage>,
    exam_id: i64,
    user: &User,
) -> Result<Exam, HttpResponse> {
    let exam = load_exam(storage, exam_id).await?;
    if can_manage_exam(&exam, user) {
        Ok(exam)
    } else {
        Err(forbidden("Only the exam owner or an admin can manage this exam"))
    }
}

/// 只有草稿状态的考试可以修改
pub(crate) async fn load_editable_exam(
    storage: &Arc<dyn Storage>,
    exam_id: i64,
    user: &User,
) -> Result<Exam, HttpResponse> {
    let exam = load_managed_exam(storage, exam_id, user).await?;
    if exam.is_published() {
        return Err(error_response(
            StatusCode::CONFLICT,
            ErrorCode::ExamNotEditable,
            "Published exams cannot be modified",
        ));
    }
    Ok(exam)
}

pub fn build_summary(exam: Exam, details: &[ExamDetail], now: DateTime<Utc>) -> ExamSummary {
    let phase = exam_phase(&exam, now);
    ExamSummary {
        question_count: details.len() as i64,
        total_score: details.iter().map(|d| d.score).sum(),
        phase,
        exam,
    }
}

/// 批量生成列表项，题目数与总分来自一次查询
pub(crate) async fn summarize_exams(
    storage: &Arc<dyn Storage>,
    exams: Vec<Exam>,
) -> Result<Vec<ExamSummary>, HttpResponse> {
    let ids: Vec<i64> = exams.iter().map(|e| e.id).collect();
    let details = storage
        .list_exam_details(&ids)
        .await
        .map_err(|e| storage_error("Failed to load exam questions", e))?;

    let mut by_exam: HashMap<i64, Vec<ExamDetail>> = HashMap::new();
    for detail in details {
        by_exam.entry(detail.exam_id).or_default().push(detail);
    }

    let now = Utc::now();
    Ok(exams
        .into_iter()
        .map(|exam| {
            let details = by_exam.remove(&exam.id).unwrap_or_default();
            build_summary(exam, &details, now)
        })
        .collect())
}

/// 按试卷顺序拼接题目内容
pub(crate) async fn exam_questions(
    storage: &Arc<dyn Storage>,
    details: &[ExamDetail],
) -> Result<Vec<ExamQuestion>, HttpResponse> {
    let ids: Vec<i64> = details.iter().map(|d| d.question_id).collect();
    let questions = storage
        .get_questions_by_ids(&ids)
        .await
        .map_err(|e| storage_error("Failed to load questions", e))?;

    let mut by_id: HashMap<i64, _> = questions.into_iter().map(|q| (q.id, q)).collect();
    Ok(details
        .iter()
        .filter_map(|detail| {
            by_id.remove(&detail.question_id).map(|question| ExamQuestion {
                order_index: detail.order_index,
                score: detail.score,
                question,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exams::entities::{ExamPhase, ExamStatus};
    use chrono::Duration;

    #[test]
    fn test_validate_exam_fields() {
        let start = Utc::now();
        let end = start + Duration::hours(1);

        assert!(validate_exam_fields("期末考试", 60, start, end, 1, 60.0).is_ok());
        assert!(validate_exam_fields("  ", 60, start, end, 1, 60.0).is_err());
        assert!(validate_exam_fields("期末考试", 0, start, end, 1, 60.0).is_err());
        assert!(validate_exam_fields("期末考试", 60, end, start, 1, 60.0).is_err());
        assert!(validate_exam_fields("期末考试", 60, start, start, 1, 60.0).is_err());
        assert!(validate_exam_fields("期末考试", 60, start, end, 0, 60.0).is_err());
        assert!(validate_exam_fields("期末考试", 60, start, end, 1, -1.0).is_err());
    }

    #[test]
    fn test_build_summary_totals() {
        let exam = phase::tests::sample_exam(ExamStatus::Published);
        let now = exam.start_time;
        let details = vec![
            ExamDetail {
                id: 1,
                exam_id: exam.id,
                question_id: 11,
                order_index: 0,
                score: 40.0,
            },
            ExamDetail {
                id: 2,
                exam_id: exam.id,
                question_id: 12,
                order_index: 1,
                score: 60.0,
            },
        ];

        let summary = build_summary(exam, &details, now);
        assert_eq!(summary.question_count, 2);
        assert_eq!(summary.total_score, 100.0);
        assert_eq!(summary.phase, ExamPhase::Open);
    }
}
