pub mod answer;
pub mod get;
pub mod list;
pub mod paper;
pub mod scoring;
pub mod start;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::results::{
    entities::ExamResult,
    requests::{ResultListQuery, SaveAnswerRequest},
};
use crate::services::{error_response, storage_error};
use crate::storage::Storage;

pub use submit::finish_attempt;

super::define_service!(
    /// 作答、交卷与成绩
    ResultService
);

impl ResultService {
    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        exam_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_attempt(self, request, exam_id).await
    }

    pub async fn get_paper(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        paper::get_paper(self, request, result_id).await
    }

    pub async fn save_answer(
        &self,
        request: &HttpRequest,
        result_id: i64,
        body: SaveAnswerRequest,
    ) -> ActixResult<HttpResponse> {
        answer::save_answer(self, request, result_id, body).await
    }

    pub async fn submit_result(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        submit::submit_result(self, request, result_id).await
    }

    pub async fn get_result(
        &self,
        request: &HttpRequest,
        result_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_result(self, request, result_id).await
    }

    pub async fn list_my_results(
        &self,
        request: &HttpRequest,
        query: ResultListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_my_results(self, request, query).await
    }

    pub async fn list_exam_results(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        query: ResultListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_exam_results(self, request, exam_id, query).await
    }
}

pub(crate) fn result_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::ResultNotFound,
        "Result not found",
    )
}

pub(crate) fn already_submitted() -> HttpResponse {
    error_response(
        StatusCode::CONFLICT,
        ErrorCode::ResultAlreadySubmitted,
        "Result has already been submitted",
    )
}

/// 读取作答记录，只有本人可以继续作答
pub(crate) async fn load_own_result(
    storage: &Arc<dyn Storage>,
    result_id: i64,
    student_id: i64,
) -> Result<ExamResult, HttpResponse> {
    match storage.get_result_by_id(result_id).await {
        // 他人的记录同样视为不存在
        Ok(Some(result)) if result.student_id == student_id => Ok(result),
        Ok(_) => Err(result_not_found()),
        Err(e) => Err(storage_error("Failed to get result", e)),
    }
}

/// 是否已超过截止时间加宽限期
pub fn is_past_grace(result: &ExamResult, now: chrono::DateTime<chrono::Utc>, grace_secs: i64) -> bool {
    now > result.deadline_at + chrono::Duration::seconds(grace_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::results::entities::ResultStatus;
    use chrono::{Duration, Utc};

    #[test]
    fn test_is_past_grace() {
        let deadline = Utc::now();
        let result = ExamResult {
            id: 1,
            exam_id: 1,
            student_id: 1,
            attempt_no: 1,
            status: ResultStatus::InProgress,
            question_order: vec![],
            started_at: deadline - Duration::minutes(30),
            deadline_at: deadline,
            submitted_at: None,
            score: 0.0,
            max_score: 0.0,
            correct_count: 0,
            total_questions: 0,
            passed: false,
        };

        assert!(!is_past_grace(&result, deadline, 30));
        assert!(!is_past_grace(&result, deadline + Duration::seconds(30), 30));
        assert!(is_past_grace(&result, deadline + Duration::seconds(31), 30));
    }
}
