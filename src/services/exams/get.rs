use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, build_summary, can_manage_exam, exam_not_found, exam_questions, load_exam};
use crate::models::{
    ApiResponse,
    exams::responses::ExamDetailResponse,
    users::entities::{User, UserRole},
};
use crate::services::{current_user, forbidden, storage_error};
use crate::storage::Storage;
use std::sync::Arc;

/// 考试对学生可见：已发布且分配到其所在班级
pub(crate) async fn is_visible_to_student(
    storage: &Arc<dyn Storage>,
    exam_id: i64,
    published: bool,
    student: &User,
) -> Result<bool, HttpResponse> {
    if !published {
        return Ok(false);
    }
    let class_ids = storage
        .list_user_class_ids(student.id)
        .await
        .map_err(|e| storage_error("Failed to load user classes", e))?;
    storage
        .is_exam_assigned_to_classes(exam_id, &class_ids)
        .await
        .map_err(|e| storage_error("Failed to check exam assignment", e))
}

pub async fn get_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let exam = match load_exam(&storage, exam_id).await {
        Ok(exam) => exam,
        Err(response) => return Ok(response),
    };

    let details = match storage.list_exam_details(&[exam_id]).await {
        Ok(details) => details,
        Err(e) => return Ok(storage_error("Failed to load exam questions", e)),
    };

    if user.role == UserRole::Student {
        match is_visible_to_student(&storage, exam_id, exam.is_published(), &user).await {
            Ok(true) => {}
            // 对学生隐藏未分配的考试
            Ok(false) => return Ok(exam_not_found()),
            Err(response) => return Ok(response),
        }

        let attempts_used = match storage.count_attempts(exam_id, user.id).await {
            Ok(count) => count,
            Err(e) => return Ok(storage_error("Failed to count attempts", e)),
        };

        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            ExamDetailResponse {
                summary: build_summary(exam, &details, chrono::Utc::now()),
                questions: None,
                assignments: None,
                attempts_used: Some(attempts_used),
            },
            "Exam retrieved successfully",
        )));
    }

    if !can_manage_exam(&exam, &user) {
        return Ok(forbidden("Only the exam owner or an admin can view this exam"));
    }

    let questions = match exam_questions(&storage, &details).await {
        Ok(questions) => questions,
        Err(response) => return Ok(response),
    };
    let assignments = match storage.list_exam_assignments(exam_id).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(storage_error("Failed to load exam assignments", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ExamDetailResponse {
            summary: build_summary(exam, &details, chrono::Utc::now()),
            questions: Some(questions),
            assignments: Some(assignments),
            attempts_used: None,
        },
        "Exam retrieved successfully",
    )))
}
