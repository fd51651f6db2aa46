use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{ExamService, can_manage_exam, exam_phase, load_exam, load_managed_exam};
use crate::models::{
    ApiResponse, ErrorCode,
    exams::requests::AssignExamRequest,
    notifications::{
        entities::{NotificationType, ReferenceType},
        requests::CreateNotificationRequest,
    },
};
use crate::services::{
    classes::ensure_class_teacher, current_user, error_response, notifications::notify_users,
    storage_error, websocket::broadcast_exam_status,
};

/// 分配到班级：通知班内学生并向班级组推送考试状态
pub async fn assign_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    body: AssignExamRequest,
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

    if !exam.is_published() {
        return Ok(error_response(
            StatusCode::CONFLICT,
            ErrorCode::ExamNotPublished,
            "Only published exams can be assigned",
        ));
    }

    let class = match storage.get_class_by_id(body.class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::ClassNotFound,
                "Class not found",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get class", e)),
    };

    if let Err(response) = ensure_class_teacher(&storage, &class, &user).await {
        return Ok(response);
    }

    match storage.list_exam_assignments(exam_id).await {
        Ok(assignments) if assignments.iter().any(|a| a.class_id == class.id) => {
            return Ok(error_response(
                StatusCode::CONFLICT,
                ErrorCode::ExamAlreadyAssigned,
                "Exam is already assigned to this class",
            ));
        }
        Ok(_) => {}
        Err(e) => return Ok(storage_error("Failed to load exam assignments", e)),
    }

    let assignment = match storage
        .create_exam_assignment(exam_id, class.id, user.id)
        .await
    {
        Ok(assignment) => assignment,
        Err(e) => return Ok(storage_error("Failed to assign exam", e)),
    };

    tracing::info!(
        "User {} assigned exam {} to class {}",
        user.id,
        exam_id,
        class.id
    );

    match storage.list_class_student_ids(&[class.id]).await {
        Ok(student_ids) => {
            notify_users(
                &storage,
                &student_ids,
                CreateNotificationRequest {
                    notification_type: NotificationType::ExamAssigned,
                    title: format!("新考试：{}", exam.title),
                    content: Some(format!(
                        "考试时间 {} 至 {}，时长 {} 分钟",
                        exam.start_time.format("%Y-%m-%d %H:%M"),
                        exam.end_time.format("%Y-%m-%d %H:%M"),
                        exam.duration_minutes
                    )),
                    reference_type: Some(ReferenceType::Exam),
                    reference_id: Some(exam.id),
                },
            )
            .await;
        }
        Err(e) => tracing::warn!("Failed to load students of class {}: {}", class.id, e),
    }

    broadcast_exam_status(&[class.id], exam.id, exam_phase(&exam, chrono::Utc::now()));

    Ok(HttpResponse::Created().json(ApiResponse::success(
        assignment,
        "Exam assigned successfully",
    )))
}

pub async fn unassign_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
    class_id: i64,
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

    // 考试创建者或班级教师均可取消
    if !can_manage_exam(&exam, &user) {
        let class = match storage.get_class_by_id(class_id).await {
            Ok(Some(class)) => class,
            Ok(None) => {
                return Ok(error_response(
                    StatusCode::NOT_FOUND,
                    ErrorCode::ClassNotFound,
                    "Class not found",
                ));
            }
            Err(e) => return Ok(storage_error("Failed to get class", e)),
        };
        if let Err(response) = ensure_class_teacher(&storage, &class, &user).await {
            return Ok(response);
        }
    }

    match storage.delete_exam_assignment(exam_id, class_id).await {
        Ok(true) => {
            tracing::info!(
                "User {} unassigned exam {} from class {}",
                user.id,
                exam_id,
                class_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Exam unassigned successfully",
            )))
        }
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ExamNotAssigned,
            "Exam is not assigned to this class",
        )),
        Err(e) => Ok(storage_error("Failed to unassign exam", e)),
    }
}

pub async fn list_exam_assignments(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_managed_exam(&storage, exam_id, &user).await {
        return Ok(response);
    }

    match storage.list_exam_assignments(exam_id).await {
        Ok(assignments) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assignments,
            "Exam assignments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to load exam assignments", e)),
    }
}
