use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, exam_not_found, load_editable_exam};
use crate::models::ApiResponse;
use crate::services::{current_user, storage_error};

/// 删除草稿考试，已发布的需先撤回
pub async fn delete_exam(
    service: &ExamService,
    request: &HttpRequest,
    exam_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_editable_exam(&storage, exam_id, &user).await {
        return Ok(response);
    }

    match storage.delete_exam(exam_id).await {
        Ok(true) => {
            tracing::info!("User {} deleted exam {}", user.id, exam_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Exam deleted successfully")))
        }
        Ok(false) => Ok(exam_not_found()),
        Err(e) => Ok(storage_error("Failed to delete exam", e)),
    }
}
