use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ExamService, summarize_exams};
use crate::models::{
    ApiResponse,
    exams::{
        requests::{ExamListQuery, ExamScope},
        responses::ExamListResponse,
    },
    users::entities::UserRole,
};
use crate::services::{current_user, storage_error};

pub async fn list_exams(
    service: &ExamService,
    request: &HttpRequest,
    query: ExamListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    // 管理员全部，教师自己创建的，学生所在班级已发布的
    let scope = match user.role {
        UserRole::Admin => ExamScope::All,
        UserRole::Teacher => ExamScope::CreatedBy(user.id),
        UserRole::Student => match storage.list_user_class_ids(user.id).await {
            Ok(class_ids) => ExamScope::AssignedToClasses(class_ids),
            Err(e) => return Ok(storage_error("Failed to load user classes", e)),
        },
    };

    let page = match storage.list_exams_with_pagination(query, scope).await {
        Ok(page) => page,
        Err(e) => return Ok(storage_error("Failed to retrieve exam list", e)),
    };

    let items = match summarize_exams(&storage, page.items).await {
        Ok(items) => items,
        Err(response) => return Ok(response),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ExamListResponse {
            items,
            pagination: page.pagination,
        },
        "Exam list retrieved successfully",
    )))
}
