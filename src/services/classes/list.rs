use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{ApiResponse, classes::requests::ClassListQuery, users::entities::UserRole};
use crate::services::{current_user, storage_error};

/// 管理员查看全部班级，教师查看自己负责的班级，学生查看已加入的班级
pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    mut query: ClassListQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let result = match user.role {
        UserRole::Admin => storage.list_classes_with_pagination(query).await,
        UserRole::Teacher => {
            query.teacher_id = Some(user.id);
            storage.list_classes_with_pagination(query).await
        }
        UserRole::Student => {
            query.teacher_id = None;
            storage.list_user_classes_with_pagination(user.id, query).await
        }
    };

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to retrieve class list", e)),
    }
}
