use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{ClassService, load_owned_class};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, storage_error, websocket::ConnectionManager};

pub async fn delete_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    if let Err(response) = load_owned_class(&storage, class_id, &user).await {
        return Ok(response);
    }

    // 成员关系与考试分配随班级级联删除
    match storage.delete_class(class_id).await {
        Ok(true) => {
            ConnectionManager::get().drop_group(class_id);
            tracing::info!("Class {} deleted by user {}", class_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
        }
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ClassNotFound,
            "Class not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete class", e)),
    }
}
