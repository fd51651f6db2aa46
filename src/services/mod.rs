/// 服务结构体：存储在首次请求时从 app_data 中获取
macro_rules! define_service {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name {
            storage: Option<std::sync::Arc<dyn crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            pub fn with_storage(storage: std::sync::Arc<dyn crate::storage::Storage>) -> Self {
                Self {
                    storage: Some(storage),
                }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> actix_web::Result<std::sync::Arc<dyn crate::storage::Storage>> {
                match &self.storage {
                    Some(storage) => Ok(storage.clone()),
                    None => crate::services::storage_from_request(request),
                }
            }
        }
    };
}

pub(crate) use define_service;

pub mod auth;
pub mod class_users;
pub mod classes;
pub mod exams;
pub mod notifications;
pub mod questions;
pub mod results;
pub mod subjects;
pub mod system;
pub mod users;
pub mod websocket;

pub use auth::AuthService;
pub use class_users::ClassUserService;
pub use classes::ClassService;
pub use exams::ExamService;
pub use notifications::NotificationService;
pub use questions::QuestionService;
pub use results::ResultService;
pub use subjects::SubjectService;
pub use system::SystemService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use std::sync::Arc;

use crate::errors::ExamSystemError;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Storage not found in app data"))
}

/// 当前登录用户，未经过 RequireJWT 时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

pub(crate) fn error_response(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
}

/// 用户信息变更后清空已认证用户缓存
pub(crate) async fn invalidate_user_cache(request: &HttpRequest) {
    if let Some(cache) =
        request.app_data::<actix_web::web::Data<Arc<dyn crate::cache::ObjectCache>>>()
    {
        cache.invalidate_all().await;
    }
}

/// 存储层错误映射到 HTTP 响应
pub(crate) fn storage_error(context: &str, err: ExamSystemError) -> HttpResponse {
    let (status, code) = match &err {
        ExamSystemError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
        ExamSystemError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        ExamSystemError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
        ExamSystemError::ExamState(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
        _ => {
            tracing::error!("{}: {}", context, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
            )
        }
    };
    error_response(status, code, format!("{context}: {}", err.message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_status() {
        let resp = storage_error("删除用户失败", ExamSystemError::conflict("in use"));
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = storage_error("查询失败", ExamSystemError::database_operation("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = storage_error("参数错误", ExamSystemError::validation("bad"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
