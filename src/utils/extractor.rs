//! 安全的路径参数提取器
//!
//! 路径中的 ID 必须是正整数，否则直接返回 400，处理函数无需重复校验。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(name: &str, raw: Option<&str>) -> actix_web::Error {
    let message = match raw {
        Some(value) => format!("Invalid path parameter '{name}': '{value}'"),
        None => format!("Missing path parameter '{name}'"),
    };
    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

/// 从路径中解析正整数 ID
pub fn parse_positive_i64(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name);
    match raw.and_then(|v| v.parse::<i64>().ok()) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(bad_path_param(name, raw)),
    }
}

macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_i64(req, $param).map($name))
            }
        }
    };
}

define_safe_i64_extractor!(SafeClassIdI64, "class_id");
define_safe_i64_extractor!(SafeClassUserIdI64, "class_user_id");
define_safe_i64_extractor!(SafeUserIdI64, "user_id");
define_safe_i64_extractor!(SafeSubjectIdI64, "subject_id");
define_safe_i64_extractor!(SafeChapterIdI64, "chapter_id");
define_safe_i64_extractor!(SafeQuestionIdI64, "question_id");
define_safe_i64_extractor!(SafeExamIdI64, "exam_id");
define_safe_i64_extractor!(SafeResultIdI64, "result_id");
define_safe_i64_extractor!(SafeNotificationIdI64, "notification_id");

/// 邀请码：8 位字母数字
#[derive(Debug, Clone)]
pub struct SafeInviteCode(pub String);

impl FromRequest for SafeInviteCode {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("code");
        let result = match raw {
            Some(code) if code.len() == 8 && code.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Ok(SafeInviteCode(code.to_string()))
            }
            _ => Err(bad_path_param("code", raw)),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_positive_id_accepted() {
        let req = TestRequest::default()
            .param("exam_id", "15")
            .to_http_request();
        let id = SafeExamIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);
    }

    #[actix_web::test]
    async fn test_non_positive_or_garbage_rejected() {
        for raw in ["0", "-3", "abc", "1.5"] {
            let req = TestRequest::default()
                .param("exam_id", raw)
                .to_http_request();
            assert!(SafeExamIdI64::extract(&req).await.is_err(), "{raw}");
        }
    }

    async fn nested(exam_id: SafeExamIdI64, class_id: SafeClassIdI64) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}/{}", exam_id.0, class_id.0))
    }

    #[actix_web::test]
    async fn test_two_ids_in_one_route() {
        use actix_web::{App, test, web};

        let app = test::init_service(App::new().route(
            "/exams/{exam_id}/assignments/{class_id}",
            web::delete().to(nested),
        ))
        .await;

        let req = test::TestRequest::delete()
            .uri("/exams/4/assignments/9")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(test::read_body(resp).await, "4/9");

        let req = test::TestRequest::delete()
            .uri("/exams/4/assignments/0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_invite_code() {
        let req = TestRequest::default()
            .param("code", "AbC12345")
            .to_http_request();
        assert!(SafeInviteCode::extract(&req).await.is_ok());

        let req = TestRequest::default()
            .param("code", "short")
            .to_http_request();
        assert!(SafeInviteCode::extract(&req).await.is_err());
    }
}
