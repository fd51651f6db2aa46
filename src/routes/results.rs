use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::results::requests::{ResultListQuery, SaveAnswerRequest};
use crate::models::users::entities::UserRole;
use crate::services::ResultService;
use crate::utils::SafeResultIdI64;

static RESULT_SERVICE: Lazy<ResultService> = Lazy::new(ResultService::new_lazy);

pub async fn list_my_results(
    req: HttpRequest,
    query: web::Query<ResultListQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE
        .list_my_results(&req, query.into_inner())
        .await
}

pub async fn get_result(req: HttpRequest, result_id: SafeResultIdI64) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.get_result(&req, result_id.0).await
}

pub async fn get_paper(req: HttpRequest, result_id: SafeResultIdI64) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.get_paper(&req, result_id.0).await
}

pub async fn save_answer(
    req: HttpRequest,
    result_id: SafeResultIdI64,
    body: web::Json<SaveAnswerRequest>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE
        .save_answer(&req, result_id.0, body.into_inner())
        .await
}

pub async fn submit_result(
    req: HttpRequest,
    result_id: SafeResultIdI64,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.submit_result(&req, result_id.0).await
}

// 配置路由
pub fn configure_results_routes(cfg: &mut web::ServiceConfig) {
    let student_only = || middlewares::RequireRole::new_any(UserRole::student_roles());

    cfg.service(
        web::scope("/api/v1/results")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/my")
                    .wrap(student_only())
                    .route(web::get().to(list_my_results)),
            )
            // 本人或考试管理者，由服务内校验
            .route("/{result_id}", web::get().to(get_result))
            .service(
                web::resource("/{result_id}/paper")
                    .wrap(student_only())
                    .route(web::get().to(get_paper)),
            )
            .service(
                web::resource("/{result_id}/answers")
                    .wrap(middlewares::RateLimit::answer_save())
                    .wrap(student_only())
                    .route(web::put().to(save_answer)),
            )
            .service(
                web::resource("/{result_id}/submit")
                    .wrap(student_only())
                    .route(web::post().to(submit_result)),
            ),
    );
}
