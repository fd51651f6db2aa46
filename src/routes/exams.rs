use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::exams::requests::{
    AssignExamRequest, CreateExamRequest, ExamListQuery, GenerateExamQuestionsRequest,
    SetExamQuestionsRequest, UpdateExamRequest,
};
use crate::models::results::requests::ResultListQuery;
use crate::models::users::entities::UserRole;
use crate::services::{ExamService, ResultService};
use crate::utils::{SafeClassIdI64, SafeExamIdI64};

static EXAM_SERVICE: Lazy<ExamService> = Lazy::new(ExamService::new_lazy);
static RESULT_SERVICE: Lazy<ResultService> = Lazy::new(ResultService::new_lazy);

pub async fn list_exams(
    req: HttpRequest,
    query: web::Query<ExamListQuery>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.list_exams(&req, query.into_inner()).await
}

pub async fn create_exam(
    req: HttpRequest,
    exam_data: web::Json<CreateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.create_exam(&req, exam_data.into_inner()).await
}

pub async fn get_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_exam(&req, exam_id.0).await
}

pub async fn update_exam(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    update_data: web::Json<UpdateExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .update_exam(&req, exam_id.0, update_data.into_inner())
        .await
}

pub async fn delete_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.delete_exam(&req, exam_id.0).await
}

pub async fn set_exam_questions(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    body: web::Json<SetExamQuestionsRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .set_exam_questions(&req, exam_id.0, body.into_inner())
        .await
}

pub async fn generate_exam_questions(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    body: web::Json<GenerateExamQuestionsRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .generate_exam_questions(&req, exam_id.0, body.into_inner())
        .await
}

pub async fn publish_exam(req: HttpRequest, exam_id: SafeExamIdI64) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.publish_exam(&req, exam_id.0).await
}

pub async fn unpublish_exam(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.unpublish_exam(&req, exam_id.0).await
}

pub async fn assign_exam(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    body: web::Json<AssignExamRequest>,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE
        .assign_exam(&req, exam_id.0, body.into_inner())
        .await
}

pub async fn list_exam_assignments(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.list_exam_assignments(&req, exam_id.0).await
}

pub async fn unassign_exam(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    class_id: SafeClassIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.unassign_exam(&req, exam_id.0, class_id.0).await
}

pub async fn get_exam_stats(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    EXAM_SERVICE.get_exam_stats(&req, exam_id.0).await
}

pub async fn list_exam_results(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
    query: web::Query<ResultListQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE
        .list_exam_results(&req, exam_id.0, query.into_inner())
        .await
}

pub async fn start_attempt(
    req: HttpRequest,
    exam_id: SafeExamIdI64,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.start_attempt(&req, exam_id.0).await
}

// 配置路由
pub fn configure_exams_routes(cfg: &mut web::ServiceConfig) {
    let teacher_only = || middlewares::RequireRole::new_any(UserRole::teacher_roles());

    cfg.service(
        web::scope("/api/v1/exams")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 列表按角色过滤
                    .route(web::get().to(list_exams))
                    .route(web::post().to(create_exam).wrap(teacher_only())),
            )
            .service(
                web::resource("/{exam_id}")
                    .route(web::get().to(get_exam))
                    .route(web::put().to(update_exam).wrap(teacher_only()))
                    .route(web::delete().to(delete_exam).wrap(teacher_only())),
            )
            .service(
                web::resource("/{exam_id}/questions")
                    .wrap(teacher_only())
                    .route(web::put().to(set_exam_questions)),
            )
            .service(
                web::resource("/{exam_id}/questions/generate")
                    .wrap(teacher_only())
                    .route(web::post().to(generate_exam_questions)),
            )
            .service(
                web::resource("/{exam_id}/publish")
                    .wrap(teacher_only())
                    .route(web::post().to(publish_exam)),
            )
            .service(
                web::resource("/{exam_id}/unpublish")
                    .wrap(teacher_only())
                    .route(web::post().to(unpublish_exam)),
            )
            .service(
                web::resource("/{exam_id}/assignments")
                    .wrap(teacher_only())
                    .route(web::get().to(list_exam_assignments))
                    .route(web::post().to(assign_exam)),
            )
            .service(
                web::resource("/{exam_id}/assignments/{class_id}")
                    .wrap(teacher_only())
                    .route(web::delete().to(unassign_exam)),
            )
            .service(
                web::resource("/{exam_id}/stats")
                    .wrap(teacher_only())
                    .route(web::get().to(get_exam_stats)),
            )
            .service(
                web::resource("/{exam_id}/results")
                    .wrap(teacher_only())
                    .route(web::get().to(list_exam_results)),
            )
            .service(
                // 学生开始作答
                web::resource("/{exam_id}/attempts")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route(web::post().to(start_attempt)),
            ),
    );
}
