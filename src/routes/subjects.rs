use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::subjects::requests::{
    CreateChapterRequest, CreateSubjectRequest, SubjectListQuery, UpdateChapterRequest,
    UpdateSubjectRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::SubjectService;
use crate::utils::{SafeChapterIdI64, SafeSubjectIdI64};

static SUBJECT_SERVICE: Lazy<SubjectService> = Lazy::new(SubjectService::new_lazy);

pub async fn list_subjects(
    req: HttpRequest,
    query: web::Query<SubjectListQuery>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.list_subjects(&req, query.into_inner()).await
}

pub async fn create_subject(
    req: HttpRequest,
    subject_data: web::Json<CreateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .create_subject(&req, subject_data.into_inner())
        .await
}

pub async fn get_subject(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.get_subject(&req, subject_id.0).await
}

pub async fn update_subject(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
    update_data: web::Json<UpdateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .update_subject(&req, subject_id.0, update_data.into_inner())
        .await
}

pub async fn delete_subject(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.delete_subject(&req, subject_id.0).await
}

pub async fn list_chapters(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.list_chapters(&req, subject_id.0).await
}

pub async fn create_chapter(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
    chapter_data: web::Json<CreateChapterRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .create_chapter(&req, subject_id.0, chapter_data.into_inner())
        .await
}

pub async fn update_chapter(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
    chapter_id: SafeChapterIdI64,
    update_data: web::Json<UpdateChapterRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .update_chapter(&req, subject_id.0, chapter_id.0, update_data.into_inner())
        .await
}

pub async fn delete_chapter(
    req: HttpRequest,
    subject_id: SafeSubjectIdI64,
    chapter_id: SafeChapterIdI64,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .delete_chapter(&req, subject_id.0, chapter_id.0)
        .await
}

// 科目与章节：所有登录用户可读，教师和管理员可写
pub fn configure_subjects_routes(cfg: &mut web::ServiceConfig) {
    let teacher_only = || middlewares::RequireRole::new_any(UserRole::teacher_roles());

    cfg.service(
        web::scope("/api/v1/subjects")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_subjects))
                    .route(web::post().to(create_subject).wrap(teacher_only())),
            )
            .service(
                web::resource("/{subject_id}")
                    .route(web::get().to(get_subject))
                    .route(web::put().to(update_subject).wrap(teacher_only()))
                    .route(web::delete().to(delete_subject).wrap(teacher_only())),
            )
            .service(
                web::resource("/{subject_id}/chapters")
                    .route(web::get().to(list_chapters))
                    .route(web::post().to(create_chapter).wrap(teacher_only())),
            )
            .service(
                web::resource("/{subject_id}/chapters/{chapter_id}")
                    .wrap(teacher_only())
                    .route(web::put().to(update_chapter))
                    .route(web::delete().to(delete_chapter)),
            ),
    );
}
