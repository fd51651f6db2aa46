#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{App, body::MessageBody, dev::ServiceResponse, test, web};
use chrono::{Duration, Utc};
use serde_json::Value;

use rust_examsystem::cache::{ObjectCache, object_cache::moka::MokaObjectCache};
use rust_examsystem::models::class_users::entities::ClassUserRole;
use rust_examsystem::models::classes::{entities::Class, requests::CreateClassRequest};
use rust_examsystem::models::exams::{
    entities::{Exam, ExamStatus},
    requests::CreateExamRequest,
};
use rust_examsystem::models::questions::{
    entities::{Difficulty, QuestionType},
    requests::{AnswerInput, CreateQuestionRequest},
};
use rust_examsystem::models::subjects::requests::CreateSubjectRequest;
use rust_examsystem::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use rust_examsystem::routes;
use rust_examsystem::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use rust_examsystem::utils::jwt::JwtUtils;

pub async fn memory_storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 5)
        .await
        .expect("in-memory database should start");
    Arc::new(storage)
}

pub fn memory_cache() -> Arc<dyn ObjectCache> {
    Arc::new(MokaObjectCache::new(1_000, 60))
}

pub async fn create_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "not-a-real-hash".to_string(),
            role,
            display_name: None,
            avatar_url: None,
        })
        .await
        .expect("user should be created")
}

/// 教师创建班级并让学生加入
pub async fn class_with_student(
    storage: &Arc<dyn Storage>,
    teacher: &User,
    student: &User,
) -> Class {
    let class = storage
        .create_class(CreateClassRequest {
            teacher_id: Some(teacher.id),
            name: "Class A".to_string(),
            description: None,
        })
        .await
        .expect("class should be created");
    storage
        .join_class(student.id, class.id, ClassUserRole::Student)
        .await
        .expect("student should join");
    class
}

pub fn bearer(user: &User) -> (&'static str, String) {
    let token = JwtUtils::generate_access_token(user.id, user.role.as_str())
        .expect("token should be generated");
    ("Authorization", format!("Bearer {token}"))
}

pub fn build_app(
    storage: Arc<dyn Storage>,
    cache: Arc<dyn ObjectCache>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(storage))
        .app_data(web::Data::new(cache))
        .configure(routes::configure_api_routes)
}

/// 读取响应体中的 JSON
pub async fn read_json<B: MessageBody>(resp: ServiceResponse<B>) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// 已发布并分配给班级、正在进行中的考试
pub async fn open_exam(
    storage: &Arc<dyn Storage>,
    teacher: &User,
    class_id: i64,
    show_result: bool,
) -> (Exam, i64) {
    let subject = storage
        .create_subject(
            teacher.id,
            CreateSubjectRequest {
                code: "CHEM".to_string(),
                name: "Chemistry".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

    let question = storage
        .create_question(
            teacher.id,
            CreateQuestionRequest {
                subject_id: subject.id,
                chapter_id: None,
                content: "H2O is water".to_string(),
                question_type: QuestionType::TrueFalse,
                difficulty: Difficulty::Easy,
                explanation: None,
                answers: vec![
                    AnswerInput {
                        content: "True".to_string(),
                        is_correct: true,
                    },
                    AnswerInput {
                        content: "False".to_string(),
                        is_correct: false,
                    },
                ],
            },
        )
        .await
        .unwrap();

    let now = Utc::now();
    let exam = storage
        .create_exam(
            teacher.id,
            CreateExamRequest {
                subject_id: subject.id,
                title: "Quiz".to_string(),
                description: None,
                duration_minutes: 10,
                start_time: now - Duration::hours(1),
                end_time: now + Duration::hours(1),
                pass_score: 0.0,
                max_attempts: 1,
                shuffle_questions: false,
                shuffle_answers: false,
                show_result,
            },
        )
        .await
        .unwrap();

    storage
        .replace_exam_details(exam.id, vec![(question.id, 4.0)])
        .await
        .unwrap();
    storage
        .set_exam_status(exam.id, ExamStatus::Published)
        .await
        .unwrap();
    storage
        .create_exam_assignment(exam.id, class_id, teacher.id)
        .await
        .unwrap();

    (exam, question.id)
}
