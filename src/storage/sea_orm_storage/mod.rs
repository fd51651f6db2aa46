//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod class_users;
mod classes;
mod exams;
mod notifications;
mod questions;
mod results;
mod subjects;
mod users;

use crate::config::AppConfig;
use crate::errors::{ExamSystemError, Result};
use crate::models::PaginationInfo;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Select,
};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ExamSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ExamSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("mmap_size", "536870912")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库只能有一个连接，且不能被回收
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size)
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| ExamSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(5.min(pool_size))
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ExamSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 分页查询，page 从 1 开始
    pub(crate) async fn fetch_page<E>(
        &self,
        select: Select<E>,
        page: u64,
        size: u64,
        what: &str,
    ) -> Result<(Vec<E::Model>, PaginationInfo)>
    where
        E: EntityTrait,
        E::Model: Send + Sync + 'static,
    {
        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            ExamSystemError::database_operation(format!("查询{what}总数失败: {e}"))
        })?;

        let items = paginator.fetch_page(page - 1).await.map_err(|e| {
            ExamSystemError::database_operation(format!("查询{what}列表失败: {e}"))
        })?;

        Ok((items, PaginationInfo::new(page, size, total)))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ExamSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse,
    class_users::{
        entities::{ClassUser, ClassUserRole},
        requests::{ClassUserListQuery, UpdateClassUserRequest},
        responses::ClassMemberListResponse,
    },
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    exams::{
        entities::{Exam, ExamAssignment, ExamDetail, ExamStatus},
        requests::{CreateExamRequest, ExamListQuery, ExamScope, UpdateExamRequest},
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    questions::{
        entities::Question,
        requests::{CreateQuestionRequest, QuestionListQuery, UpdateQuestionRequest},
        responses::QuestionListResponse,
    },
    results::{
        entities::{AttemptStart, ExamResult, Grader, ResultStatus, StudentAnswer},
        requests::{NewResult, ResultListQuery},
    },
    subjects::{
        entities::{Chapter, Subject},
        requests::{
            CreateChapterRequest, CreateSubjectRequest, SubjectListQuery, UpdateChapterRequest,
            UpdateSubjectRequest,
        },
        responses::SubjectListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 班级模块
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_code(&self, invite_code: &str) -> Result<Option<Class>> {
        self.get_class_by_code_impl(invite_code).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 班级成员模块
    async fn join_class(
        &self,
        user_id: i64,
        class_id: i64,
        role: ClassUserRole,
    ) -> Result<ClassUser> {
        self.join_class_impl(user_id, class_id, role).await
    }

    async fn leave_class(&self, user_id: i64, class_id: i64) -> Result<bool> {
        self.leave_class_impl(user_id, class_id).await
    }

    async fn update_class_user(
        &self,
        class_id: i64,
        class_user_id: i64,
        update: UpdateClassUserRequest,
    ) -> Result<Option<ClassUser>> {
        self.update_class_user_impl(class_id, class_user_id, update)
            .await
    }

    async fn get_class_user_by_id(
        &self,
        class_id: i64,
        class_user_id: i64,
    ) -> Result<Option<ClassUser>> {
        self.get_class_user_by_id_impl(class_id, class_user_id)
            .await
    }

    async fn list_class_members_with_pagination(
        &self,
        class_id: i64,
        query: ClassUserListQuery,
    ) -> Result<ClassMemberListResponse> {
        self.list_class_members_with_pagination_impl(class_id, query)
            .await
    }

    async fn list_user_classes_with_pagination(
        &self,
        user_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_user_classes_with_pagination_impl(user_id, query)
            .await
    }

    async fn get_class_user_by_user_id_and_class_id(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>> {
        self.get_class_user_by_user_id_and_class_id_impl(user_id, class_id)
            .await
    }

    async fn count_class_members(&self, class_id: i64) -> Result<i64> {
        self.count_class_members_impl(class_id).await
    }

    async fn list_user_class_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.list_user_class_ids_impl(user_id).await
    }

    async fn list_class_student_ids(&self, class_ids: &[i64]) -> Result<Vec<i64>> {
        self.list_class_student_ids_impl(class_ids).await
    }

    // 科目模块
    async fn create_subject(&self, created_by: i64, req: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(created_by, req).await
    }

    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(subject_id).await
    }

    async fn get_subject_by_code(&self, code: &str) -> Result<Option<Subject>> {
        self.get_subject_by_code_impl(code).await
    }

    async fn list_subjects_with_pagination(
        &self,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse> {
        self.list_subjects_with_pagination_impl(query).await
    }

    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(subject_id, update).await
    }

    async fn delete_subject(&self, subject_id: i64) -> Result<bool> {
        self.delete_subject_impl(subject_id).await
    }

    async fn is_subject_in_use(&self, subject_id: i64) -> Result<bool> {
        self.is_subject_in_use_impl(subject_id).await
    }

    async fn create_chapter(&self, subject_id: i64, req: CreateChapterRequest) -> Result<Chapter> {
        self.create_chapter_impl(subject_id, req).await
    }

    async fn get_chapter_by_id(&self, chapter_id: i64) -> Result<Option<Chapter>> {
        self.get_chapter_by_id_impl(chapter_id).await
    }

    async fn list_chapters(&self, subject_id: i64) -> Result<Vec<Chapter>> {
        self.list_chapters_impl(subject_id).await
    }

    async fn update_chapter(
        &self,
        chapter_id: i64,
        update: UpdateChapterRequest,
    ) -> Result<Option<Chapter>> {
        self.update_chapter_impl(chapter_id, update).await
    }

    async fn delete_chapter(&self, chapter_id: i64) -> Result<bool> {
        self.delete_chapter_impl(chapter_id).await
    }

    // 题库模块
    async fn create_question(
        &self,
        created_by: i64,
        req: CreateQuestionRequest,
    ) -> Result<Question> {
        self.create_question_impl(created_by, req).await
    }

    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>> {
        self.get_question_by_id_impl(question_id).await
    }

    async fn get_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>> {
        self.get_questions_by_ids_impl(ids).await
    }

    async fn list_questions_with_pagination(
        &self,
        query: QuestionListQuery,
    ) -> Result<QuestionListResponse> {
        self.list_questions_with_pagination_impl(query).await
    }

    async fn list_active_questions(&self, subject_id: i64) -> Result<Vec<Question>> {
        self.list_active_questions_impl(subject_id).await
    }

    async fn count_questions_by_subject(&self, subject_id: i64) -> Result<i64> {
        self.count_questions_by_subject_impl(subject_id).await
    }

    async fn update_question(
        &self,
        question_id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>> {
        self.update_question_impl(question_id, update).await
    }

    async fn delete_question(&self, question_id: i64) -> Result<bool> {
        self.delete_question_impl(question_id).await
    }

    async fn is_question_in_exam(&self, question_id: i64, published_only: bool) -> Result<bool> {
        self.is_question_in_exam_impl(question_id, published_only)
            .await
    }

    // 考试模块
    async fn create_exam(&self, created_by: i64, req: CreateExamRequest) -> Result<Exam> {
        self.create_exam_impl(created_by, req).await
    }

    async fn get_exam_by_id(&self, exam_id: i64) -> Result<Option<Exam>> {
        self.get_exam_by_id_impl(exam_id).await
    }

    async fn list_exams_with_pagination(
        &self,
        query: ExamListQuery,
        scope: ExamScope,
    ) -> Result<PaginatedResponse<Exam>> {
        self.list_exams_with_pagination_impl(query, scope).await
    }

    async fn update_exam(&self, exam_id: i64, update: UpdateExamRequest) -> Result<Option<Exam>> {
        self.update_exam_impl(exam_id, update).await
    }

    async fn set_exam_status(&self, exam_id: i64, status: ExamStatus) -> Result<bool> {
        self.set_exam_status_impl(exam_id, status).await
    }

    async fn delete_exam(&self, exam_id: i64) -> Result<bool> {
        self.delete_exam_impl(exam_id).await
    }

    async fn replace_exam_details(
        &self,
        exam_id: i64,
        questions: Vec<(i64, f64)>,
    ) -> Result<Vec<ExamDetail>> {
        self.replace_exam_details_impl(exam_id, questions).await
    }

    async fn list_exam_details(&self, exam_ids: &[i64]) -> Result<Vec<ExamDetail>> {
        self.list_exam_details_impl(exam_ids).await
    }

    async fn create_exam_assignment(
        &self,
        exam_id: i64,
        class_id: i64,
        assigned_by: i64,
    ) -> Result<ExamAssignment> {
        self.create_exam_assignment_impl(exam_id, class_id, assigned_by)
            .await
    }

    async fn delete_exam_assignment(&self, exam_id: i64, class_id: i64) -> Result<bool> {
        self.delete_exam_assignment_impl(exam_id, class_id).await
    }

    async fn list_exam_assignments(&self, exam_id: i64) -> Result<Vec<ExamAssignment>> {
        self.list_exam_assignments_impl(exam_id).await
    }

    async fn list_assigned_published_exams(&self) -> Result<Vec<(Exam, Vec<ExamAssignment>)>> {
        self.list_assigned_published_exams_impl().await
    }

    async fn is_exam_assigned_to_classes(&self, exam_id: i64, class_ids: &[i64]) -> Result<bool> {
        self.is_exam_assigned_to_classes_impl(exam_id, class_ids)
            .await
    }

    // 考试记录模块
    async fn start_result(&self, result: NewResult, max_attempts: i32) -> Result<AttemptStart> {
        self.start_result_impl(result, max_attempts).await
    }

    async fn get_result_by_id(&self, result_id: i64) -> Result<Option<ExamResult>> {
        self.get_result_by_id_impl(result_id).await
    }

    async fn find_in_progress_result(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamResult>> {
        self.find_in_progress_result_impl(exam_id, student_id).await
    }

    async fn count_attempts(&self, exam_id: i64, student_id: i64) -> Result<i64> {
        self.count_attempts_impl(exam_id, student_id).await
    }

    async fn count_results_by_exam(&self, exam_id: i64) -> Result<u64> {
        self.count_results_by_exam_impl(exam_id).await
    }

    async fn list_results_with_pagination(
        &self,
        query: ResultListQuery,
    ) -> Result<PaginatedResponse<ExamResult>> {
        self.list_results_with_pagination_impl(query).await
    }

    async fn list_results_by_exam(&self, exam_id: i64) -> Result<Vec<ExamResult>> {
        self.list_results_by_exam_impl(exam_id).await
    }

    async fn list_expired_in_progress_results(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ExamResult>> {
        self.list_expired_in_progress_results_impl(cutoff).await
    }

    async fn save_student_answer(
        &self,
        result_id: i64,
        question_id: i64,
        selected_answer_ids: Vec<i64>,
    ) -> Result<Option<StudentAnswer>> {
        self.save_student_answer_impl(result_id, question_id, selected_answer_ids)
            .await
    }

    async fn list_student_answers(&self, result_ids: &[i64]) -> Result<Vec<StudentAnswer>> {
        self.list_student_answers_impl(result_ids).await
    }

    async fn finalize_result(
        &self,
        result_id: i64,
        status: ResultStatus,
        grader: &Grader,
    ) -> Result<Option<ExamResult>> {
        self.finalize_result_impl(result_id, status, grader).await
    }

    // 通知模块
    async fn create_notifications(
        &self,
        user_ids: &[i64],
        req: CreateNotificationRequest,
    ) -> Result<Vec<Notification>> {
        self.create_notifications_impl(user_ids, req).await
    }

    async fn get_notification_by_id(&self, notification_id: i64) -> Result<Option<Notification>> {
        self.get_notification_by_id_impl(notification_id).await
    }

    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_with_pagination_impl(user_id, query)
            .await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool> {
        self.mark_notification_read_impl(notification_id).await
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_read_impl(user_id).await
    }

    async fn delete_notification(&self, notification_id: i64) -> Result<bool> {
        self.delete_notification_impl(notification_id).await
    }
}
