use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;

    /// 班级管理方法
    // 创建班级，创建者同时以教师身份加入
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 通过邀请码获取班级信息
    async fn get_class_by_code(&self, invite_code: &str) -> Result<Option<Class>>;
    // 列出班级
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    // 更新班级信息
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    // 删除班级
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 班级成员管理方法
    // 加入班级
    async fn join_class(
        &self,
        user_id: i64,
        class_id: i64,
        role: ClassUserRole,
    ) -> Result<ClassUser>;
    // 离开/移出班级
    async fn leave_class(&self, user_id: i64, class_id: i64) -> Result<bool>;
    // 更新班级成员角色
    async fn update_class_user(
        &self,
        class_id: i64,
        class_user_id: i64,
        update: UpdateClassUserRequest,
    ) -> Result<Option<ClassUser>>;
    // 通过ID获取班级成员
    async fn get_class_user_by_id(
        &self,
        class_id: i64,
        class_user_id: i64,
    ) -> Result<Option<ClassUser>>;
    // 列出班级成员
    async fn list_class_members_with_pagination(
        &self,
        class_id: i64,
        query: ClassUserListQuery,
    ) -> Result<ClassMemberListResponse>;
    // 列出用户所在的班级
    async fn list_user_classes_with_pagination(
        &self,
        user_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    // 获取用户在班级中的信息
    async fn get_class_user_by_user_id_and_class_id(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>>;
    // 班级成员数量
    async fn count_class_members(&self, class_id: i64) -> Result<i64>;
    // 用户所在的全部班级 ID
    async fn list_user_class_ids(&self, user_id: i64) -> Result<Vec<i64>>;
    // 若干班级中的学生 ID（去重）
    async fn list_class_student_ids(&self, class_ids: &[i64]) -> Result<Vec<i64>>;

    /// 科目与章节
    async fn create_subject(&self, created_by: i64, req: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>>;
    async fn get_subject_by_code(&self, code: &str) -> Result<Option<Subject>>;
    async fn list_subjects_with_pagination(
        &self,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse>;
    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, subject_id: i64) -> Result<bool>;
    // 是否仍被题目或考试引用
    async fn is_subject_in_use(&self, subject_id: i64) -> Result<bool>;
    async fn create_chapter(&self, subject_id: i64, req: CreateChapterRequest) -> Result<Chapter>;
    async fn get_chapter_by_id(&self, chapter_id: i64) -> Result<Option<Chapter>>;
    async fn list_chapters(&self, subject_id: i64) -> Result<Vec<Chapter>>;
    async fn update_chapter(
        &self,
        chapter_id: i64,
        update: UpdateChapterRequest,
    ) -> Result<Option<Chapter>>;
    async fn delete_chapter(&self, chapter_id: i64) -> Result<bool>;

    /// 题库
    // 创建题目及其选项
    async fn create_question(
        &self,
        created_by: i64,
        req: CreateQuestionRequest,
    ) -> Result<Question>;
    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>>;
    async fn get_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>>;
    async fn list_questions_with_pagination(
        &self,
        query: QuestionListQuery,
    ) -> Result<QuestionListResponse>;
    // 科目下所有启用的题目，用于随机组卷
    async fn list_active_questions(&self, subject_id: i64) -> Result<Vec<Question>>;
    async fn count_questions_by_subject(&self, subject_id: i64) -> Result<i64>;
    // 更新题目，提供选项时整体替换
    async fn update_question(
        &self,
        question_id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>>;
    async fn delete_question(&self, question_id: i64) -> Result<bool>;
    // 是否被任意考试引用；published_only 时只看已发布的考试
    async fn is_question_in_exam(&self, question_id: i64, published_only: bool) -> Result<bool>;

    /// 考试
    async fn create_exam(&self, created_by: i64, req: CreateExamRequest) -> Result<Exam>;
    async fn get_exam_by_id(&self, exam_id: i64) -> Result<Option<Exam>>;
    async fn list_exams_with_pagination(
        &self,
        query: ExamListQuery,
        scope: ExamScope,
    ) -> Result<PaginatedResponse<Exam>>;
    async fn update_exam(&self, exam_id: i64, update: UpdateExamRequest) -> Result<Option<Exam>>;
    async fn set_exam_status(&self, exam_id: i64, status: ExamStatus) -> Result<bool>;
    async fn delete_exam(&self, exam_id: i64) -> Result<bool>;
    // 整体替换试卷题目 (question_id, score)
    async fn replace_exam_details(
        &self,
        exam_id: i64,
        questions: Vec<(i64, f64)>,
    ) -> Result<Vec<ExamDetail>>;
    async fn list_exam_details(&self, exam_ids: &[i64]) -> Result<Vec<ExamDetail>>;
    async fn create_exam_assignment(
        &self,
        exam_id: i64,
        class_id: i64,
        assigned_by: i64,
    ) -> Result<ExamAssignment>;
    async fn delete_exam_assignment(&self, exam_id: i64, class_id: i64) -> Result<bool>;
    async fn list_exam_assignments(&self, exam_id: i64) -> Result<Vec<ExamAssignment>>;
    // 已发布且至少分配给一个班级的考试及其分配
    async fn list_assigned_published_exams(&self) -> Result<Vec<(Exam, Vec<ExamAssignment>)>>;
    // 考试是否分配到任一给定班级
    async fn is_exam_assigned_to_classes(&self, exam_id: i64, class_ids: &[i64]) -> Result<bool>;

    /// 考试记录与作答
    // 在事务内检查未交卷作答与次数上限后创建
    async fn start_result(&self, result: NewResult, max_attempts: i32) -> Result<AttemptStart>;
    async fn get_result_by_id(&self, result_id: i64) -> Result<Option<ExamResult>>;
    async fn find_in_progress_result(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamResult>>;
    async fn count_attempts(&self, exam_id: i64, student_id: i64) -> Result<i64>;
    async fn count_results_by_exam(&self, exam_id: i64) -> Result<u64>;
    async fn list_results_with_pagination(
        &self,
        query: ResultListQuery,
    ) -> Result<PaginatedResponse<ExamResult>>;
    async fn list_results_by_exam(&self, exam_id: i64) -> Result<Vec<ExamResult>>;
    // 截止时间早于 cutoff 的作答中记录
    async fn list_expired_in_progress_results(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ExamResult>>;
    // 作答已结束时返回 None
    async fn save_student_answer(
        &self,
        result_id: i64,
        question_id: i64,
        selected_answer_ids: Vec<i64>,
    ) -> Result<Option<StudentAnswer>>;
    async fn list_student_answers(&self, result_ids: &[i64]) -> Result<Vec<StudentAnswer>>;
    // 结束作答并在同一事务内判分；记录已不在作答中时返回 None
    async fn finalize_result(
        &self,
        result_id: i64,
        status: ResultStatus,
        grader: &Grader,
    ) -> Result<Option<ExamResult>>;

    /// 通知：给多个用户发送同一通知
    async fn create_notifications(
        &self,
        user_ids: &[i64],
        req: CreateNotificationRequest,
    ) -> Result<Vec<Notification>>;
    async fn get_notification_by_id(&self, notification_id: i64) -> Result<Option<Notification>>;
    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64>;
    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<i64>;
    async fn delete_notification(&self, notification_id: i64) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
