pub mod auth;

pub mod users;

pub mod classes;

pub mod class_users;

pub mod subjects;

pub mod questions;

pub mod exams;

pub mod results;

pub mod notifications;

pub mod system;

pub mod websocket;

pub use auth::configure_auth_routes;
pub use class_users::configure_class_users_routes;
pub use classes::configure_classes_routes;
pub use exams::configure_exams_routes;
pub use notifications::configure_notifications_routes;
pub use questions::configure_questions_routes;
pub use results::configure_results_routes;
pub use subjects::configure_subjects_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
pub use websocket::configure_websocket_routes;

use actix_web::web;

/// 注册全部 API 路由；班级成员路由必须先于班级路由注册
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_class_users_routes)
        .configure(configure_classes_routes)
        .configure(configure_subjects_routes)
        .configure(configure_questions_routes)
        .configure(configure_exams_routes)
        .configure(configure_results_routes)
        .configure(configure_notifications_routes)
        .configure(configure_system_routes)
        .configure(configure_websocket_routes);
}
