//! 运行时：启动/关闭流程与后台任务

pub mod exam_status;
pub mod lifetime;
