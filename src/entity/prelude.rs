//! 预导入模块，方便使用

pub use super::answers::{ActiveModel as AnswerActiveModel, Entity as Answers, Model as AnswerModel};
pub use super::chapters::{
    ActiveModel as ChapterActiveModel, Entity as Chapters, Model as ChapterModel,
};
pub use super::class_users::{
    ActiveModel as ClassUserActiveModel, Entity as ClassUsers, Model as ClassUserModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::exam_assignments::{
    ActiveModel as ExamAssignmentActiveModel, Entity as ExamAssignments,
    Model as ExamAssignmentModel,
};
pub use super::exam_details::{
    ActiveModel as ExamDetailActiveModel, Entity as ExamDetails, Model as ExamDetailModel,
};
pub use super::exams::{ActiveModel as ExamActiveModel, Entity as Exams, Model as ExamModel};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::questions::{
    ActiveModel as QuestionActiveModel, Entity as Questions, Model as QuestionModel,
};
pub use super::results::{ActiveModel as ResultActiveModel, Entity as Results, Model as ResultModel};
pub use super::student_answers::{
    ActiveModel as StudentAnswerActiveModel, Entity as StudentAnswers, Model as StudentAnswerModel,
};
pub use super::subjects::{
    ActiveModel as SubjectActiveModel, Entity as Subjects, Model as SubjectModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
