use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建考试表
        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exams::SubjectId).big_integer().not_null())
                    .col(ColumnDef::new(Exams::Title).string().not_null())
                    .col(ColumnDef::new(Exams::Description).text().null())
                    .col(
                        ColumnDef::new(Exams::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exams::StartTime).big_integer().not_null())
                    .col(ColumnDef::new(Exams::EndTime).big_integer().not_null())
                    .col(ColumnDef::new(Exams::PassScore).double().not_null())
                    .col(
                        ColumnDef::new(Exams::MaxAttempts)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Exams::ShuffleQuestions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::ShuffleAnswers)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::ShowResult)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Exams::Status).string().not_null())
                    .col(ColumnDef::new(Exams::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Exams::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Exams::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Exams::Table, Exams::SubjectId)
                            .to(Subjects::Table, Subjects::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Exams::Table, Exams::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建试卷题目表
        manager
            .create_table(
                Table::create()
                    .table(ExamDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamDetails::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExamDetails::ExamId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ExamDetails::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExamDetails::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(ExamDetails::Score).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamDetails::Table, ExamDetails::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamDetails::Table, ExamDetails::QuestionId)
                            .to(Questions::Table, Questions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试分配表
        manager
            .create_table(
                Table::create()
                    .table(ExamAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExamAssignments::ExamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamAssignments::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamAssignments::AssignedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamAssignments::AssignedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamAssignments::Table, ExamAssignments::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamAssignments::Table, ExamAssignments::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试记录表
        manager
            .create_table(
                Table::create()
                    .table(Results::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Results::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Results::ExamId).big_integer().not_null())
                    .col(ColumnDef::new(Results::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Results::AttemptNo).integer().not_null())
                    .col(ColumnDef::new(Results::Status).string().not_null())
                    .col(ColumnDef::new(Results::QuestionOrder).text().not_null())
                    .col(ColumnDef::new(Results::StartedAt).big_integer().not_null())
                    .col(ColumnDef::new(Results::DeadlineAt).big_integer().not_null())
                    .col(ColumnDef::new(Results::SubmittedAt).big_integer().null())
                    .col(
                        ColumnDef::new(Results::Score)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Results::MaxScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Results::CorrectCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Results::TotalQuestions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Results::Passed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Results::Table, Results::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Results::Table, Results::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作答表
        manager
            .create_table(
                Table::create()
                    .table(StudentAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentAnswers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::ResultId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::SelectedAnswerIds)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::IsCorrect)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::Score)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::AnsweredAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAnswers::Table, StudentAnswers::ResultId)
                            .to(Results::Table, Results::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exams_created_by")
                    .table(Exams::Table)
                    .col(Exams::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_exam_details_exam_question")
                    .table(ExamDetails::Table)
                    .col(ExamDetails::ExamId)
                    .col(ExamDetails::QuestionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_exam_assignments_exam_class")
                    .table(ExamAssignments::Table)
                    .col(ExamAssignments::ExamId)
                    .col(ExamAssignments::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_results_exam_student_attempt")
                    .table(Results::Table)
                    .col(Results::ExamId)
                    .col(Results::StudentId)
                    .col(Results::AttemptNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_results_status_deadline")
                    .table(Results::Table)
                    .col(Results::Status)
                    .col(Results::DeadlineAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_student_answers_result_question")
                    .table(StudentAnswers::Table)
                    .col(StudentAnswers::ResultId)
                    .col(StudentAnswers::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentAnswers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Results::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exams::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Classes {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Questions {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Exams {
    Table,
    Id,
    SubjectId,
    Title,
    Description,
    DurationMinutes,
    StartTime,
    EndTime,
    PassScore,
    MaxAttempts,
    ShuffleQuestions,
    ShuffleAnswers,
    ShowResult,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExamDetails {
    Table,
    Id,
    ExamId,
    QuestionId,
    OrderIndex,
    Score,
}

#[derive(DeriveIden)]
enum ExamAssignments {
    Table,
    Id,
    ExamId,
    ClassId,
    AssignedBy,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Results {
    Table,
    Id,
    ExamId,
    StudentId,
    AttemptNo,
    Status,
    QuestionOrder,
    StartedAt,
    DeadlineAt,
    SubmittedAt,
    Score,
    MaxScore,
    CorrectCount,
    TotalQuestions,
    Passed,
}

#[derive(DeriveIden)]
enum StudentAnswers {
    Table,
    Id,
    ResultId,
    QuestionId,
    SelectedAnswerIds,
    IsCorrect,
    Score,
    AnsweredAt,
}
