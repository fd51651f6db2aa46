pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_classes;
mod m20250301_000002_create_question_bank;
mod m20250301_000003_create_exams;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_classes::Migration),
            Box::new(m20250301_000002_create_question_bank::Migration),
            Box::new(m20250301_000003_create_exams::Migration),
        ]
    }
}
