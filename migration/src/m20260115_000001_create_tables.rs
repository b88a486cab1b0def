use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表（队列服务账号）
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::Prompt).text().not_null())
                    .col(ColumnDef::new(Submissions::Rubric).text().not_null())
                    .col(ColumnDef::new(Submissions::StudentId).string().not_null())
                    .col(ColumnDef::new(Submissions::ProblemId).string().not_null())
                    .col(ColumnDef::new(Submissions::Location).string().not_null())
                    .col(ColumnDef::new(Submissions::CourseId).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::StudentResponse)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::StudentSubmissionTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::XqueueSubmissionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::XqueueSubmissionKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::XqueueQueueName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::MaxScore).integer().not_null())
                    .col(
                        ColumnDef::new(Submissions::GraderSettings)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::State).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::NextGraderType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::ClaimedBy).string().null())
                    // 提交身份元组的 SHA-256 指纹，唯一索引保证 get_or_create 原子性
                    .col(
                        ColumnDef::new(Submissions::DedupHash)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 认领查询索引：按位置和状态挑选待评提交
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_location_state")
                    .table(Submissions::Table)
                    .col(Submissions::Location)
                    .col(Submissions::State)
                    .to_owned(),
            )
            .await?;

        // 创建评分记录表
        manager
            .create_table(
                Table::create()
                    .table(GradeRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeRecords::Score).integer().not_null())
                    .col(ColumnDef::new(GradeRecords::Feedback).text().not_null())
                    .col(ColumnDef::new(GradeRecords::GraderId).string().not_null())
                    .col(ColumnDef::new(GradeRecords::GraderType).string().not_null())
                    .col(ColumnDef::new(GradeRecords::Status).string().not_null())
                    .col(ColumnDef::new(GradeRecords::Confidence).double().not_null())
                    .col(
                        ColumnDef::new(GradeRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 校准计数查询索引：按提交和评分人类型统计
        manager
            .create_index(
                Index::create()
                    .name("idx_grade_records_submission_grader_type")
                    .table(GradeRecords::Table)
                    .col(GradeRecords::SubmissionId)
                    .col(GradeRecords::GraderType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GradeRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    Status,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Submissions {
    Table,
    Id,
    Prompt,
    Rubric,
    StudentId,
    ProblemId,
    Location,
    CourseId,
    StudentResponse,
    StudentSubmissionTime,
    XqueueSubmissionId,
    XqueueSubmissionKey,
    XqueueQueueName,
    MaxScore,
    GraderSettings,
    State,
    NextGraderType,
    ClaimedBy,
    DedupHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeRecords {
    Table,
    Id,
    SubmissionId,
    Score,
    Feedback,
    GraderId,
    GraderType,
    Status,
    Confidence,
    CreatedAt,
}
