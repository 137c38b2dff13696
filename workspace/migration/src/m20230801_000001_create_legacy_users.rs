use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Identity table of the previous schema version
        manager
            .create_table(
                Table::create()
                    .table(LegacyUsers::Table)
                    .if_not_exists()
                    .col(pk_auto(LegacyUsers::Id))
                    .col(string_len(LegacyUsers::Email, 255))
                    .col(string_len(LegacyUsers::Username, 255).unique_key())
                    .col(string_len(LegacyUsers::FullName, 255))
                    .col(string_len(LegacyUsers::Password, 128))
                    .col(string_len(LegacyUsers::PhoneNumber, 10))
                    .col(date(LegacyUsers::DateOfBirth))
                    .col(boolean(LegacyUsers::IsActive).default(true))
                    .col(boolean(LegacyUsers::IsStaff).default(false))
                    .col(boolean(LegacyUsers::IsSuperuser).default(false))
                    .col(timestamp_with_time_zone_null(LegacyUsers::LastLogin))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LegacyUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LegacyUsers {
    Table,
    Id,
    Email,
    Username,
    FullName,
    Password,
    PhoneNumber,
    DateOfBirth,
    IsActive,
    IsStaff,
    IsSuperuser,
    LastLogin,
}
