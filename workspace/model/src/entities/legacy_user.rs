use sea_orm::entity::prelude::*;

/// A row of the pre-migration identity table.
///
/// The table is read once by the legacy-user data migration and is never
/// written by the application. Phone numbers in this table were stored
/// without region validation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "legacy_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    /// Password hash as produced by the old system.
    pub password: String,
    pub phone_number: String,
    pub date_of_birth: Date,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
