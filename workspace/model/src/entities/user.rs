use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

/// Represents a user of the system.
///
/// Credential and permission checks live in the `identity` crate as extension
/// traits on this model; the entity itself only carries the stored fields.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, indexed)]
    pub email: String,
    #[sea_orm(unique, indexed)]
    pub username: String,
    pub full_name: String,
    /// Argon2 PHC string, or an unusable marker starting with `!`.
    pub password: String,
    pub phone_number: String,
    pub date_of_birth: Date,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    #[sea_orm(default_value = "false")]
    pub is_staff: bool,
    #[sea_orm(default_value = "false")]
    pub is_superuser: bool,
    pub last_login: Option<DateTimeUtc>,
    /// Set once when the row is inserted.
    pub joined_at: DateTimeUtc,
    /// Touched on every save.
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
    #[sea_orm(has_many = "super::address::Entity")]
    Address,
    #[sea_orm(has_many = "super::notification::Entity")]
    Notification,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert && self.joined_at.is_not_set() {
            self.joined_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
