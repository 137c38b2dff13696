use chrono::Utc;
use model::entities::{legacy_user, profile, user};
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, TransactionTrait};
use sea_orm_migration::prelude::*;
use tracing::{debug, info, trace};

/// Rows per insert statement. Twelve bind parameters per user keep a batch
/// well under the SQLite and PostgreSQL limits.
pub const COPY_BATCH_SIZE: usize = 500;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        copy_legacy_users(manager.get_connection()).await?;
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Copied rows are dropped together with their tables by the previous
        // migration's `down`.
        Ok(())
    }
}

/// Copies every legacy user into the current `users` table and gives each
/// copied user an empty profile.
///
/// The whole legacy table is loaded in one read. Users are written in batches
/// of [`COPY_BATCH_SIZE`] whose `RETURNING` rows are collected and used
/// directly to build the profile batches, so the profile writes need no extra
/// query. Every write shares one transaction: any failure leaves neither
/// users nor profiles behind.
///
/// Password hashes and phone numbers are copied verbatim; phone numbers are
/// not checked against the current region format.
///
/// Not idempotent. A second run against the same legacy rows fails on the
/// `users` uniqueness constraints and rolls back.
///
/// Returns the number of migrated users.
pub async fn copy_legacy_users<C>(db: &C) -> Result<usize, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    trace!("Entering copy_legacy_users function");

    let txn = db.begin().await?;

    let legacy_users = legacy_user::Entity::find().all(&txn).await?;
    info!("Loaded {} legacy users", legacy_users.len());

    if legacy_users.is_empty() {
        txn.commit().await?;
        debug!("Nothing to migrate");
        return Ok(0);
    }

    let now = Utc::now();
    let new_users: Vec<user::ActiveModel> = legacy_users
        .into_iter()
        .map(|old| user::ActiveModel {
            email: Set(old.email),
            username: Set(old.username),
            full_name: Set(old.full_name),
            password: Set(old.password),
            phone_number: Set(old.phone_number),
            date_of_birth: Set(old.date_of_birth),
            is_active: Set(old.is_active),
            is_staff: Set(old.is_staff),
            is_superuser: Set(old.is_superuser),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .collect();

    let mut created = Vec::with_capacity(new_users.len());
    for chunk in new_users.chunks(COPY_BATCH_SIZE) {
        let inserted = user::Entity::insert_many(chunk.to_vec())
            .exec_with_returning_many(&txn)
            .await?;
        trace!("Inserted batch of {} users", inserted.len());
        created.extend(inserted);
    }
    debug!("Inserted {} users", created.len());

    let mut profile_rows = 0;
    for chunk in created.chunks(COPY_BATCH_SIZE) {
        let profiles = chunk.iter().map(|new_user| profile::ActiveModel {
            user_id: Set(new_user.id),
            ..Default::default()
        });
        profile_rows += profile::Entity::insert_many(profiles)
            .exec_without_returning(&txn)
            .await?;
    }
    debug!("Inserted {} profiles", profile_rows);

    txn.commit().await?;

    info!("Migrated {} legacy users", created.len());
    Ok(created.len())
}
