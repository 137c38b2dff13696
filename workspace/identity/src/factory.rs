//! Stateless construction of new users.
//!
//! [`create_user`] and [`create_superuser`] take raw field values and return a
//! [`NewUser`] whose email is normalized, phone number validated and password
//! hashed. Nothing is written here; hand the result to
//! [`UserStore::create`](crate::store::UserStore::create).

use chrono::{NaiveDate, Utc};
use model::entities::user;
use sea_orm::Set;
use tracing::{debug, trace};

use crate::email::clean_email;
use crate::error::{IdentityError, Result};
use crate::password;
use crate::phone::{PhoneRegion, clean_phone_number};

const MAX_NAME_LENGTH: usize = 255;

/// Raw input for a new user.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    /// `None` leaves the user with an unusable password.
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Regular,
    Superuser,
}

/// A validated user that has not been written yet.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    password: String,
}

// The hash stays out of logs.
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("phone_number", &self.phone_number)
            .field("date_of_birth", &self.date_of_birth)
            .field("is_active", &self.is_active)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Replace the password with an already computed hash.
    ///
    /// Used by bulk generators that hash one shared password once.
    pub fn with_password_hash(mut self, hash: String) -> Self {
        self.password = hash;
        self
    }

    pub fn password_hash(&self) -> &str {
        &self.password
    }

    /// Active model ready for insertion. Timestamps are filled in because
    /// batch inserts skip the entity's save hook.
    pub fn into_active_model(self) -> user::ActiveModel {
        let now = Utc::now();
        user::ActiveModel {
            email: Set(self.email),
            username: Set(self.username),
            full_name: Set(self.full_name),
            password: Set(self.password),
            phone_number: Set(self.phone_number),
            date_of_birth: Set(self.date_of_birth),
            is_active: Set(self.is_active),
            is_staff: Set(self.is_staff),
            is_superuser: Set(self.is_superuser),
            last_login: Set(None),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

/// Build an ordinary user: active, not staff, not superuser.
pub fn create_user(fields: UserFields, region: PhoneRegion) -> Result<NewUser> {
    build(fields, Role::Regular, region)
}

/// Build a superuser: active, staff and superuser.
pub fn create_superuser(fields: UserFields, region: PhoneRegion) -> Result<NewUser> {
    build(fields, Role::Superuser, region)
}

fn build(fields: UserFields, role: Role, region: PhoneRegion) -> Result<NewUser> {
    trace!("Building {:?} user '{}'", role, fields.username);

    let username = clean_username(&fields.username)?;
    let email = clean_email(&fields.email)?;
    let full_name = clean_full_name(&fields.full_name)?;
    let phone_number = clean_phone_number(&fields.phone_number, region)?;

    let password = match fields.password.as_deref() {
        Some(raw) => password::hash_password(raw)?,
        None => {
            debug!("No password given for '{}', marking it unusable", username);
            password::unusable_password()
        }
    };

    let elevated = role == Role::Superuser;
    Ok(NewUser {
        email,
        username,
        full_name,
        phone_number,
        date_of_birth: fields.date_of_birth,
        is_active: true,
        is_staff: elevated,
        is_superuser: elevated,
        password,
    })
}

pub(crate) fn clean_username(username: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(IdentityError::validation("username", "Username is required"));
    }
    if username.chars().count() > MAX_NAME_LENGTH {
        return Err(IdentityError::validation(
            "username",
            format!("Username must be at most {} characters long", MAX_NAME_LENGTH),
        ));
    }
    Ok(username.to_string())
}

pub(crate) fn clean_full_name(full_name: &str) -> Result<String> {
    let full_name = full_name.trim();
    if full_name.chars().count() > MAX_NAME_LENGTH {
        return Err(IdentityError::validation(
            "full_name",
            format!("Full name must be at most {} characters long", MAX_NAME_LENGTH),
        ));
    }
    Ok(full_name.to_string())
}
