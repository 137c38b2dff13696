//! Credential and permission capabilities of a stored user.

use model::entities::user;

use crate::password;

/// Password checks on a stored user.
pub trait Credentials {
    fn check_password(&self, raw: &str) -> bool;
    fn has_usable_password(&self) -> bool;
}

impl Credentials for user::Model {
    fn check_password(&self, raw: &str) -> bool {
        password::verify_password(raw, &self.password)
    }

    fn has_usable_password(&self) -> bool {
        password::is_usable(&self.password)
    }
}

/// Permission lookups on a stored user.
///
/// There are no per-user permission grants: an active superuser holds every
/// permission and nobody else holds any.
pub trait Permissions {
    fn has_perm(&self, perm: &str) -> bool;
    fn can_access_admin(&self) -> bool;
}

impl Permissions for user::Model {
    fn has_perm(&self, _perm: &str) -> bool {
        self.is_active && self.is_superuser
    }

    fn can_access_admin(&self) -> bool {
        self.is_active && self.is_staff
    }
}
