//! Permission checks.
//!
//! Permissions are strings in `"app_label.codename"` form. Inactive users
//! hold none, superusers hold all, and everyone else holds their direct
//! permissions plus those of any [`Group`] they belong to.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::user::AbstractUser;

/// A named set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub permissions: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    /// Adds a permission.
    #[must_use]
    pub fn with_permission(mut self, perm: impl Into<String>) -> Self {
        self.permissions.push(perm.into());
        self
    }
}

/// Returns the user's direct permissions.
pub fn get_all_permissions(user: &AbstractUser) -> HashSet<String> {
    user.user_permissions.iter().cloned().collect()
}

/// Returns the user's direct permissions plus those of the groups in
/// `groups` the user belongs to.
pub fn get_all_permissions_with_groups(user: &AbstractUser, groups: &[Group]) -> HashSet<String> {
    let mut perms = get_all_permissions(user);
    for group in groups.iter().filter(|g| user.in_group(&g.name)) {
        perms.extend(group.permissions.iter().cloned());
    }
    perms
}

/// Checks one permission.
pub fn has_perm(user: &AbstractUser, perm: &str) -> bool {
    has_perms_with_groups(user, &[perm], &[])
}

/// Checks that the user holds every permission in `perms`.
///
/// An empty list is held by every active user.
pub fn has_perms(user: &AbstractUser, perms: &[&str]) -> bool {
    has_perms_with_groups(user, perms, &[])
}

/// Like [`has_perms`], also counting permissions granted through `groups`.
pub fn has_perms_with_groups(user: &AbstractUser, perms: &[&str], groups: &[Group]) -> bool {
    if !user.is_active {
        return false;
    }
    if user.is_superuser {
        return true;
    }
    let held = get_all_permissions_with_groups(user, groups);
    perms.iter().all(|p| held.contains(*p))
}
