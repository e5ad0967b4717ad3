//! User models.
//!
//! [`AbstractUser`] is a full user account; [`AnonymousUser`] stands in for
//! visitors who have not logged in. [`RequestUser`] is what an
//! authentication layer attaches to a request and what access checks read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permissions;

/// A user account with identity fields, flags, groups and permissions.
///
/// # Examples
///
/// ```
/// use brackets_auth::AbstractUser;
///
/// let user = AbstractUser::new("ada")
///     .with_groups(&["editors"])
///     .with_permissions(&["blog.add_post"]);
/// assert!(user.is_authenticated());
/// assert!(user.has_perm("blog.add_post"));
/// assert!(!user.has_perm("blog.delete_post"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractUser {
    /// The unique username.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Inactive users hold no permissions.
    pub is_active: bool,
    pub is_staff: bool,
    /// Superusers hold every permission.
    pub is_superuser: bool,
    /// When the user last logged in, if ever.
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    /// Names of the groups the user belongs to.
    pub groups: Vec<String>,
    /// Permissions assigned directly, as `"app_label.codename"`.
    pub user_permissions: Vec<String>,
}

impl AbstractUser {
    /// Creates an active user with no flags, groups or permissions.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: Utc::now(),
            groups: Vec::new(),
            user_permissions: Vec::new(),
        }
    }

    /// Sets the group memberships.
    #[must_use]
    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the direct permissions.
    #[must_use]
    pub fn with_permissions(mut self, perms: &[&str]) -> Self {
        self.user_permissions = perms.iter().map(ToString::to_string).collect();
        self
    }

    /// Marks the user as staff.
    #[must_use]
    pub const fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Marks the user as staff and superuser.
    #[must_use]
    pub const fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }

    /// Marks the user as inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Sets the last login time.
    #[must_use]
    pub const fn logged_in_at(mut self, when: DateTime<Utc>) -> Self {
        self.last_login = Some(when);
        self
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Returns `"first last"`, trimmed.
    pub fn get_full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Always `true` for a real account.
    pub const fn is_authenticated(&self) -> bool {
        true
    }

    /// Checks one permission. See [`permissions::has_perm`].
    pub fn has_perm(&self, perm: &str) -> bool {
        permissions::has_perm(self, perm)
    }

    /// Checks that every permission in `perms` is held.
    pub fn has_perms(&self, perms: &[&str]) -> bool {
        permissions::has_perms(self, perms)
    }

    /// Returns `true` if the user belongs to `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// A visitor who has not logged in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousUser;

impl AnonymousUser {
    pub const fn new() -> Self {
        Self
    }

    /// Always `false`.
    pub const fn is_authenticated(&self) -> bool {
        false
    }

    /// Always `""`.
    pub const fn get_username(&self) -> &'static str {
        ""
    }
}

/// The user attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUser {
    /// A logged-in account.
    User(Box<AbstractUser>),
    /// A visitor.
    Anonymous(AnonymousUser),
}

impl RequestUser {
    /// Wraps an account.
    pub fn user(user: AbstractUser) -> Self {
        Self::User(Box::new(user))
    }

    /// The anonymous visitor.
    pub const fn anonymous() -> Self {
        Self::Anonymous(AnonymousUser)
    }

    /// Returns the account, if any.
    pub fn as_user(&self) -> Option<&AbstractUser> {
        match self {
            Self::User(user) => Some(user),
            Self::Anonymous(_) => None,
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    pub const fn is_anonymous(&self) -> bool {
        !self.is_authenticated()
    }

    pub fn is_active(&self) -> bool {
        self.as_user().is_some_and(|u| u.is_active)
    }

    pub fn is_staff(&self) -> bool {
        self.as_user().is_some_and(|u| u.is_staff)
    }

    pub fn is_superuser(&self) -> bool {
        self.as_user().is_some_and(|u| u.is_superuser)
    }

    pub fn get_username(&self) -> &str {
        match self {
            Self::User(user) => &user.username,
            Self::Anonymous(anon) => anon.get_username(),
        }
    }

    /// Group names; empty for visitors.
    pub fn groups(&self) -> &[String] {
        self.as_user().map(|u| u.groups.as_slice()).unwrap_or_default()
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.as_user().and_then(|u| u.last_login)
    }

    /// Visitors hold no permissions.
    pub fn has_perm(&self, perm: &str) -> bool {
        self.as_user().is_some_and(|u| u.has_perm(perm))
    }

    /// Visitors hold no permissions, not even an empty set.
    pub fn has_perms(&self, perms: &[&str]) -> bool {
        self.as_user().is_some_and(|u| u.has_perms(perms))
    }
}

impl From<AbstractUser> for RequestUser {
    fn from(user: AbstractUser) -> Self {
        Self::user(user)
    }
}

impl From<AnonymousUser> for RequestUser {
    fn from(anon: AnonymousUser) -> Self {
        Self::Anonymous(anon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = AbstractUser::new("ada");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert!(user.last_login.is_none());
        assert_eq!(user.get_username(), "ada");
    }

    #[test]
    fn test_builders() {
        let when = Utc::now();
        let user = AbstractUser::new("root").superuser().logged_in_at(when);
        assert!(user.is_staff && user.is_superuser);
        assert_eq!(user.last_login, Some(when));
        assert!(!AbstractUser::new("x").inactive().is_active);
    }

    #[test]
    fn test_full_name() {
        let mut user = AbstractUser::new("ada");
        user.first_name = "Ada".to_string();
        assert_eq!(user.get_full_name(), "Ada");
        user.last_name = "Lovelace".to_string();
        assert_eq!(user.get_full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_request_user_anonymous() {
        let anon = RequestUser::anonymous();
        assert!(!anon.is_authenticated());
        assert!(anon.is_anonymous());
        assert!(!anon.is_staff());
        assert!(anon.groups().is_empty());
        assert!(!anon.has_perm("x.y"));
        assert!(!anon.has_perms(&[]));
        assert_eq!(anon.get_username(), "");
    }

    #[test]
    fn test_request_user_account() {
        let user: RequestUser = AbstractUser::new("ada")
            .staff()
            .with_groups(&["editors"])
            .into();
        assert!(user.is_authenticated());
        assert!(user.is_staff());
        assert!(!user.is_superuser());
        assert_eq!(user.groups(), ["editors".to_string()]);
        assert_eq!(user.get_username(), "ada");
    }
}
