//! Attaching the current user to a request.

use brackets_http::HttpRequest;

use crate::user::RequestUser;

/// Access to the user an authentication layer attached to a request.
///
/// # Examples
///
/// ```
/// use brackets_auth::{AbstractUser, RequestUserExt};
/// use brackets_http::HttpRequest;
///
/// let mut request = HttpRequest::builder().build();
/// assert!(request.user().is_none());
///
/// request.set_user(AbstractUser::new("ada"));
/// assert_eq!(request.user().map(|u| u.get_username()), Some("ada"));
/// ```
pub trait RequestUserExt {
    /// Returns the attached user, or `None` when no authentication layer ran.
    fn user(&self) -> Option<&RequestUser>;

    /// Attaches `user`, replacing any previous one.
    fn set_user(&mut self, user: impl Into<RequestUser>);

    /// Returns `true` if an authenticated user is attached.
    fn is_user_authenticated(&self) -> bool {
        self.user().is_some_and(RequestUser::is_authenticated)
    }
}

impl RequestUserExt for HttpRequest {
    fn user(&self) -> Option<&RequestUser> {
        self.extensions().get::<RequestUser>()
    }

    fn set_user(&mut self, user: impl Into<RequestUser>) {
        self.extensions_mut().insert(user.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{AbstractUser, AnonymousUser};

    #[test]
    fn test_no_user_attached() {
        let request = HttpRequest::builder().build();
        assert!(request.user().is_none());
        assert!(!request.is_user_authenticated());
    }

    #[test]
    fn test_set_user_replaces() {
        let mut request = HttpRequest::builder().build();
        request.set_user(AnonymousUser);
        assert!(!request.is_user_authenticated());
        request.set_user(AbstractUser::new("ada"));
        assert!(request.is_user_authenticated());
    }

    #[test]
    fn test_builder_extension_is_visible() {
        let request = HttpRequest::builder()
            .extension(RequestUser::user(AbstractUser::new("grace")))
            .build();
        assert_eq!(request.user().map(RequestUser::get_username), Some("grace"));
    }
}
