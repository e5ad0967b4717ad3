//! Users, permissions and login redirects.
//!
//! An authentication layer attaches a [`RequestUser`] to each request via
//! [`RequestUserExt::set_user`]; access checks read it back with
//! [`RequestUserExt::user`].

pub mod permissions;
pub mod request_user;
pub mod session_auth;
pub mod user;
pub mod views;

pub use permissions::Group;
pub use request_user::RequestUserExt;
pub use user::{AbstractUser, AnonymousUser, RequestUser};
pub use views::{logout_then_login, redirect_to_login};
