//! Default values for the access layer configuration.
//!
//! # Design
//! - Keep wire-level constants (paths, storage keys, state labels) in one place.
//! - Storage keys match what earlier client builds persisted so restores stay verbatim.

/// Prefix applied to every request path before it reaches the transport.
pub const BASE_PATH: &str = "/api";
/// Durable storage key holding the bearer credential.
pub const CREDENTIAL_KEY: &str = "token";
/// Durable storage key holding the cached user profile.
pub const PROFILE_KEY: &str = "userInfo";
/// Login screen path.
pub const LOGIN_ROUTE: &str = "/login";
/// Landing screen for authors.
pub const AUTHOR_LANDING_ROUTE: &str = "/admin/article/manage";
/// Landing screen for every other role.
pub const PERSONAL_CENTER_ROUTE: &str = "/admin/ucenter/mine";
/// Page number used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Article state label the server uses for published content.
pub const PUBLISHED_STATE: &str = "已发布";
/// Scheme prefix for bearer credentials.
pub const BEARER_PREFIX: &str = "Bearer ";
/// Header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Notice shown when a protected screen is opened without a credential.
pub const SIGN_IN_REQUIRED_MESSAGE: &str = "please sign in first";
/// Notice shown when the server rejects the credential mid-session.
pub const AUTH_FAILED_MESSAGE: &str = "authentication failed, please sign in again";
/// Notice shown when the profile cannot be loaded for a signed-in user.
pub const SESSION_EXPIRED_MESSAGE: &str = "your session has expired, please sign in again";
/// Notice shown when the role does not grant access to a screen.
pub const PERMISSION_DENIED_MESSAGE: &str = "you do not have permission to view this page";
