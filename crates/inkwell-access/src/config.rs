//! Runtime configuration for the access layer.

use crate::defaults::{
    AUTHOR_LANDING_ROUTE, BASE_PATH, CREDENTIAL_KEY, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, LOGIN_ROUTE,
    PERSONAL_CENTER_ROUTE, PROFILE_KEY, PUBLISHED_STATE,
};

/// Settings shared by the pipeline, resolver plans and guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessConfig {
    /// Path prefix added to every request (rewritten upstream by the dev proxy).
    pub base_path: String,
    /// Storage key for the credential document.
    pub credential_key: String,
    /// Storage key for the profile document.
    pub profile_key: String,
    /// Login screen path.
    pub login_route: String,
    /// Landing screen for the author role.
    pub author_landing: String,
    /// Landing screen for every other role.
    pub personal_center: String,
    /// Page number applied when a query omits one.
    pub default_page: u32,
    /// Page size applied when a query omits one.
    pub default_page_size: u32,
    /// State label used to restrict anonymous listings to published articles.
    pub published_state: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            base_path: BASE_PATH.to_string(),
            credential_key: CREDENTIAL_KEY.to_string(),
            profile_key: PROFILE_KEY.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
            author_landing: AUTHOR_LANDING_ROUTE.to_string(),
            personal_center: PERSONAL_CENTER_ROUTE.to_string(),
            default_page: DEFAULT_PAGE,
            default_page_size: DEFAULT_PAGE_SIZE,
            published_state: PUBLISHED_STATE.to_string(),
        }
    }
}

impl AccessConfig {
    /// Override the request base path, trimming any trailing slash.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let value = base_path.into();
        self.base_path = value.trim_end_matches('/').to_string();
        self
    }

    /// Join the base path with a request path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_path)
        } else {
            format!("{}/{path}", self.base_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AccessConfig;

    #[test]
    fn url_for_prefixes_base_path() {
        let config = AccessConfig::default();
        assert_eq!(config.url_for("/article/list"), "/api/article/list");
        assert_eq!(config.url_for("search"), "/api/search");
    }

    #[test]
    fn with_base_path_trims_trailing_slash() {
        let config = AccessConfig::default().with_base_path("/gateway/");
        assert_eq!(config.url_for("/user/userInfo"), "/gateway/user/userInfo");
    }

    #[test]
    fn empty_base_path_passes_paths_through() {
        let config = AccessConfig::default().with_base_path("");
        assert_eq!(config.url_for("/search"), "/search");
    }
}
