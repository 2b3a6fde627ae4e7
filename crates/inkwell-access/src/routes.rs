//! Declarative screen table consumed by the route guard.

use crate::model::Role;

/// Upper bound on chained static redirects.
const MAX_REDIRECT_HOPS: usize = 8;

/// One screen of the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteRecord {
    /// Path pattern; `:name` segments match any single segment.
    pub path: &'static str,
    /// Screen name used in logs and CLI output.
    pub name: &'static str,
    /// Whether this screen and everything below it requires a credential.
    pub requires_auth: bool,
    /// Roles allowed on this screen and everything below it; `None` means any role.
    pub roles: Option<&'static [Role]>,
    /// Static redirect applied before the guard runs.
    pub redirect: Option<&'static str>,
}

impl RouteRecord {
    const fn open(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            requires_auth: false,
            roles: None,
            redirect: None,
        }
    }

    const fn private(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            requires_auth: true,
            roles: None,
            redirect: None,
        }
    }

    const fn redirecting(self, target: &'static str) -> Self {
        Self {
            redirect: Some(target),
            ..self
        }
    }

    const fn restricted(self, roles: &'static [Role]) -> Self {
        Self {
            roles: Some(roles),
            ..self
        }
    }

    fn matches(&self, path: &str) -> bool {
        let mut pattern = self.path.split('/');
        let mut actual = path.split('/');
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(expected), Some(segment)) => {
                    let param = expected.starts_with(':') && !segment.is_empty();
                    if !param && expected != segment {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    fn covers(&self, path: &str) -> bool {
        is_under(path, self.path)
    }
}

const AUTHOR_ONLY: &[Role] = &[Role::Author];

/// Screens of the blog client.
pub const STANDARD_ROUTES: &[RouteRecord] = &[
    RouteRecord::open("/login", "login"),
    RouteRecord::open("/", "home"),
    RouteRecord::open("/category/:id", "category"),
    RouteRecord::open("/search", "search"),
    RouteRecord::open("/article/:id", "article"),
    RouteRecord::private("/admin", "admin").redirecting("/admin/ucenter/mine"),
    RouteRecord::private("/admin/user/avatar", "user-avatar"),
    RouteRecord::private("/admin/user/info", "user-info"),
    RouteRecord::private("/admin/user/resetPassword", "user-reset-password"),
    RouteRecord::private("/admin/ucenter/mine", "ucenter").redirecting("/admin/ucenter/collect"),
    RouteRecord::private("/admin/ucenter/collect", "ucenter-collect"),
    RouteRecord::private("/admin/ucenter/follow", "ucenter-follow"),
    RouteRecord::private("/admin/ucenter/fans", "ucenter-fans"),
    RouteRecord::private("/admin/author/author", "author-apply"),
    RouteRecord::private("/admin/article/category", "article-category").restricted(AUTHOR_ONLY),
    RouteRecord::private("/admin/article/manage", "article-manage").restricted(AUTHOR_ONLY),
];

/// Lookup structure over [`RouteRecord`]s.
#[derive(Clone, Debug)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    /// Table for the standard screens.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_ROUTES.to_vec())
    }

    /// Table over custom records.
    #[must_use]
    pub const fn new(records: Vec<RouteRecord>) -> Self {
        Self { records }
    }

    /// Record whose pattern matches `path` exactly.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&RouteRecord> {
        let path = strip_query(path);
        self.records.iter().find(|record| record.matches(path))
    }

    /// Follow static redirects starting at `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        let mut current = strip_query(path).to_string();
        for _ in 0..MAX_REDIRECT_HOPS {
            match self.find(&current).and_then(|record| record.redirect) {
                Some(target) if target != current => current = target.to_string(),
                _ => break,
            }
        }
        current
    }

    /// Whether `path` sits under any screen that requires a credential.
    #[must_use]
    pub fn requires_auth(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.records
            .iter()
            .any(|record| record.requires_auth && record.covers(path))
    }

    /// Roles allowed on `path`, from the most specific restricted screen covering it.
    #[must_use]
    pub fn allowed_roles(&self, path: &str) -> Option<&'static [Role]> {
        let path = strip_query(path);
        self.records
            .iter()
            .filter(|record| record.covers(path))
            .filter_map(|record| record.roles.map(|roles| (record.path.len(), roles)))
            .max_by_key(|(len, _)| *len)
            .map(|(_, roles)| roles)
    }

    /// Whether `role` may open `path`.
    #[must_use]
    pub fn permits(&self, path: &str, role: Role) -> bool {
        self.allowed_roles(path)
            .is_none_or(|roles| roles.contains(&role))
    }
}

/// `path` equals `prefix` or lies below it.
#[must_use]
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_chain_to_collect_screen() {
        let table = RouteTable::standard();
        assert_eq!(table.resolve("/admin"), "/admin/ucenter/collect");
        assert_eq!(table.resolve("/admin/ucenter/mine"), "/admin/ucenter/collect");
        assert_eq!(table.resolve("/article/5?from=home"), "/article/5");
    }

    #[test]
    fn admin_subtree_requires_auth() {
        let table = RouteTable::standard();
        assert!(table.requires_auth("/admin"));
        assert!(table.requires_auth("/admin/ucenter/fans"));
        assert!(table.requires_auth("/admin/unknown/screen"));
        assert!(!table.requires_auth("/administrator"));
        assert!(!table.requires_auth("/"));
        assert!(!table.requires_auth("/article/3"));
        assert!(!table.requires_auth("/login"));
    }

    #[test]
    fn author_screens_are_restricted() {
        let table = RouteTable::standard();
        assert!(table.permits("/admin/article/manage", Role::Author));
        assert!(!table.permits("/admin/article/manage", Role::User));
        assert!(!table.permits("/admin/article/category/edit", Role::Admin));
        assert!(table.permits("/admin/ucenter/collect", Role::User));
    }

    #[test]
    fn params_match_single_segments() {
        let table = RouteTable::standard();
        assert_eq!(table.find("/category/4").map(|r| r.name), Some("category"));
        assert_eq!(table.find("/category/"), None);
        assert_eq!(table.find("/category/4/extra"), None);
        assert_eq!(table.find("/").map(|r| r.name), Some("home"));
    }
}
