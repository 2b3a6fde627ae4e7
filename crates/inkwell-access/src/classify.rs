//! Endpoint classification: which calls must never carry a credential.
//!
//! # Design
//! - One ordered rule list, first match wins, default Protected.
//! - The same [`Classifier`] value serves the outbound attach decision and the
//!   inbound 401 interpretation, so the two cannot drift apart.
//! - Paths are matched relative to the base path and without their query string.

use regex::Regex;

use crate::error::{AccessError, AccessResult};
use crate::transport::Method;

/// Whether a call may carry the credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Must never carry a credential, even when one exists.
    Public,
    /// Carries the credential whenever one exists.
    Protected,
}

/// Methods a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodFilter {
    /// Any method.
    Any,
    /// Only `GET`.
    GetOnly,
}

impl MethodFilter {
    const fn admits(self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::GetOnly => matches!(method, Method::Get),
        }
    }
}

/// One public-endpoint rule.
#[derive(Clone, Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    methods: MethodFilter,
}

impl Rule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::RuleCompile`] when `pattern` is not a valid regex.
    pub fn new(name: &'static str, pattern: &'static str, methods: MethodFilter) -> AccessResult<Self> {
        let compiled =
            Regex::new(pattern).map_err(|source| AccessError::RuleCompile { pattern, source })?;
        Ok(Self {
            name,
            pattern: compiled,
            methods,
        })
    }

    /// Rule identifier used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, path: &str, method: Method) -> bool {
        self.methods.admits(method) && self.pattern.is_match(path)
    }
}

/// Public-endpoint rules in evaluation order.
pub const PUBLIC_RULES: &[(&str, &str, MethodFilter)] = &[
    ("search", r"^/search", MethodFilter::Any),
    ("article-comments-rest", r"^/article/\d+/comments", MethodFilter::GetOnly),
    ("comment-list", r"^/article/comment(?:/list)?", MethodFilter::GetOnly),
    ("article-list-alias", r"^/article/list", MethodFilter::Any),
    ("article-home-alias", r"^/article/home", MethodFilter::Any),
    ("home-article-alias", r"^/home/article", MethodFilter::Any),
    ("article-published-alias", r"^/article/published", MethodFilter::Any),
    ("article-public-alias", r"^/article/public", MethodFilter::Any),
    ("public-detail", r"^/public-detail/", MethodFilter::Any),
    ("article-detail-page", r"^/article/detail-page", MethodFilter::Any),
    ("sms", r"^/api/sms/", MethodFilter::Any),
    ("register-by-phone", r"^/user/register-by-phone", MethodFilter::Any),
    ("login-by-phone", r"^/user/login-by-phone", MethodFilter::Any),
    ("check-phone", r"^/user/check-phone", MethodFilter::Any),
];

/// Ordered rule set mapping `(path, method)` to [`Access`].
#[derive(Clone, Debug)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// Build the standard rule set.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::RuleCompile`] if a built-in pattern fails to compile.
    pub fn standard() -> AccessResult<Self> {
        let rules = PUBLIC_RULES
            .iter()
            .map(|(name, pattern, methods)| Rule::new(name, pattern, *methods))
            .collect::<AccessResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Build a classifier from custom rules (evaluated in order).
    #[must_use]
    pub const fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Classify a call. `path` may include a query string; it is ignored.
    #[must_use]
    pub fn classify(&self, path: &str, method: Method) -> Access {
        self.matching_rule(path, method)
            .map_or(Access::Protected, |_| Access::Public)
    }

    /// Name of the first public rule matching the call, if any.
    #[must_use]
    pub fn matching_rule(&self, path: &str, method: Method) -> Option<&'static str> {
        let path = path.split_once('?').map_or(path, |(head, _)| head);
        self.rules
            .iter()
            .find(|rule| rule.matches(path, method))
            .map(Rule::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn standard_rules_match_public_surface() -> Result<()> {
        let classifier = Classifier::standard()?;
        let public = [
            ("/search", Method::Get),
            ("/search?keyword=rust", Method::Get),
            ("/article/12/comments", Method::Get),
            ("/article/comment", Method::Get),
            ("/article/comment/list", Method::Get),
            ("/article/list", Method::Post),
            ("/article/home", Method::Get),
            ("/home/article/detail", Method::Get),
            ("/article/published", Method::Get),
            ("/article/public/detail", Method::Get),
            ("/public-detail/3", Method::Get),
            ("/article/detail-page", Method::Get),
            ("/api/sms/send-code", Method::Post),
            ("/user/register-by-phone", Method::Post),
            ("/user/login-by-phone", Method::Post),
            ("/user/check-phone", Method::Get),
        ];
        for (path, method) in public {
            assert_eq!(
                classifier.classify(path, method),
                Access::Public,
                "{method} {path}"
            );
        }
        Ok(())
    }

    #[test]
    fn detail_and_management_paths_are_protected() -> Result<()> {
        let classifier = Classifier::standard()?;
        let protected = [
            ("/article", Method::Get),
            ("/article?id=3", Method::Get),
            ("/article/detail", Method::Get),
            ("/article/7", Method::Get),
            ("/article/detail/7", Method::Get),
            ("/article/7/comment", Method::Post),
            ("/article/comment", Method::Post),
            ("/article/comment/list", Method::Post),
            ("/article/12/comments", Method::Post),
            ("/user/userInfo", Method::Get),
            ("/category/list", Method::Get),
            ("/comment/add", Method::Post),
            ("/api/email/verify", Method::Post),
            ("/admin/users", Method::Get),
        ];
        for (path, method) in protected {
            assert_eq!(
                classifier.classify(path, method),
                Access::Protected,
                "{method} {path}"
            );
        }
        Ok(())
    }

    #[test]
    fn first_matching_rule_is_reported() -> Result<()> {
        let classifier = Classifier::standard()?;
        assert_eq!(
            classifier.matching_rule("/article/public/detail", Method::Get),
            Some("article-public-alias")
        );
        assert_eq!(classifier.matching_rule("/user/update", Method::Put), None);
        Ok(())
    }

    #[test]
    fn rule_compile_errors_are_reported() {
        let err = Rule::new("broken", r"^/article/(", MethodFilter::Any).err();
        assert!(matches!(err, Some(AccessError::RuleCompile { pattern, .. }) if pattern == r"^/article/("));
    }

    #[test]
    fn empty_rule_set_defaults_to_protected() {
        let classifier = Classifier::with_rules(Vec::new());
        assert_eq!(classifier.classify("/search", Method::Get), Access::Protected);
    }
}
