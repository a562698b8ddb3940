//! Static endpoint access policy.
//!
//! Maps a request path to the authentication it requires. Rules are
//! Ant-style patterns:
//! - literal segments match exactly
//! - `*` matches exactly one segment
//! - `**` (last segment only) matches zero or more trailing segments
//!
//! The most specific matching rule wins; ties go to the earlier rule.
//! A path no rule matches requires authentication.

use std::str::FromStr;

use thiserror::Error;

pub const PUBLIC_ENDPOINTS: &[&str] = &["/v3/api-docs/**", "/swagger-ui/**", "/swagger-ui.html"];

pub const LOGIN_URI: &str = "/v1/oauth/login";
pub const LOGOUT_URI: &str = "/v1/oauth/logout";
pub const HEALTH_URI: &str = "/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("'**' is only allowed as the last segment: {0}")]
    MisplacedTail(String),
    #[error("wildcards must span a whole segment: {0}")]
    PartialWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Tail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i + 1 == parts.len() => Segment::Tail,
                "**" => return Err(PatternError::MisplacedTail(raw.to_string())),
                "*" => Segment::Any,
                p if p.contains('*') => return Err(PatternError::PartialWildcard(raw.to_string())),
                p => Segment::Literal(p.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/').filter(|s| !s.is_empty());

        for segment in &self.segments {
            match segment {
                Segment::Tail => return true,
                Segment::Any => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(lit) => match parts.next() {
                    Some(p) if p == lit => {}
                    _ => return false,
                },
            }
        }

        parts.next().is_none()
    }

    // (literal segments, total segments, no trailing `**`), compared lexicographically
    fn specificity(&self) -> (usize, usize, bool) {
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count();
        let has_tail = matches!(self.segments.last(), Some(Segment::Tail));
        (literals, self.segments.len(), !has_tail)
    }
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn public(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: pattern.parse()?,
            requirement: Requirement::Public,
        })
    }

    pub fn authenticated(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: pattern.parse()?,
            requirement: Requirement::Authenticated,
        })
    }
}

/// Ordered, immutable rule list. Built once at startup and shared via `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// API docs, login, logout and health are public; `extra_public` is appended after them.
    pub fn with_defaults(extra_public: &[String]) -> Result<Self, PatternError> {
        let mut patterns: Vec<&str> = PUBLIC_ENDPOINTS.to_vec();
        patterns.extend([LOGIN_URI, LOGOUT_URI, HEALTH_URI]);
        patterns.extend(extra_public.iter().map(String::as_str));

        let rules = patterns
            .into_iter()
            .map(AccessRule::public)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn resolve(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.pattern.matches(path))
            .max_by(|(ia, a), (ib, b)| {
                a.pattern
                    .specificity()
                    .cmp(&b.pattern.specificity())
                    .then(ib.cmp(ia))
            })
            .map(|(_, rule)| rule.requirement)
            .unwrap_or(Requirement::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> AccessPolicy {
        AccessPolicy::with_defaults(&[]).unwrap()
    }

    #[test]
    fn docs_login_logout_are_public() {
        let policy = defaults();
        for path in [
            "/v3/api-docs",
            "/v3/api-docs/openapi.json",
            "/v3/api-docs/swagger-config/extra",
            "/swagger-ui/index.html",
            "/swagger-ui.html",
            "/v1/oauth/login",
            "/v1/oauth/logout",
            "/health",
        ] {
            assert_eq!(policy.resolve(path), Requirement::Public, "{path}");
        }
    }

    #[test]
    fn everything_else_requires_authentication() {
        let policy = defaults();
        for path in [
            "/",
            "/users",
            "/users/userInfo",
            "/users/SE150001",
            "/v1/oauth/login/extra",
            "/v1/oauth",
            "/v3",
            "/swagger-ui.htm",
            "/exam-slots",
        ] {
            assert_eq!(policy.resolve(path), Requirement::Authenticated, "{path}");
        }
    }

    #[test]
    fn empty_segments_are_ignored() {
        let policy = defaults();
        assert_eq!(policy.resolve("/v1/oauth/login/"), Requirement::Public);
        assert_eq!(policy.resolve("//v1//oauth/login"), Requirement::Public);
    }

    #[test]
    fn empty_policy_is_secure_by_default() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.resolve("/health"), Requirement::Authenticated);
    }

    #[test]
    fn more_literal_segments_win() {
        let policy = AccessPolicy::new(vec![
            AccessRule::public("/reports/**").unwrap(),
            AccessRule::authenticated("/reports/private/**").unwrap(),
        ]);
        assert_eq!(policy.resolve("/reports/weekly"), Requirement::Public);
        assert_eq!(
            policy.resolve("/reports/private/q3"),
            Requirement::Authenticated
        );
    }

    #[test]
    fn single_wildcard_beats_tail_with_same_literals() {
        let policy = AccessPolicy::new(vec![
            AccessRule::authenticated("/files/**").unwrap(),
            AccessRule::public("/files/*").unwrap(),
        ]);
        assert_eq!(policy.resolve("/files/a.txt"), Requirement::Public);
        assert_eq!(policy.resolve("/files/a/b.txt"), Requirement::Authenticated);
    }

    #[test]
    fn ties_go_to_the_earlier_rule() {
        let policy = AccessPolicy::new(vec![
            AccessRule::public("/a/*").unwrap(),
            AccessRule::authenticated("/*/b").unwrap(),
        ]);
        assert_eq!(policy.resolve("/a/b"), Requirement::Public);

        let policy = AccessPolicy::new(vec![
            AccessRule::authenticated("/*/b").unwrap(),
            AccessRule::public("/a/*").unwrap(),
        ]);
        assert_eq!(policy.resolve("/a/b"), Requirement::Authenticated);
    }

    #[test]
    fn extra_public_paths_are_appended() {
        let policy = AccessPolicy::with_defaults(&["/status/*".to_string()]).unwrap();
        assert_eq!(policy.resolve("/status/db"), Requirement::Public);
        assert_eq!(policy.resolve("/status"), Requirement::Authenticated);
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert_eq!(
            PathPattern::parse("users"),
            Err(PatternError::NotAbsolute("users".to_string()))
        );
        assert_eq!(
            PathPattern::parse("/**/users"),
            Err(PatternError::MisplacedTail("/**/users".to_string()))
        );
        assert_eq!(
            PathPattern::parse("/docs/*.json"),
            Err(PatternError::PartialWildcard("/docs/*.json".to_string()))
        );
    }
}
