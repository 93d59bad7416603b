//! Route lookup and dispatch decision.
//!
//! # Responsibilities
//! - Store compiled routes in configuration order
//! - Look up the first matching route for a request path
//! - Return a forward directive or a terminal response
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in table order; first match wins
//! - Explicit `NoRouteMatched` rather than a silent default

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use axum::http::{Method, StatusCode};
use serde::Serialize;

use crate::config::{ConfigurationError, RouteConfig, ValidationError};
use crate::routing::pattern::PathPattern;
use crate::routing::rewrite::RewriteRule;

/// Raised when no route matches. Only possible if the table lacks its catch-all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route matched path {path:?}")]
pub struct NoRouteMatched {
    pub path: String,
}

/// What a route does with a matching request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Forward to a logical service resolved by discovery.
    Forward { upstream: String },
    /// Answer directly without forwarding.
    Terminate {
        status: StatusCode,
        body: Option<String>,
    },
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct RouteRule {
    id: String,
    patterns: Vec<PathPattern>,
    action: RouteAction,
    rewrite: Option<RewriteRule>,
}

impl RouteRule {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn action(&self) -> &RouteAction {
        &self.action
    }

    pub fn rewrite(&self) -> Option<&RewriteRule> {
        self.rewrite.as_ref()
    }

    fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// True if every path `other` can match is already taken by `self`.
    fn shadows(&self, other: &RouteRule) -> bool {
        other
            .patterns
            .iter()
            .all(|theirs| self.patterns.iter().any(|mine| mine.covers(theirs)))
    }

    fn rewrite_path(&self, path: &str) -> String {
        match &self.rewrite {
            Some(rule) => rule.apply(path),
            None => path.to_string(),
        }
    }
}

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Forward {
        route_id: String,
        upstream: String,
        path: String,
    },
    Terminate {
        route_id: String,
        status: u16,
        body: String,
    },
}

impl Outcome {
    pub fn route_id(&self) -> &str {
        match self {
            Outcome::Forward { route_id, .. } | Outcome::Terminate { route_id, .. } => route_id,
        }
    }
}

/// The immutable, ordered route table.
#[derive(Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Compile route records into a table, failing on any invalid record.
    ///
    /// Unreachable routes are logged here, once per table that will serve.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, ConfigurationError> {
        let table = Self::compile(routes).map_err(ConfigurationError::Invalid)?;
        for (route, shadowed_by) in table.shadowed_routes() {
            tracing::warn!(
                route = %route,
                shadowed_by = %shadowed_by,
                "Route is unreachable: an earlier route matches every path it covers"
            );
        }
        Ok(table)
    }

    /// Compile route records, collecting every problem found. Logs nothing.
    pub fn compile(routes: &[RouteConfig]) -> Result<Self, Vec<ValidationError>> {
        if routes.is_empty() {
            return Err(vec![ValidationError::NoRoutes]);
        }

        let mut errors = Vec::new();
        let mut ids = HashSet::new();
        let mut rules = Vec::with_capacity(routes.len());

        for (index, route) in routes.iter().enumerate() {
            if route.id.is_empty() {
                errors.push(ValidationError::EmptyRouteId { index });
            } else if !ids.insert(route.id.as_str()) {
                errors.push(ValidationError::DuplicateRouteId(route.id.clone()));
            }
            if let Some(rule) = compile_route(route, &mut errors) {
                rules.push(rule);
            }
        }

        if !routes.last().map(route_has_catch_all).unwrap_or(false) {
            errors.push(ValidationError::MissingCatchAll);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self { rules })
    }

    /// Select the route governing `path` and compute the outcome.
    ///
    /// `method` does not influence selection; it is recorded for diagnostics.
    pub fn match_route(&self, path: &str, method: &Method) -> Result<Outcome, NoRouteMatched> {
        let path = normalize_path(path);

        let Some(rule) = self.rules.iter().find(|r| r.matches(&path)) else {
            tracing::error!(
                method = %method,
                path = %path,
                "No route matched; route table is missing its catch-all"
            );
            return Err(NoRouteMatched {
                path: path.into_owned(),
            });
        };

        let rewritten = rule.rewrite_path(&path);
        tracing::trace!(route = %rule.id, method = %method, path = %path, "Route matched");

        Ok(match &rule.action {
            RouteAction::Forward { upstream } => Outcome::Forward {
                route_id: rule.id.clone(),
                upstream: upstream.clone(),
                path: rewritten,
            },
            RouteAction::Terminate { status, body } => Outcome::Terminate {
                route_id: rule.id.clone(),
                status: status.as_u16(),
                body: body
                    .clone()
                    .unwrap_or_else(|| default_terminal_body(*status, &rewritten)),
            },
        })
    }

    /// The route that would govern `path`, if any.
    pub fn find(&self, path: &str) -> Option<&RouteRule> {
        let path = normalize_path(path);
        self.rules.iter().find(|r| r.matches(&path))
    }

    /// Named captures of the governing route's rewrite for `path`.
    pub fn rewrite_captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let path = normalize_path(path);
        let rule = self.rules.iter().find(|r| r.matches(&path))?;
        rule.rewrite.as_ref()?.captures(&path)
    }

    /// Pairs of (unreachable route, earlier route that shadows it).
    pub fn shadowed_routes(&self) -> Vec<(String, String)> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(i, later)| {
                self.rules[..i]
                    .iter()
                    .find(|earlier| earlier.shadows(later))
                    .map(|earlier| (later.id.clone(), earlier.id.clone()))
            })
            .collect()
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_route(route: &RouteConfig, errors: &mut Vec<ValidationError>) -> Option<RouteRule> {
    let before = errors.len();

    if route.paths.is_empty() {
        errors.push(ValidationError::NoPathPatterns(route.id.clone()));
    }

    let mut patterns = Vec::with_capacity(route.paths.len());
    for raw in &route.paths {
        match PathPattern::parse(raw) {
            Ok(pattern) => patterns.push(pattern),
            Err(source) => errors.push(ValidationError::InvalidPathPattern {
                route: route.id.clone(),
                source,
            }),
        }
    }

    let rewrite = match &route.rewrite {
        Some(cfg) => match RewriteRule::new(&cfg.regex, cfg.replacement.clone()) {
            Ok(rule) => Some(rule),
            Err(e) => {
                errors.push(ValidationError::InvalidRewrite {
                    route: route.id.clone(),
                    message: e.to_string(),
                });
                None
            }
        },
        None => None,
    };

    let action = compile_action(route, errors);

    if errors.len() > before {
        return None;
    }

    Some(RouteRule {
        id: route.id.clone(),
        patterns,
        action: action?,
        rewrite,
    })
}

fn compile_action(route: &RouteConfig, errors: &mut Vec<ValidationError>) -> Option<RouteAction> {
    if route.terminal_body.is_some() && route.terminal_status.is_none() {
        errors.push(ValidationError::BodyWithoutStatus(route.id.clone()));
    }

    match (&route.upstream, route.terminal_status) {
        (Some(_), Some(_)) => {
            errors.push(ValidationError::ConflictingAction(route.id.clone()));
            None
        }
        (None, None) => {
            errors.push(ValidationError::MissingAction(route.id.clone()));
            None
        }
        (Some(upstream), None) => match logical_service_name(upstream) {
            Some(name) => Some(RouteAction::Forward {
                upstream: name.to_string(),
            }),
            None => {
                errors.push(ValidationError::InvalidUpstream {
                    route: route.id.clone(),
                    upstream: upstream.clone(),
                });
                None
            }
        },
        (None, Some(code)) => match StatusCode::from_u16(code) {
            Ok(status) if (100..=599).contains(&code) => Some(RouteAction::Terminate {
                status,
                body: route.terminal_body.clone(),
            }),
            _ => {
                errors.push(ValidationError::InvalidStatus {
                    route: route.id.clone(),
                    status: code,
                });
                None
            }
        },
    }
}

/// Accepts `name` or `lb://name`; rejects other schemes and empty names.
fn logical_service_name(upstream: &str) -> Option<&str> {
    let name = upstream.strip_prefix("lb://").unwrap_or(upstream).trim();
    let valid = !name.is_empty() && !name.contains("://") && !name.contains('/');
    valid.then_some(name)
}

fn route_has_catch_all(route: &RouteConfig) -> bool {
    route
        .paths
        .iter()
        .filter_map(|p| PathPattern::parse(p).ok())
        .any(|p| p.is_catch_all())
}

/// Empty paths become `/`; a missing leading slash is added.
fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        Cow::Borrowed("/")
    } else if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

fn default_terminal_body(status: StatusCode, path: &str) -> String {
    serde_json::json!({
        "status": "error",
        "message": status.canonical_reason().unwrap_or("Error"),
        "path": path,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_routes;
    use crate::config::RewriteConfig;
    use proptest::prelude::*;

    fn forward(id: &str, path: &str, upstream: &str) -> RouteConfig {
        RouteConfig {
            id: id.into(),
            paths: vec![path.into()],
            upstream: Some(upstream.into()),
            terminal_status: None,
            terminal_body: None,
            rewrite: None,
        }
    }

    fn terminate(id: &str, path: &str, status: u16) -> RouteConfig {
        RouteConfig {
            id: id.into(),
            paths: vec![path.into()],
            upstream: None,
            terminal_status: Some(status),
            terminal_body: None,
            rewrite: None,
        }
    }

    fn default_table() -> RouteTable {
        RouteTable::from_config(&default_routes()).unwrap()
    }

    fn upstream_of(outcome: &Outcome) -> Option<&str> {
        match outcome {
            Outcome::Forward { upstream, .. } => Some(upstream),
            Outcome::Terminate { .. } => None,
        }
    }

    #[test]
    fn test_auth_login_forwards_to_identity() {
        let outcome = default_table()
            .match_route("/api/auth/login", &Method::POST)
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Forward {
                route_id: "identity-service-auth".into(),
                upstream: "identity-service".into(),
                path: "/api/auth/login".into(),
            }
        );
    }

    #[test]
    fn test_prompt_versions_forward_to_prompt_service() {
        let outcome = default_table()
            .match_route("/api/prompts/123/versions", &Method::GET)
            .unwrap();
        assert_eq!(upstream_of(&outcome), Some("prompt-service"));
        if let Outcome::Forward { path, .. } = outcome {
            assert_eq!(path, "/api/prompts/123/versions");
        }
    }

    #[test]
    fn test_every_service_prefix() {
        let table = default_table();
        let cases = [
            ("/api/users/7", "identity-service"),
            ("/api/organizations/1/members", "identity-service"),
            ("/api/flows", "flow-service"),
            ("/api/agents/a1/run", "agent-service"),
            ("/api/integrations/slack", "integration-service"),
        ];
        for (path, expected) in cases {
            let outcome = table.match_route(path, &Method::GET).unwrap();
            assert_eq!(upstream_of(&outcome), Some(expected), "path {path}");
        }
    }

    #[test]
    fn test_unknown_path_terminates_404() {
        let outcome = default_table()
            .match_route("/unknown/path", &Method::GET)
            .unwrap();
        match outcome {
            Outcome::Terminate {
                route_id,
                status,
                body,
            } => {
                assert_eq!(route_id, "fallback");
                assert_eq!(status, 404);
                let json: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(json["message"], "Not Found");
                assert_eq!(json["path"], "/unknown/path");
            }
            other => panic!("expected terminate, got {other:?}"),
        }
    }

    #[test]
    fn test_catch_all_totality() {
        let table = default_table();
        let paths = [
            "",
            "/",
            "//",
            "no-leading-slash",
            "/api",
            "/api/",
            "/api/authx",
            "/API/auth/login",
            "/api/projects/1",
            "/%2F%2E%2E",
            "/a/b/c/d/e/f/g/h",
            "/api/auth//login",
            "/ünïcödé/päth",
        ];
        for path in paths {
            for method in [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS] {
                assert!(table.match_route(path, &method).is_ok(), "{method} {path}");
            }
        }
        for path in ["/api", "/api/projects/1", "/API/auth/login", "/api/authx"] {
            assert!(matches!(
                table.match_route(path, &Method::GET).unwrap(),
                Outcome::Terminate { status: 404, .. }
            ));
        }
    }

    const FORWARDED: [(&str, &str); 7] = [
        ("auth", "identity-service"),
        ("users", "identity-service"),
        ("organizations", "identity-service"),
        ("prompts", "prompt-service"),
        ("flows", "flow-service"),
        ("agents", "agent-service"),
        ("integrations", "integration-service"),
    ];

    /// Upstream of the built-in forwarding rule governing `path`, if any.
    fn governing_upstream(path: &str) -> Option<&'static str> {
        let path = normalize_path(path);
        let path: &str = &path;
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let mut segments = trimmed.split('/');
        if segments.next() != Some("api") {
            return None;
        }
        let resource = segments.next()?;
        FORWARDED
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, upstream)| *upstream)
    }

    fn arb_path() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<String>(),
            "(/[a-zA-Z0-9_.%-]{0,8}){0,6}/?",
            "/api(/(auth|users|organizations|prompts|flows|agents|integrations|projects|x)){0,1}(/[a-z0-9]{0,6}){0,4}/?",
        ]
    }

    fn arb_method() -> impl Strategy<Value = Method> {
        "[A-Z]{1,12}".prop_map(|m| Method::from_bytes(m.as_bytes()).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        /// Every input path resolves on the built-in table.
        #[test]
        fn prop_default_table_is_total(path in arb_path(), method in arb_method()) {
            let table = default_table();
            prop_assert!(table.match_route(&path, &method).is_ok());
        }

        /// Paths outside the forwarding prefixes terminate with 404; the rest
        /// forward to the prefix's upstream.
        #[test]
        fn prop_outcome_follows_prefix(path in arb_path(), method in arb_method()) {
            let table = default_table();
            let outcome = table.match_route(&path, &method).unwrap();
            match governing_upstream(&path) {
                Some(expected) => prop_assert_eq!(upstream_of(&outcome), Some(expected)),
                None => {
                    let is_not_found = matches!(outcome, Outcome::Terminate { status: 404, .. });
                    prop_assert!(is_not_found);
                    prop_assert_eq!(outcome.route_id(), "fallback");
                }
            }
        }

        /// Forwarded paths under a prefix keep their suffix.
        #[test]
        fn prop_prefixed_paths_forward_unchanged(
            index in 0..FORWARDED.len(),
            suffix in "(/[a-zA-Z0-9_.-]{1,8}){0,5}",
        ) {
            let (resource, upstream) = FORWARDED[index];
            let path = format!("/api/{resource}{suffix}");
            let outcome = default_table().match_route(&path, &Method::GET).unwrap();
            prop_assert_eq!(upstream_of(&outcome), Some(upstream));
            if let Outcome::Forward { path: rewritten, .. } = &outcome {
                prop_assert_eq!(rewritten, &path);
            }
        }

        /// Matching has no memory: repeated calls agree.
        #[test]
        fn prop_match_is_idempotent(path in arb_path(), method in arb_method()) {
            let table = default_table();
            let first = table.match_route(&path, &method);
            let second = table.match_route(&path, &method);
            let third = table.match_route(&path, &Method::GET);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &third);
        }
    }

    #[test]
    fn test_empty_path_is_root() {
        let table = default_table();
        assert_eq!(
            table.match_route("", &Method::GET).unwrap(),
            table.match_route("/", &Method::GET).unwrap()
        );
    }

    #[test]
    fn test_method_does_not_affect_selection() {
        let table = default_table();
        let get = table.match_route("/api/flows/1", &Method::GET).unwrap();
        let delete = table.match_route("/api/flows/1", &Method::DELETE).unwrap();
        assert_eq!(get, delete);
    }

    #[test]
    fn test_match_is_idempotent() {
        let table = default_table();
        let first = table.match_route("/api/agents/x", &Method::PUT).unwrap();
        for _ in 0..100 {
            assert_eq!(table.match_route("/api/agents/x", &Method::PUT).unwrap(), first);
        }
    }

    #[test]
    fn test_rule_order_decides_overlaps() {
        let specific_first = vec![
            forward("auth", "/api/auth/**", "identity-service"),
            forward("api", "/api/**", "legacy-service"),
            terminate("fallback", "/**", 404),
        ];
        let general_first = vec![
            specific_first[1].clone(),
            specific_first[0].clone(),
            specific_first[2].clone(),
        ];

        let a = RouteTable::from_config(&specific_first).unwrap();
        let b = RouteTable::from_config(&general_first).unwrap();

        let path = "/api/auth/login";
        assert_eq!(upstream_of(&a.match_route(path, &Method::GET).unwrap()), Some("identity-service"));
        assert_eq!(upstream_of(&b.match_route(path, &Method::GET).unwrap()), Some("legacy-service"));

        assert!(a.shadowed_routes().is_empty());
        assert_eq!(b.shadowed_routes(), vec![("auth".to_string(), "api".to_string())]);
    }

    #[test]
    fn test_early_catch_all_makes_specific_rule_unreachable() {
        let table = RouteTable::from_config(&[
            terminate("early-fallback", "/**", 404),
            forward("auth", "/api/auth/**", "identity-service"),
            terminate("fallback", "/**", 404),
        ])
        .unwrap();

        let outcome = table.match_route("/api/auth/login", &Method::POST).unwrap();
        assert_eq!(outcome.route_id(), "early-fallback");
        assert_eq!(table.shadowed_routes().len(), 2);
    }

    #[test]
    fn test_unreachable_routes_logged_once() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct LogBuffer(Arc<Mutex<Vec<u8>>>);

        impl Write for LogBuffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let routes = [
            terminate("early-fallback", "/**", 404),
            forward("auth", "/api/auth/**", "identity-service"),
            terminate("fallback", "/**", 404),
        ];
        let logs = LogBuffer(Arc::new(Mutex::new(Vec::new())));
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            RouteTable::compile(&routes).unwrap();
            RouteTable::from_config(&routes).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Route is unreachable").count(), 2);
        assert_eq!(output.matches("route=auth").count(), 1);
    }

    #[test]
    fn test_rewrite_captures_use_normalized_path() {
        let table = default_table();
        let caps = table.rewrite_captures("foo/bar").unwrap();
        assert_eq!(caps["remaining"], "foo/bar");

        let caps = table.rewrite_captures("/api/flows/7/run").unwrap();
        assert_eq!(caps["segment"], "7/run");
    }

    #[test]
    fn test_fallback_rewrite_captures_remaining() {
        let table = default_table();
        let fallback = table.find("/foo/bar").unwrap();
        assert_eq!(fallback.id(), "fallback");

        let rewrite = fallback.rewrite().unwrap();
        let caps = rewrite.captures("/foo/bar").unwrap();
        assert_eq!(caps["remaining"], "foo/bar");
        assert_eq!(rewrite.apply("/foo/bar"), "/foo/bar");

        assert!(matches!(fallback.action(), RouteAction::Terminate { status, .. } if *status == StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_rewrite_applied_before_forwarding() {
        let mut route = forward("v1", "/v1/**", "prompt-service");
        route.rewrite = Some(RewriteConfig {
            regex: "/v1/(?<rest>.*)".into(),
            replacement: "/api/${rest}".into(),
        });
        let table = RouteTable::from_config(&[route, terminate("fallback", "/**", 404)]).unwrap();

        let outcome = table.match_route("/v1/prompts/9", &Method::GET).unwrap();
        assert_eq!(
            outcome,
            Outcome::Forward {
                route_id: "v1".into(),
                upstream: "prompt-service".into(),
                path: "/api/prompts/9".into(),
            }
        );
    }

    #[test]
    fn test_multiple_patterns_per_route() {
        let mut route = forward("agent-service", "/api/agents/**", "agent-service");
        route.paths.push("/api/conversations/**".into());
        let table = RouteTable::from_config(&[route, terminate("fallback", "/**", 404)]).unwrap();

        let outcome = table.match_route("/api/conversations/3", &Method::GET).unwrap();
        assert_eq!(upstream_of(&outcome), Some("agent-service"));
    }

    #[test]
    fn test_custom_terminal_body() {
        let mut fallback = terminate("fallback", "/**", 410);
        fallback.terminal_body = Some("gone".into());
        let table = RouteTable::from_config(&[fallback]).unwrap();
        assert_eq!(
            table.match_route("/x", &Method::GET).unwrap(),
            Outcome::Terminate {
                route_id: "fallback".into(),
                status: 410,
                body: "gone".into(),
            }
        );
    }

    #[test]
    fn test_no_route_matched_without_catch_all() {
        // Bypasses compile() to exercise the invariant-violation path.
        let table = RouteTable {
            rules: vec![RouteRule {
                id: "auth".into(),
                patterns: vec![PathPattern::parse("/api/auth/**").unwrap()],
                action: RouteAction::Forward {
                    upstream: "identity-service".into(),
                },
                rewrite: None,
            }],
        };
        assert_eq!(
            table.match_route("/other", &Method::GET),
            Err(NoRouteMatched {
                path: "/other".into()
            })
        );
    }

    #[test]
    fn test_compile_rejects_invalid_records() {
        let mut both = forward("both", "/a/**", "svc");
        both.terminal_status = Some(404);
        let mut neither = forward("neither", "/b/**", "svc");
        neither.upstream = None;
        let bad_scheme = forward("scheme", "/c/**", "http://svc");
        let bad_status = terminate("status", "/d/**", 99);
        let mut bad_rewrite = forward("rewrite", "/e/**", "svc");
        bad_rewrite.rewrite = Some(RewriteConfig {
            regex: "(".into(),
            replacement: "/".into(),
        });
        let mut body_only = forward("body", "/f/**", "svc");
        body_only.terminal_body = Some("x".into());
        let empty_paths = RouteConfig {
            paths: vec![],
            ..forward("empty", "/", "svc")
        };
        let duplicate = forward("empty", "/g/**", "svc");

        let errors = RouteTable::compile(&[
            both,
            neither,
            bad_scheme,
            bad_status,
            bad_rewrite,
            body_only,
            empty_paths,
            duplicate,
        ])
        .unwrap_err();

        assert!(errors.contains(&ValidationError::ConflictingAction("both".into())));
        assert!(errors.contains(&ValidationError::MissingAction("neither".into())));
        assert!(errors.contains(&ValidationError::InvalidUpstream {
            route: "scheme".into(),
            upstream: "http://svc".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidStatus {
            route: "status".into(),
            status: 99,
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidRewrite { route, .. } if route == "rewrite")));
        assert!(errors.contains(&ValidationError::BodyWithoutStatus("body".into())));
        assert!(errors.contains(&ValidationError::NoPathPatterns("empty".into())));
        assert!(errors.contains(&ValidationError::DuplicateRouteId("empty".into())));
        assert!(errors.contains(&ValidationError::MissingCatchAll));
    }

    #[test]
    fn test_upstream_scheme_is_optional() {
        let table = RouteTable::from_config(&[
            forward("a", "/a/**", "lb://alpha-service"),
            forward("b", "/b/**", "beta-service"),
            terminate("fallback", "/**", 404),
        ])
        .unwrap();
        assert_eq!(
            upstream_of(&table.match_route("/a/1", &Method::GET).unwrap()),
            Some("alpha-service")
        );
        assert_eq!(
            upstream_of(&table.match_route("/b/1", &Method::GET).unwrap()),
            Some("beta-service")
        );
    }
}
