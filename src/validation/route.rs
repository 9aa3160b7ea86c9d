//! Route validation.
//!
//! # Responsibilities
//! - Require a route id
//! - Require at least one host or a path
//! - Check host names and wildcard host patterns
//! - Check path pattern syntax (parameters, catch-alls)
//! - Check HTTP methods

use regex::Regex;
use std::collections::HashSet;

use crate::model::ProxyRoute;
use crate::validation::{ValidationError, ValidationErrors};

const HOST_PATTERN: &str = r"^(?:\*\.)?[\w-]+(?:\.[\w-]+)*(?::(\d{1,5}))?$";

const METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "TRACE", "CONNECT",
];

/// Validates routes after they went through the filter chain.
#[derive(Debug, Clone)]
pub struct RouteValidator {
    host: Regex,
}

impl Default for RouteValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteValidator {
    pub fn new() -> Self {
        Self {
            host: Regex::new(HOST_PATTERN).expect("host pattern is a valid regex"),
        }
    }

    /// Validate one route, reporting every violation.
    pub fn validate(&self, route: &ProxyRoute) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if route.route_id.trim().is_empty() {
            errors.push(ValidationError::MissingRouteId);
        }

        let matcher = &route.match_;
        if matcher.hosts.is_empty() && matcher.path.is_none() {
            errors.push(ValidationError::MissingMatch);
        }

        for host in &matcher.hosts {
            if !self.is_valid_host(host) {
                errors.push(ValidationError::InvalidHost(host.clone()));
            }
        }

        if let Some(path) = &matcher.path {
            if let Err(reason) = check_path(path) {
                errors.push(ValidationError::InvalidPath {
                    path: path.clone(),
                    reason,
                });
            }
        }

        if let Some(methods) = &matcher.methods {
            let mut seen = HashSet::new();
            for method in methods {
                let upper = method.to_ascii_uppercase();
                if !METHODS.contains(&upper.as_str()) {
                    errors.push(ValidationError::UnsupportedMethod(method.clone()));
                } else if !seen.insert(upper) {
                    errors.push(ValidationError::DuplicateMethod(method.clone()));
                }
            }
        }

        ValidationErrors::into_result(errors)
    }

    fn is_valid_host(&self, host: &str) -> bool {
        let Some(captures) = self.host.captures(host) else {
            return false;
        };
        match captures.get(1) {
            Some(port) => matches!(port.as_str().parse::<u32>(), Ok(1..=65535)),
            None => true,
        }
    }
}

/// Check route path pattern syntax, returning the reason it is invalid.
fn check_path(path: &str) -> Result<(), String> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err("must start with '/'".to_string());
    };
    if rest.is_empty() {
        return Ok(());
    }

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            if i == last {
                break;
            }
            return Err("empty segment".to_string());
        }
        check_segment(segment, i == last)?;
    }
    Ok(())
}

/// `{{` and `}}` outside a parameter are literal braces.
fn check_segment(segment: &str, is_last: bool) -> Result<(), String> {
    let mut param: Option<String> = None;
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' | '}' if param.is_none() && chars.peek() == Some(&c) => {
                chars.next();
            }
            '{' => {
                if param.is_some() {
                    return Err("nested '{'".to_string());
                }
                param = Some(String::new());
            }
            '}' => match param.take() {
                Some(body) => check_parameter(&body, segment, is_last)?,
                None => return Err("unmatched '}'".to_string()),
            },
            c => {
                if let Some(body) = param.as_mut() {
                    body.push(c);
                }
            }
        }
    }
    if param.is_some() {
        return Err("unclosed '{'".to_string());
    }
    Ok(())
}

fn check_parameter(body: &str, segment: &str, is_last: bool) -> Result<(), String> {
    let catch_all = body.starts_with('*');
    let name = body.trim_start_matches('*');
    let name = name
        .split(|c: char| c == ':' || c == '=')
        .next()
        .unwrap_or_default()
        .trim_end_matches('?');

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!("invalid parameter name '{body}'"));
    }
    if catch_all {
        if body.starts_with("***") {
            return Err(format!("invalid catch-all '{body}'"));
        }
        if !is_last {
            return Err("catch-all parameter must be in the last segment".to_string());
        }
        if segment != format!("{{{body}}}") {
            return Err("catch-all parameter must be the whole segment".to_string());
        }
    }
    Ok(())
}
