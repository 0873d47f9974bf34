//! Version constraint dialect used by buildpack version requests
//!
//! Grammar accepted on top of semver requirements:
//! - `||` separates alternatives
//! - whitespace or commas between comparators mean AND
//! - `A - B` is an inclusive hyphen range
//! - a bare version means `=`; partial bare versions act as wildcards
//! - `x`, `X` and `*` wildcards, `~>` as an alias of `~`
//!
//! Each alternative is translated into a [`semver::VersionReq`].

use crate::error::VersionError;
use semver::{Version, VersionReq};
use std::fmt;

// Longest operators first so `>=` is not read as `>`
const OPERATORS: [&str; 10] = [">=", "<=", "~>", "!=", "==", ">", "<", "=", "^", "~"];

/// A parsed version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    raw: String,
    normalized: String,
    alternatives: Vec<VersionReq>,
}

impl Constraint {
    /// Parses a constraint; an empty string matches any stable version
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        let source = if raw.is_empty() { "*" } else { raw };

        let mut alternatives = Vec::new();
        let mut translated = Vec::new();
        for alternative in source.split("||") {
            let comparators = translate_alternative(alternative)
                .map_err(|message| VersionError::invalid_spec(raw, message))?;
            let joined = comparators.join(", ");
            let req = VersionReq::parse(&joined)
                .map_err(|e| VersionError::invalid_spec(raw, e.to_string()))?;
            translated.push(joined);
            alternatives.push(req);
        }

        Ok(Self {
            raw: raw.to_string(),
            normalized: translated.join(" || "),
            alternatives,
        })
    }

    /// Returns true if any alternative matches the version
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Returns the constraint as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the semver requirement text, alternatives joined by `||`
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

/// Splits one alternative into semver comparators
fn translate_alternative(alternative: &str) -> Result<Vec<String>, String> {
    let tokens: Vec<&str> = alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err("empty alternative".to_string());
    }

    let mut comparators = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        // Hyphen range: `A - B`
        if tokens.get(i + 1) == Some(&"-") {
            let upper = tokens
                .get(i + 2)
                .ok_or_else(|| format!("missing upper bound after '{} -'", token))?;
            comparators.push(translate_comparator(">=", token)?);
            comparators.push(translate_comparator("<=", upper)?);
            i += 3;
            continue;
        }

        let (op, version) = split_operator(token);
        if version.is_empty() {
            // Operator separated from its version by whitespace
            let next = tokens
                .get(i + 1)
                .ok_or_else(|| format!("operator '{}' without a version", op))?;
            comparators.push(translate_comparator(op, next)?);
            i += 2;
        } else {
            comparators.push(translate_comparator(op, version)?);
            i += 1;
        }
    }

    Ok(comparators)
}

fn split_operator(token: &str) -> (&str, &str) {
    for op in OPERATORS {
        if let Some(rest) = token.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", token)
}

/// Translates a single `op version` pair into semver syntax
fn translate_comparator(op: &str, version: &str) -> Result<String, String> {
    let op = match op {
        "" | "=" | "==" => "=",
        "~>" => "~",
        "!=" => return Err("'!=' comparators are not supported".to_string()),
        other => other,
    };

    let version = version.trim_start_matches('v');
    if version.is_empty() {
        return Err(format!("operator '{}' without a version", op));
    }

    // Wildcard components truncate the version; semver treats missing parts as wildcards
    let mut parts = Vec::new();
    for part in version.split('.') {
        if matches!(part, "*" | "x" | "X") {
            break;
        }
        parts.push(part);
    }

    if parts.is_empty() {
        return Ok("*".to_string());
    }
    Ok(format!("{}{}", op, parts.join(".")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_greater_or_equal() {
        let c = Constraint::parse(">=1.2.0").unwrap();
        assert!(c.matches(&v("1.2.0")));
        assert!(c.matches(&v("2.0.0")));
        assert!(!c.matches(&v("1.1.9")));
    }

    #[test]
    fn test_bare_partial_acts_as_wildcard() {
        let c = Constraint::parse("1.21").unwrap();
        assert_eq!(c.normalized(), "=1.21");
        assert!(c.matches(&v("1.21.0")));
        assert!(c.matches(&v("1.21.13")));
        assert!(!c.matches(&v("1.22.0")));
    }

    #[test]
    fn test_wildcards() {
        let c = Constraint::parse("1.25.*").unwrap();
        assert!(c.matches(&v("1.25.3")));
        assert!(!c.matches(&v("1.24.9")));

        let c = Constraint::parse("1.x").unwrap();
        assert!(c.matches(&v("1.99.0")));
        assert!(!c.matches(&v("2.0.0")));

        let c = Constraint::parse("*").unwrap();
        assert!(c.matches(&v("0.0.1")));
    }

    #[test]
    fn test_empty_is_any() {
        let c = Constraint::parse("   ").unwrap();
        assert_eq!(c.normalized(), "*");
        assert!(c.matches(&v("3.14.0")));
    }

    #[test]
    fn test_and_with_whitespace_and_commas() {
        let c = Constraint::parse(">=1.2 <1.4").unwrap();
        assert!(c.matches(&v("1.3.7")));
        assert!(!c.matches(&v("1.4.0")));

        let c = Constraint::parse(">=1.2, <1.4").unwrap();
        assert_eq!(c.normalized(), ">=1.2, <1.4");
    }

    #[test]
    fn test_or_alternatives() {
        let c = Constraint::parse("<1.0 || >=3.0").unwrap();
        assert!(c.matches(&v("0.9.0")));
        assert!(c.matches(&v("3.1.0")));
        assert!(!c.matches(&v("2.0.0")));
    }

    #[test]
    fn test_hyphen_range() {
        let c = Constraint::parse("1.2 - 1.3").unwrap();
        assert_eq!(c.normalized(), ">=1.2, <=1.3");
        assert!(c.matches(&v("1.2.0")));
        assert!(c.matches(&v("1.3.0")));
        assert!(!c.matches(&v("1.4.0")));
        assert!(!c.matches(&v("1.1.9")));
    }

    #[test]
    fn test_detached_operator() {
        let c = Constraint::parse(">= 1.2.0").unwrap();
        assert_eq!(c.normalized(), ">=1.2.0");
    }

    #[test]
    fn test_caret_tilde_and_pessimistic() {
        let c = Constraint::parse("^3.11").unwrap();
        assert!(c.matches(&v("3.13.0")));
        assert!(!c.matches(&v("4.0.0")));

        let c = Constraint::parse("~>1.2.3").unwrap();
        assert_eq!(c.normalized(), "~1.2.3");
        assert!(c.matches(&v("1.2.9")));
        assert!(!c.matches(&v("1.3.0")));
    }

    #[test]
    fn test_v_prefix() {
        let c = Constraint::parse(">=v1.2.0").unwrap();
        assert!(c.matches(&v("1.2.0")));
    }

    #[test]
    fn test_invalid_constraints() {
        assert!(Constraint::parse("!=1.2.0").is_err());
        assert!(Constraint::parse(">=").is_err());
        assert!(Constraint::parse("1.0 ||").is_err());
        assert!(Constraint::parse("1.0 -").is_err());
        assert!(Constraint::parse("banana").is_err());
    }

    #[test]
    fn test_error_keeps_raw_constraint() {
        let err = Constraint::parse("!=1.2.0").unwrap_err();
        assert!(format!("{}", err).contains("!=1.2.0"));
    }
}
