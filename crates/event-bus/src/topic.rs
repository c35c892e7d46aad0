use regex::Regex;

use crate::{EventBusError, Result};

/// What a subscription listens to.
#[derive(Debug, Clone)]
pub enum Topic {
    /// Fires only for emissions with exactly this name.
    Name(String),

    /// Fires for every emitted name the expression matches.
    Pattern(Regex),

    /// Fires for every emission.
    Any,
}

impl Topic {
    /// Creates an exact-name topic.
    pub fn name(name: impl Into<String>) -> Self {
        Topic::Name(name.into())
    }

    /// Compiles a pattern topic.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Topic::Pattern)
            .map_err(|source| EventBusError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Returns true if an emission named `name` should reach this topic.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Topic::Name(exact) => exact == name,
            Topic::Pattern(regex) => regex.is_match(name),
            Topic::Any => true,
        }
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Topic::Name(name.to_string())
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        Topic::Name(name)
    }
}

impl From<Regex> for Topic {
    fn from(regex: Regex) -> Self {
        Topic::Pattern(regex)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Name(name) => write!(f, "{name}"),
            Topic::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            Topic::Any => write!(f, "*"),
        }
    }
}
