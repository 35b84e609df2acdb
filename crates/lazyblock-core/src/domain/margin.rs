//! Root margin parsing.
//!
//! The intersection primitive takes the margin as a CSS shorthand string and
//! the loader passes it through verbatim. Parsing here only exists to reject a
//! malformed margin at config time rather than at observer creation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{v}px"),
            Length::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Four-sided margin, expanded from 1-4 values the way CSS `margin` is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRootMargin {
            margin: input.to_string(),
            reason,
        };

        let values = input
            .split_whitespace()
            .map(|token| parse_length(token).ok_or_else(|| invalid(format!("bad length `{token}`"))))
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [tb, lr] => (*tb, *lr, *tb, *lr),
            [t, lr, b] => (*t, *lr, *b, *lr),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(invalid(format!("expected 1-4 values, got {}", values.len()))),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

fn parse_length(token: &str) -> Option<Length> {
    if token == "0" {
        return Some(Length::Px(0.0));
    }
    if let Some(v) = token.strip_suffix("px") {
        return v.parse().ok().map(Length::Px);
    }
    if let Some(v) = token.strip_suffix('%') {
        return v.parse().ok().map(Length::Percent);
    }
    None
}
