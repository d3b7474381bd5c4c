//! Request Helpers
//!
//! Query-string construction, required-parameter checks and cache key
//! derivation for the intel routes.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use url::Url;

// == Param Value ==
/// A query parameter value; numbers and booleans are stringified.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

// == Build URL ==
/// Appends `params` to `base` as percent-encoded query pairs, in order.
///
/// With no params `base` is returned untouched. Otherwise the path and any
/// existing query of `base` are kept and the new pairs follow them.
pub fn build_url<K: AsRef<str>>(base: &str, params: &[(K, ParamValue)]) -> Result<String, url::ParseError> {
    if params.is_empty() {
        return Ok(base.to_string());
    }

    let mut url = Url::parse(base)?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key.as_ref(), &value.to_string());
        }
    }
    Ok(url.into())
}

// == Validate Params ==
/// Result of a required-parameter check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

/// Checks that every name in `required` is present in `params`.
///
/// Presence is all that matters; an empty value counts. Missing names are
/// reported in the order they appear in `required`.
pub fn validate_params(params: &HashMap<String, String>, required: &[&str]) -> ParamValidation {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !params.contains_key(**name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        ParamValidation {
            valid: true,
            missing: None,
        }
    } else {
        ParamValidation {
            valid: false,
            missing: Some(missing),
        }
    }
}

// == Cache Key ==
/// Builds a `<source>:<hash>` cache key that ignores parameter order.
pub fn cache_key(source: &str, params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = params.iter().collect();
    pairs.sort();

    let mut hasher = DefaultHasher::new();
    pairs.hash(&mut hasher);
    format!("{}:{:016x}", source, hasher.finish())
}
