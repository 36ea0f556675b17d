use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which `must-not-throw` regions of a noexcept function get rewritten
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RewritePolicy {
    /// Only the first top-level region, any others keep the default behavior
    #[default]
    First,
    /// Every top-level region
    All,
}
impl fmt::Display for RewritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::All => f.write_str("all"),
        }
    }
}
impl FromStr for RewritePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "all" => Ok(Self::All),
            _ => Err(()),
        }
    }
}

/// A single `key[=value]` argument handed to the plugin by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginArgument {
    pub key: String,
    pub value: Option<String>,
}
impl PluginArgument {
    pub fn new<K: Into<String>>(key: K, value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
        }
    }
}
impl FromStr for PluginArgument {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = match s.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (s, None),
        };
        if key.is_empty() {
            return Err(OptionsError::UnknownArgument(s.to_string()));
        }
        Ok(Self::new(key, value))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
    #[error("argument `{key}` requires a value")]
    MissingValue { key: String },
    #[error("invalid value `{value}` for argument `{key}`, expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Configuration of the plugin, parsed from its arguments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginOptions {
    pub policy: RewritePolicy,
}
impl PluginOptions {
    pub fn from_args<'a, I>(args: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = &'a PluginArgument>,
    {
        let mut options = Self::default();
        for arg in args {
            match arg.key.as_str() {
                "policy" => {
                    let value = arg.value.as_deref().ok_or_else(|| OptionsError::MissingValue {
                        key: arg.key.clone(),
                    })?;
                    options.policy = value.parse().map_err(|_| OptionsError::InvalidValue {
                        key: arg.key.clone(),
                        value: value.to_string(),
                        expected: "one of `first` or `all`",
                    })?;
                }
                _ => return Err(OptionsError::UnknownArgument(arg.key.clone())),
            }
        }
        Ok(options)
    }
}
