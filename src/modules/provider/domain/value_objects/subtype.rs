use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audio track selector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subtype {
    #[default]
    Sub,
    Dub,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Sub => "sub",
            Subtype::Dub => "dub",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sub" => Ok(Subtype::Sub),
            "dub" => Ok(Subtype::Dub),
            other => Err(AppError::InvalidInput(format!(
                "Subtype must be 'sub' or 'dub', got '{}'",
                other
            ))),
        }
    }
}
