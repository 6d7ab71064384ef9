use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the three fixed chat personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Coder,
    Artist,
    Tutor,
}

impl ChatType {
    /// Dashboard order.
    pub const ALL: [ChatType; 3] = [ChatType::Coder, ChatType::Artist, ChatType::Tutor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coder => "coder",
            Self::Artist => "artist",
            Self::Tutor => "tutor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Coder => "Coder",
            Self::Artist => "Artist",
            Self::Tutor => "Tutor",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Coder => "code",
            Self::Artist => "palette",
            Self::Tutor => "graduation-cap",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chat type: {0}")]
pub struct UnknownChatType(pub String);

impl FromStr for ChatType {
    type Err = UnknownChatType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coder" => Ok(Self::Coder),
            "artist" => Ok(Self::Artist),
            "tutor" => Ok(Self::Tutor),
            other => Err(UnknownChatType(other.to_string())),
        }
    }
}
