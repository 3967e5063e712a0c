//! # Context
//!
//! Partition key selecting which isolated sub-tree of replicated state an
//! action targets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SyncError;

/// Either the user's personal workspace or a team workspace.
///
/// Serialized as a bare string: `"personal"` or the team id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Context {
    /// The literal `"personal"` context.
    #[default]
    Personal,
    /// A team identified by its id.
    Team(String),
}

impl Context {
    /// Wire literal for the personal context.
    pub const PERSONAL: &'static str = "personal";

    /// Build a team context.
    pub fn team(team_id: impl Into<String>) -> Self {
        Self::Team(team_id.into())
    }

    /// Parse a context string.
    ///
    /// Empty and whitespace-only strings are rejected.
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SyncError::InvalidContext(raw.to_string()));
        }
        if trimmed == Self::PERSONAL {
            Ok(Self::Personal)
        } else {
            Ok(Self::Team(trimmed.to_string()))
        }
    }

    /// String form used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Personal => Self::PERSONAL,
            Self::Team(id) => id,
        }
    }

    #[must_use]
    pub fn is_personal(&self) -> bool {
        matches!(self, Self::Personal)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Context {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Context> for String {
    fn from(context: Context) -> Self {
        match context {
            Context::Personal => Context::PERSONAL.to_string(),
            Context::Team(id) => id,
        }
    }
}

impl From<&str> for Context {
    /// Lenient conversion for call sites with literal ids. Empty input maps to
    /// the personal context.
    fn from(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_personal() {
        assert_eq!(Context::parse("personal").unwrap(), Context::Personal);
        assert_eq!(Context::parse(" personal ").unwrap(), Context::Personal);
    }

    #[test]
    fn test_parse_team() {
        assert_eq!(Context::parse("team-1").unwrap(), Context::team("team-1"));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            Context::parse("  "),
            Err(SyncError::InvalidContext(_))
        ));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&Context::team("t-9")).unwrap();
        assert_eq!(json, "\"t-9\"");

        let back: Context = serde_json::from_str("\"personal\"").unwrap();
        assert_eq!(back, Context::Personal);

        assert!(serde_json::from_str::<Context>("\"\"").is_err());
    }
}
