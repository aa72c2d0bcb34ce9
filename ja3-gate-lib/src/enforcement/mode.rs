use std::fmt;

/// How unrecognized JA3 hashes are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnforcementMode {
    /// Annotate requests with the raw hash, never reject
    #[default]
    Permissive,
    /// Classify hashes and reject those missing from the database
    Strict,
}

impl EnforcementMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Permissive
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => f.write_str("permissive"),
            Self::Strict => f.write_str("strict"),
        }
    }
}
