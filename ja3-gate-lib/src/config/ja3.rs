use serde::Deserialize;

use crate::enforcement::EnforcementMode;

/// JA3 gate configuration
///
/// Exactly one option is recognized. Unknown keys are rejected when the
/// configuration is loaded, so a typo never silently disables enforcement.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Ja3Config {
    /// Reject connections whose JA3 hash is not in the fingerprint database.
    /// When false, requests are only annotated with the raw `ja3` header.
    /// Also accepted as `block_bots`.
    /// Default: false
    #[serde(default, alias = "block_bots")]
    pub strict_enforcement: bool,
}

impl Ja3Config {
    pub fn mode(&self) -> EnforcementMode {
        EnforcementMode::from_strict(self.strict_enforcement)
    }
}
