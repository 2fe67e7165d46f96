use std::fmt;

/// The version of client behavior to adhere to
///
/// Pinning a behavior version keeps a client's behavior stable across
/// library upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BehaviorVersion {
    /// Behavior as of 2025-01-20
    V2025_01_20,
}

impl BehaviorVersion {
    /// The most recent behavior version
    pub const fn latest() -> Self {
        Self::V2025_01_20
    }

    /// The identifier of the behavior version
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2025_01_20 => "V20250120",
        }
    }
}

impl Default for BehaviorVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for BehaviorVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
