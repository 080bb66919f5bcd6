// Severity tier derived from the number of pending tasks

use std::fmt;

/// Display-only classification of how much is left to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    None,
    Single,
    Some(usize),
    Many,
}

impl Tier {
    /// Largest pending count still reported as an exact number
    pub const SOME_MAX: usize = 5;

    pub fn from_pending(pending: usize) -> Self {
        match pending {
            0 => Tier::None,
            1 => Tier::Single,
            n if n <= Self::SOME_MAX => Tier::Some(n),
            _ => Tier::Many,
        }
    }

    /// Stable machine-readable name
    pub fn name(self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Single => "single",
            Tier::Some(_) => "some",
            Tier::Many => "many",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::None => write!(f, "nothing to do today"),
            Tier::Single => write!(f, "just one task to do"),
            Tier::Some(n) => write!(f, "you have {} tasks to do today", n),
            Tier::Many => write!(f, "OMG there is a lot to do"),
        }
    }
}
