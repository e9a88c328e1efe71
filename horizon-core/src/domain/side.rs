use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a held position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Long exposure (+1)
    Long,
    /// Short exposure (-1)
    Short,
}

impl Side {
    /// Signed unit value: +1 for long, -1 for short.
    pub fn sign(self) -> i32 {
        match self {
            Side::Long => 1,
            Side::Short => -1,
        }
    }

}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}
