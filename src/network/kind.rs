use serde::{Serialize, Deserialize};

/// Network type tag, the leading enumerant of every flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    Adaline,
    BackProp,
    SelfOrganizing,
    EpochBackProp,
    Rprop,
}

impl NetworkKind {
    /// Integer written to the flat buffer. Values 3 and 4 are reserved.
    pub fn tag(self) -> u32 {
        match self {
            NetworkKind::Adaline => 0,
            NetworkKind::BackProp => 1,
            NetworkKind::SelfOrganizing => 2,
            NetworkKind::EpochBackProp => 5,
            NetworkKind::Rprop => 6,
        }
    }

    pub fn from_tag(tag: f64) -> Option<NetworkKind> {
        if tag.fract() != 0.0 {
            return None;
        }
        match tag as i64 {
            0 => Some(NetworkKind::Adaline),
            1 => Some(NetworkKind::BackProp),
            2 => Some(NetworkKind::SelfOrganizing),
            5 => Some(NetworkKind::EpochBackProp),
            6 => Some(NetworkKind::Rprop),
            _ => None,
        }
    }
}
