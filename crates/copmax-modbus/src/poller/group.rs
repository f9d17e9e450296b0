// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Register groups and their snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::ValueKind;
use crate::types::RegisterSpace;

// =============================================================================
// RegisterGroup
// =============================================================================

/// A block of controller registers polled and tracked as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterGroup {
    /// Measured temperatures, input registers 0..=5.
    Temperatures,
    /// User setpoints, holding registers 38..=56.
    UserSettings,
    /// Status flags, input registers 6..=20.
    Status,
    /// Special-function flags, holding registers 24..=37.
    SpecialFunctions,
}

impl RegisterGroup {
    /// Groups in poll order.
    pub const ALL: [RegisterGroup; 4] = [
        Self::Temperatures,
        Self::UserSettings,
        Self::Status,
        Self::SpecialFunctions,
    ];

    /// How this group's words are exposed.
    pub const fn value_kind(&self) -> ValueKind {
        match self {
            Self::Status => ValueKind::Raw,
            Self::Temperatures | Self::UserSettings | Self::SpecialFunctions => ValueKind::Signed,
        }
    }

    /// Register space the group lives in.
    pub const fn space(&self) -> RegisterSpace {
        match self {
            Self::Temperatures | Self::Status => RegisterSpace::Input,
            Self::UserSettings | Self::SpecialFunctions => RegisterSpace::Holding,
        }
    }

    /// Position in [`RegisterGroup::ALL`].
    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Temperatures => 0,
            Self::UserSettings => 1,
            Self::Status => 2,
            Self::SpecialFunctions => 3,
        }
    }

    /// Returns the snake_case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Temperatures => "temperatures",
            Self::UserSettings => "user_settings",
            Self::Status => "status",
            Self::SpecialFunctions => "special_functions",
        }
    }
}

impl fmt::Display for RegisterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegisterGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "temperatures" | "temps" => Ok(Self::Temperatures),
            "user_settings" | "settings" => Ok(Self::UserSettings),
            "status" => Ok(Self::Status),
            "special_functions" | "special" => Ok(Self::SpecialFunctions),
            other => Err(format!("unknown register group '{other}'")),
        }
    }
}

// =============================================================================
// GroupSnapshot
// =============================================================================

/// Immutable view of one group's last known state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    /// Register address to decoded value.
    pub values: BTreeMap<u16, i32>,
    /// `true` once a full read succeeded and the data has not gone stale.
    pub valid: bool,
    /// Time of the last successful read.
    pub last_updated: Option<DateTime<Utc>>,
}

impl GroupSnapshot {
    /// Returns the value at `address`, if present.
    pub fn get(&self, address: u16) -> Option<i32> {
        self.values.get(&address).copied()
    }

    /// Returns the value at `address` divided by `scale`, for hundredths-encoded registers.
    pub fn scaled(&self, address: u16, scale: f64) -> Option<f64> {
        self.get(address).map(|v| v as f64 / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        assert_eq!(RegisterGroup::Status.value_kind(), ValueKind::Raw);
        assert_eq!(RegisterGroup::Temperatures.value_kind(), ValueKind::Signed);
    }

    #[test]
    fn test_index_matches_poll_order() {
        for (i, group) in RegisterGroup::ALL.iter().enumerate() {
            assert_eq!(group.index(), i);
        }
    }

    #[test]
    fn test_group_from_str() {
        assert_eq!("user-settings".parse::<RegisterGroup>().unwrap(), RegisterGroup::UserSettings);
        assert_eq!("Status".parse::<RegisterGroup>().unwrap(), RegisterGroup::Status);
        assert!("boiler".parse::<RegisterGroup>().is_err());
    }

    #[test]
    fn test_snapshot_scaled() {
        let mut snapshot = GroupSnapshot::default();
        snapshot.values.insert(0, 2150);
        snapshot.values.insert(1, -350);

        assert_eq!(snapshot.scaled(0, 100.0), Some(21.5));
        assert_eq!(snapshot.scaled(1, 100.0), Some(-3.5));
        assert_eq!(snapshot.get(2), None);
    }

    #[test]
    fn test_snapshot_serializes_shape() {
        let snapshot = GroupSnapshot::default();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["valid"], false);
        assert!(json["last_updated"].is_null());
        assert!(json["values"].as_object().unwrap().is_empty());
    }
}
