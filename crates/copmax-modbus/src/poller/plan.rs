// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Fixed read plans for each register group.
//!
//! A plan is an ordered list of [`ReadStep`]s. The first step replaces the
//! group's values; later steps only run while the group is valid and merge
//! into it.

use crate::types::RegisterSpace;

use super::group::RegisterGroup;

/// One contiguous range request within a group's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStep {
    /// Register space to read from.
    pub space: RegisterSpace,
    /// First register address (0-based).
    pub start: u16,
    /// Number of registers expected back.
    pub count: u16,
    /// Merge into existing values instead of replacing them.
    pub merge: bool,
}

impl ReadStep {
    const fn replace(space: RegisterSpace, start: u16, count: u16) -> Self {
        Self {
            space,
            start,
            count,
            merge: false,
        }
    }

    const fn merge(space: RegisterSpace, start: u16, count: u16) -> Self {
        Self {
            space,
            start,
            count,
            merge: true,
        }
    }

    /// Last register address covered by this step. An empty step ends at its start.
    pub const fn end(&self) -> u16 {
        self.start.saturating_add(self.count.saturating_sub(1))
    }
}

const TEMPERATURES: &[ReadStep] = &[ReadStep::replace(RegisterSpace::Input, 0, 6)];

const USER_SETTINGS: &[ReadStep] = &[
    ReadStep::replace(RegisterSpace::Holding, 38, 6),
    ReadStep::merge(RegisterSpace::Holding, 44, 6),
    ReadStep::merge(RegisterSpace::Holding, 50, 7),
];

const STATUS: &[ReadStep] = &[
    ReadStep::replace(RegisterSpace::Input, 6, 7),
    ReadStep::merge(RegisterSpace::Input, 13, 8),
];

const SPECIAL_FUNCTIONS: &[ReadStep] = &[
    ReadStep::replace(RegisterSpace::Holding, 24, 6),
    ReadStep::merge(RegisterSpace::Holding, 30, 8),
];

/// Returns the read plan for `group`.
pub fn plan_for(group: RegisterGroup) -> &'static [ReadStep] {
    match group {
        RegisterGroup::Temperatures => TEMPERATURES,
        RegisterGroup::UserSettings => USER_SETTINGS,
        RegisterGroup::Status => STATUS,
        RegisterGroup::SpecialFunctions => SPECIAL_FUNCTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_step_replaces() {
        for group in RegisterGroup::ALL {
            let plan = plan_for(group);
            assert!(!plan[0].merge, "{group} must start with a replacing step");
            assert!(plan[1..].iter().all(|s| s.merge));
        }
    }

    #[test]
    fn test_steps_are_contiguous_within_group() {
        for group in RegisterGroup::ALL {
            let plan = plan_for(group);
            for pair in plan.windows(2) {
                assert_eq!(pair[0].end() + 1, pair[1].start);
                assert_eq!(pair[0].space, pair[1].space);
            }
            assert!(plan.iter().all(|s| s.space == group.space()));
        }
    }

    #[test]
    fn test_end_of_degenerate_steps() {
        let empty = ReadStep::replace(RegisterSpace::Input, 5, 0);
        assert_eq!(empty.end(), 5);

        let single = ReadStep::merge(RegisterSpace::Holding, 41, 1);
        assert_eq!(single.end(), 41);

        let top = ReadStep::replace(RegisterSpace::Holding, u16::MAX, 2);
        assert_eq!(top.end(), u16::MAX);
    }

    #[test]
    fn test_address_coverage() {
        let user = plan_for(RegisterGroup::UserSettings);
        assert_eq!((user[0].start, user[2].end()), (38, 56));

        let status = plan_for(RegisterGroup::Status);
        assert_eq!((status[0].start, status[1].end()), (6, 20));
        assert_eq!(status[0].space, RegisterSpace::Input);

        let special = plan_for(RegisterGroup::SpecialFunctions);
        assert_eq!((special[0].start, special[1].end()), (24, 37));
    }
}
