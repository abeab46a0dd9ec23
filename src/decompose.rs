//! Credit-hour decomposition.
//!
//! Turns a unit's weekly credit hours into an ordered list of sessions:
//!
//! - `credit_hours >= 2`: one 2-hour physical session, then one 1-hour
//!   session per remaining hour (mode chosen by [`DecompositionPolicy`]).
//! - `credit_hours == 1`: a single 1-hour physical session.
//! - `credit_hours == 0`: no sessions. Callers treat this as missing data.

use serde::{Deserialize, Serialize};

use crate::models::{DeliveryMode, Enrollment, SessionRef, SessionSpec, Unit};

/// Length of the leading physical session, in hours.
pub const LEAD_SESSION_HOURS: u32 = 2;

/// Mode of the 1-hour sessions that follow the leading 2-hour session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecompositionPolicy {
    /// Every follow-up hour is online.
    #[default]
    AllOnline,
    /// Follow-up hours alternate online, physical, online, ...
    Alternating,
    /// Every follow-up hour is physical.
    AllPhysical,
}

impl DecompositionPolicy {
    /// Mode of the `k`-th follow-up session (0-indexed).
    fn follow_up_mode(self, k: u32) -> DeliveryMode {
        match self {
            DecompositionPolicy::AllOnline => DeliveryMode::Online,
            DecompositionPolicy::AllPhysical => DeliveryMode::Physical,
            DecompositionPolicy::Alternating if k % 2 == 0 => DeliveryMode::Online,
            DecompositionPolicy::Alternating => DeliveryMode::Physical,
        }
    }
}

/// Durations (hours) and modes for `credit_hours`, without identifiers.
pub fn session_plan(credit_hours: u32, policy: DecompositionPolicy) -> Vec<(u32, DeliveryMode)> {
    match credit_hours {
        0 => Vec::new(),
        h if h < LEAD_SESSION_HOURS => vec![(h, DeliveryMode::Physical)],
        h => {
            let mut plan = vec![(LEAD_SESSION_HOURS, DeliveryMode::Physical)];
            plan.extend((0..h - LEAD_SESSION_HOURS).map(|k| (1, policy.follow_up_mode(k))));
            plan
        }
    }
}

/// Decomposes a unit taught under `enrollment` into session specs.
pub fn decompose(unit: &Unit, enrollment: &Enrollment, policy: DecompositionPolicy) -> Vec<SessionSpec> {
    session_plan(unit.credit_hours, policy)
        .into_iter()
        .enumerate()
        .map(|(index, (hours, mode))| {
            let session_ref = SessionRef {
                unit_id: unit.id.clone(),
                semester: enrollment.semester.clone(),
                class_id: enrollment.class_id.clone(),
                group_id: enrollment.group_id.clone(),
                index: index as u32,
            };
            SessionSpec::new(
                session_ref,
                enrollment.lecturer.clone(),
                enrollment.student_count,
                hours * 60,
                mode,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeliveryMode::{Online, Physical};

    #[test]
    fn test_plan_examples() {
        let p = DecompositionPolicy::AllOnline;
        assert_eq!(session_plan(2, p), vec![(2, Physical)]);
        assert_eq!(session_plan(3, p), vec![(2, Physical), (1, Online)]);
        assert_eq!(session_plan(1, p), vec![(1, Physical)]);
        assert!(session_plan(0, p).is_empty());
    }

    #[test]
    fn test_plan_alternating() {
        let plan = session_plan(5, DecompositionPolicy::Alternating);
        assert_eq!(
            plan,
            vec![(2, Physical), (1, Online), (1, Physical), (1, Online)]
        );
    }

    #[test]
    fn test_plan_all_physical() {
        let plan = session_plan(4, DecompositionPolicy::AllPhysical);
        assert!(plan.iter().all(|&(_, m)| m == Physical));
        assert_eq!(plan.iter().map(|&(h, _)| h).sum::<u32>(), 4);
    }

    #[test]
    fn test_total_hours_preserved() {
        for credits in 0..8 {
            let total: u32 = session_plan(credits, DecompositionPolicy::Alternating)
                .iter()
                .map(|&(h, _)| h)
                .sum();
            assert_eq!(total, credits);
        }
    }

    #[test]
    fn test_decompose_carries_identifiers() {
        let unit = Unit::new("U1", 3).with_code("CS101");
        let enrollment = Enrollment::new("U1", "CS-1A", "L1", 45)
            .with_semester("2026-1")
            .with_group("G1");
        let specs = decompose(&unit, &enrollment, DecompositionPolicy::default());

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].required_duration_min, 120);
        assert_eq!(specs[0].mode, Physical);
        assert_eq!(specs[1].required_duration_min, 60);
        assert_eq!(specs[1].mode, Online);
        for (i, s) in specs.iter().enumerate() {
            assert_eq!(s.session_ref.index, i as u32);
            assert_eq!(s.session_ref.semester, "2026-1");
            assert_eq!(s.group_id(), Some("G1"));
            assert_eq!(s.lecturer, "L1");
            assert_eq!(s.student_count, 45);
        }
    }
}
