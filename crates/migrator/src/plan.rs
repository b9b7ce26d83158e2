//! Transition planning
//!
//! Given the ordered versions and the current marker, decide which migrations
//! a transition executes and which marker it leaves behind. Planning touches
//! no database, so every state transition is checked here before a
//! transaction is opened.

use crate::error::{MigrationError, MigrationResult};
use crate::migration::MigrationDirection;

/// Engine transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Advance exactly one step
    Up,
    /// Retreat exactly one step
    Down,
    /// Advance to the last registered version
    Run,
}

impl Transition {
    /// Direction in which the planned migrations are executed
    pub fn direction(self) -> MigrationDirection {
        match self {
            Transition::Up | Transition::Run => MigrationDirection::Up,
            Transition::Down => MigrationDirection::Down,
        }
    }
}

/// Migrations to execute for one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Direction of every step
    pub direction: MigrationDirection,
    /// Ordered positions of the migrations to execute, in execution order
    pub steps: Vec<usize>,
    /// Marker value once all steps succeed (`None` = nothing applied)
    pub target: Option<String>,
}

impl Plan {
    fn noop(direction: MigrationDirection, current: Option<&str>) -> Self {
        Self {
            direction,
            steps: Vec::new(),
            target: current.map(str::to_string),
        }
    }

    /// Whether the transition leaves the database untouched
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Resolve the marker against the ordered versions.
///
/// `Ok(None)` means the marker is empty. A marker that matches no registered
/// version is an [`MigrationError::UnresolvedVersion`].
pub fn resolve<S: AsRef<str>>(versions: &[S], current: Option<&str>) -> MigrationResult<Option<usize>> {
    match current {
        None => Ok(None),
        Some(version) => versions
            .iter()
            .position(|v| v.as_ref() == version)
            .map(Some)
            .ok_or_else(|| MigrationError::UnresolvedVersion {
                version: version.to_string(),
            }),
    }
}

/// Plan `transition` from the `current` marker over ascending `versions`
pub fn plan<S: AsRef<str>>(
    transition: Transition,
    versions: &[S],
    current: Option<&str>,
) -> MigrationResult<Plan> {
    let direction = transition.direction();
    if versions.is_empty() {
        return Ok(Plan::noop(direction, current));
    }

    let position = resolve(versions, current)?;
    let last = versions.len() - 1;

    let plan = match (transition, position) {
        (Transition::Up, None) => Plan {
            direction,
            steps: vec![0],
            target: Some(versions[0].as_ref().to_string()),
        },
        (Transition::Up, Some(i)) if i == last => Plan::noop(direction, current),
        (Transition::Up, Some(i)) => Plan {
            direction,
            steps: vec![i + 1],
            target: Some(versions[i + 1].as_ref().to_string()),
        },
        (Transition::Down, None) => Plan::noop(direction, current),
        (Transition::Down, Some(i)) => Plan {
            direction,
            steps: vec![i],
            target: i.checked_sub(1).map(|prev| versions[prev].as_ref().to_string()),
        },
        (Transition::Run, Some(i)) if i == last => Plan::noop(direction, current),
        (Transition::Run, position) => {
            let first = position.map_or(0, |i| i + 1);
            Plan {
                direction,
                steps: (first..=last).collect(),
                target: Some(versions[last].as_ref().to_string()),
            }
        }
    };

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "20240101000000000";
    const B: &str = "20240102000000000";
    const C: &str = "20240103000000000";

    fn abc() -> Vec<&'static str> {
        vec![A, B, C]
    }

    #[test]
    fn test_empty_registry_is_noop() {
        let empty: Vec<&str> = Vec::new();
        for transition in [Transition::Up, Transition::Down, Transition::Run] {
            let plan = plan(transition, &empty, None).unwrap();
            assert!(plan.is_noop());
            assert_eq!(plan.target, None);
        }

        // Nothing to resolve against, so even an unknown marker is left alone.
        let plan = plan(Transition::Up, &empty, Some(A)).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.target.as_deref(), Some(A));
    }

    #[test]
    fn test_up_from_empty_applies_first() {
        let plan = plan(Transition::Up, &abc(), None).unwrap();
        assert_eq!(plan.direction, MigrationDirection::Up);
        assert_eq!(plan.steps, vec![0]);
        assert_eq!(plan.target.as_deref(), Some(A));
    }

    #[test]
    fn test_up_advances_one_step() {
        let plan = plan(Transition::Up, &abc(), Some(A)).unwrap();
        assert_eq!(plan.steps, vec![1]);
        assert_eq!(plan.target.as_deref(), Some(B));
    }

    #[test]
    fn test_up_at_head_is_noop() {
        let plan = plan(Transition::Up, &abc(), Some(C)).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.target.as_deref(), Some(C));
    }

    #[test]
    fn test_down_from_empty_is_noop() {
        let plan = plan(Transition::Down, &abc(), None).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.target, None);
    }

    #[test]
    fn test_down_reverts_current() {
        let plan = plan(Transition::Down, &abc(), Some(B)).unwrap();
        assert_eq!(plan.direction, MigrationDirection::Down);
        assert_eq!(plan.steps, vec![1]);
        assert_eq!(plan.target.as_deref(), Some(A));
    }

    #[test]
    fn test_down_from_first_clears_marker() {
        let plan = plan(Transition::Down, &abc(), Some(A)).unwrap();
        assert_eq!(plan.steps, vec![0]);
        assert_eq!(plan.target, None);
    }

    #[test]
    fn test_run_from_empty_applies_everything() {
        let plan = plan(Transition::Run, &abc(), None).unwrap();
        assert_eq!(plan.steps, vec![0, 1, 2]);
        assert_eq!(plan.target.as_deref(), Some(C));
    }

    #[test]
    fn test_run_applies_remaining_contiguously() {
        let plan = plan(Transition::Run, &abc(), Some(A)).unwrap();
        assert_eq!(plan.steps, vec![1, 2]);
        assert_eq!(plan.target.as_deref(), Some(C));
    }

    #[test]
    fn test_run_at_head_is_noop() {
        let plan = plan(Transition::Run, &abc(), Some(C)).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.target.as_deref(), Some(C));
    }

    #[test]
    fn test_unknown_marker_is_unresolved_for_every_transition() {
        for transition in [Transition::Up, Transition::Down, Transition::Run] {
            match plan(transition, &abc(), Some("20231231000000000")) {
                Err(MigrationError::UnresolvedVersion { version }) => {
                    assert_eq!(version, "20231231000000000")
                }
                other => panic!("expected unresolved version for {:?}, got {:?}", transition, other),
            }
        }
    }

    #[test]
    fn test_repeated_up_walks_the_sequence() {
        for size in 0..6 {
            let versions: Vec<String> = (0..size).map(|i| format!("2024010{}000000000", i)).collect();
            let mut marker: Option<String> = None;

            for k in 1..=size + 2 {
                let plan = plan(Transition::Up, &versions, marker.as_deref()).unwrap();
                if k <= size {
                    assert_eq!(plan.steps, vec![k - 1]);
                    assert_eq!(plan.target.as_deref(), Some(versions[k - 1].as_str()));
                } else {
                    assert!(plan.is_noop());
                }
                marker = plan.target;
            }

            let run = plan(Transition::Run, &versions, None).unwrap();
            assert_eq!(run.target, marker, "run and repeated up disagree for {} versions", size);
            assert_eq!(run.steps, (0..size).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_down_undoes_up() {
        let versions = abc();
        let mut marker: Option<String> = None;

        for _ in 0..versions.len() {
            let before = marker.clone();
            let up = plan(Transition::Up, &versions, marker.as_deref()).unwrap();
            let down = plan(Transition::Down, &versions, up.target.as_deref()).unwrap();

            assert_eq!(down.steps, up.steps);
            assert_eq!(down.target, before);
            marker = up.target;
        }
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(&abc(), None).unwrap(), None);
        assert_eq!(resolve(&abc(), Some(B)).unwrap(), Some(1));
        assert!(resolve(&abc(), Some("x")).unwrap_err().is_unresolved_version());
    }
}
