//! Scenario model: actions, steps and groups.
//!
//! Steps within a group execute strictly in declared order; DOM state is a
//! sequential dependency chain, so insertion order is significant. The only
//! non-fail-fast construct is `try_optional`, a declared two-branch
//! composition for UI elements that exist only under certain data states.

use serde::{Deserialize, Serialize};

use wardsnap_browser::Viewport;

use crate::error::{HarnessError, HarnessResult};

/// A single primitive invocation, or the `try_optional` composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Navigate {
        url: String,
    },
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    Fill {
        selector: String,
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    SelectOption {
        selector: String,
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    AcceptNextDialog,
    EvalPageFn {
        name: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
    WaitFor {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    WaitStable {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    Settle {
        ms: u64,
    },
    /// Attempt `attempt`; iff it fails with `ElementNotFound` within
    /// `timeout_ms`, run `fallback` instead without propagating the
    /// original failure. Both arms must be atomic primitives.
    TryOptional {
        attempt: Box<Action>,
        fallback: Box<Action>,
        timeout_ms: u64,
    },
}

impl Action {
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Action::TryOptional { .. })
    }
}

/// An ordered unit of work with a stable name and declared ordinal.
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    /// Fixed at declaration time, never computed from accumulated state.
    pub ordinal: u32,
    pub actions: Vec<Action>,
    /// Whether this step captures a screenshot artifact.
    pub capture: bool,
}

impl Step {
    pub fn new(ordinal: u32, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ordinal,
            actions: Vec::new(),
            capture: false,
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }
}

/// A viewport-scoped, ordered sequence of steps sharing one application
/// state lineage (no reset between groups unless a step re-navigates).
#[derive(Debug, Clone)]
pub struct ScenarioGroup {
    pub name: String,
    pub viewport: Viewport,
    pub steps: Vec<Step>,
}

impl ScenarioGroup {
    pub fn new(name: &str, viewport: Viewport, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            viewport,
            steps,
        }
    }

    pub fn capture_count(&self) -> usize {
        self.steps.iter().filter(|s| s.capture).count()
    }

    fn validate(&self) -> HarnessResult<()> {
        let mut ordinals = std::collections::HashSet::new();
        let mut names = std::collections::HashSet::new();
        for step in &self.steps {
            if step.name.is_empty() {
                return Err(HarnessError::InvalidScenario(format!(
                    "group '{}' has a step with an empty name",
                    self.name
                )));
            }
            if !ordinals.insert(step.ordinal) {
                return Err(HarnessError::InvalidScenario(format!(
                    "group '{}' declares ordinal {} twice",
                    self.name, step.ordinal
                )));
            }
            if !names.insert(step.name.as_str()) {
                return Err(HarnessError::InvalidScenario(format!(
                    "group '{}' declares step '{}' twice",
                    self.name, step.name
                )));
            }
            for action in &step.actions {
                if let Action::TryOptional {
                    attempt, fallback, ..
                } = action
                {
                    if !attempt.is_atomic() || !fallback.is_atomic() {
                        return Err(HarnessError::InvalidScenario(format!(
                            "step '{}/{}' nests try_optional arms",
                            self.name, step.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Validate the full declared run: group name uniqueness, per-group step
/// rules, and artifact path uniqueness across the whole run.
pub fn validate_groups(groups: &[ScenarioGroup]) -> HarnessResult<()> {
    let mut group_names = std::collections::HashSet::new();
    let mut paths = std::collections::HashSet::new();
    for group in groups {
        if !group_names.insert(group.name.as_str()) {
            return Err(HarnessError::InvalidScenario(format!(
                "group '{}' declared twice",
                group.name
            )));
        }
        group.validate()?;
        for step in group.steps.iter().filter(|s| s.capture) {
            let path = format!("{}/{:02}-{}.png", group.name, step.ordinal, step.name);
            if !paths.insert(path.clone()) {
                return Err(HarnessError::InvalidScenario(format!(
                    "artifact path '{path}' declared twice"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(selector: &str) -> Action {
        Action::Click {
            selector: selector.to_string(),
            timeout_ms: None,
        }
    }

    #[test]
    fn duplicate_ordinals_rejected() {
        let group = ScenarioGroup::new(
            "g",
            Viewport::DESKTOP,
            vec![Step::new(1, "a"), Step::new(1, "b")],
        );
        let err = validate_groups(&[group]).err().unwrap();
        assert!(matches!(err, HarnessError::InvalidScenario(_)));
    }

    #[test]
    fn duplicate_step_names_rejected() {
        let group = ScenarioGroup::new(
            "g",
            Viewport::DESKTOP,
            vec![Step::new(1, "a"), Step::new(2, "a")],
        );
        assert!(validate_groups(&[group]).is_err());
    }

    #[test]
    fn nested_try_optional_rejected() {
        let nested = Action::TryOptional {
            attempt: Box::new(Action::TryOptional {
                attempt: Box::new(click("#x")),
                fallback: Box::new(click("#y")),
                timeout_ms: 500,
            }),
            fallback: Box::new(click("#z")),
            timeout_ms: 500,
        };
        let group = ScenarioGroup::new(
            "g",
            Viewport::DESKTOP,
            vec![Step::new(1, "a").action(nested)],
        );
        assert!(validate_groups(&[group]).is_err());
    }

    #[test]
    fn duplicate_group_names_rejected() {
        let groups = vec![
            ScenarioGroup::new("g", Viewport::DESKTOP, vec![Step::new(1, "a")]),
            ScenarioGroup::new("g", Viewport::TABLET, vec![Step::new(1, "b")]),
        ];
        assert!(validate_groups(&groups).is_err());
    }

    #[test]
    fn well_formed_groups_pass() {
        let groups = vec![
            ScenarioGroup::new(
                "desktop",
                Viewport::DESKTOP,
                vec![
                    Step::new(1, "dashboard").action(click("#a")).capture(),
                    Step::new(2, "patients")
                        .action(Action::TryOptional {
                            attempt: Box::new(click("#maybe")),
                            fallback: Box::new(click("#fallback")),
                            timeout_ms: 500,
                        })
                        .capture(),
                ],
            ),
            ScenarioGroup::new(
                "mobile",
                Viewport::MOBILE,
                vec![Step::new(1, "dashboard").capture()],
            ),
        ];
        validate_groups(&groups).unwrap();
    }

    #[test]
    fn actions_round_trip_through_tagged_serde() {
        let action = Action::TryOptional {
            attempt: Box::new(click("#assign")),
            fallback: Box::new(Action::EvalPageFn {
                name: "showBedDetail".to_string(),
                args: vec![serde_json::json!(1)],
            }),
            timeout_ms: 1500,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""action":"try_optional""#));
        let back: Action = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Action::TryOptional { .. }));
    }
}
