//! Run report - the per-group summary rendered at the end of a run.
//!
//! Console-only; a failed run still leaves whatever artifacts were captured
//! before the failure, so partial output stays usable for diagnosis.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub captured: usize,
    pub expected: usize,
}

/// The first fatal error of the run, if any.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub group: String,
    pub step: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub groups: Vec<GroupSummary>,
    pub duration_ms: u64,
    pub failure: Option<RunFailure>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failure.is_none() && self.groups.iter().all(|g| g.captured == g.expected)
    }

    pub fn total_captured(&self) -> usize {
        self.groups.iter().map(|g| g.captured).sum()
    }

    pub fn total_expected(&self) -> usize {
        self.groups.iter().map(|g| g.expected).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_full_capture_and_no_failure() {
        let mut report = RunReport {
            groups: vec![GroupSummary {
                group: "desktop".to_string(),
                captured: 3,
                expected: 3,
            }],
            duration_ms: 10,
            failure: None,
        };
        assert!(report.success());

        report.groups[0].captured = 2;
        assert!(!report.success());

        report.groups[0].captured = 3;
        report.failure = Some(RunFailure {
            group: "desktop".to_string(),
            step: "x".to_string(),
            message: "boom".to_string(),
        });
        assert!(!report.success());
    }
}
