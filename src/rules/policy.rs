use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{RuleViolation, Severity};

/// Policy verdict: the final pass/fail decision after applying the ignore
/// list and severity overrides to broken rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_violations: usize,
    pub effective_violations: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
}

/// Policy configuration loaded from the `[policy]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Rule IDs to ignore entirely.
    #[serde(default)]
    pub ignore_rules: HashSet<String>,
    /// Per-rule severity overrides.
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

fn default_fail_on() -> Severity {
    Severity::High
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: default_fail_on(),
            ignore_rules: HashSet::new(),
            overrides: HashMap::new(),
        }
    }
}

impl Policy {
    /// Evaluate violations against this policy. Passing outcomes kept for
    /// reporting never count.
    pub fn evaluate(&self, violations: &[RuleViolation]) -> PolicyVerdict {
        let broken: Vec<&RuleViolation> = violations.iter().filter(|v| v.broken).collect();
        let effective: Vec<Severity> = broken
            .iter()
            .filter(|v| !self.ignore_rules.contains(&v.rule_id))
            .map(|v| self.severity_of(v))
            .collect();

        let highest = effective.iter().copied().max();
        let failed = effective.iter().any(|&sev| sev >= self.fail_on);

        PolicyVerdict {
            pass: !failed,
            total_violations: broken.len(),
            effective_violations: effective.len(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
        }
    }

    /// Remove ignored rules and apply severity overrides.
    pub fn apply(&self, violations: &[RuleViolation]) -> Vec<RuleViolation> {
        violations
            .iter()
            .filter(|v| !self.ignore_rules.contains(&v.rule_id))
            .map(|v| {
                let mut v = v.clone();
                v.severity = self.severity_of(&v);
                v
            })
            .collect()
    }

    fn severity_of(&self, violation: &RuleViolation) -> Severity {
        self.overrides
            .get(&violation.rule_id)
            .copied()
            .unwrap_or(violation.severity)
    }
}
