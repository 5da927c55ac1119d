use crate::model::{ReconInput, ReconciliationResult, RunSummary, SideSummary};

/// Compute per-side counts from a classified result.
pub fn compute_summary(
    input: &ReconInput,
    result: &ReconciliationResult,
    empty_keys: (usize, usize),
) -> RunSummary {
    RunSummary {
        a: SideSummary {
            label: input.a.label.clone(),
            total: input.a.titles.len(),
            missing: result.missing_from_a.len(),
            parse_issues: input.a.issues.len(),
            empty_keys: empty_keys.0,
        },
        b: SideSummary {
            label: input.b.label.clone(),
            total: input.b.titles.len(),
            missing: result.missing_from_b.len(),
            parse_issues: input.b.issues.len(),
            empty_keys: empty_keys.1,
        },
        matched: result.matched.len(),
        divergences: result.audit.len(),
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "matched: {}", self.matched)?;
        for side in [&self.a, &self.b] {
            writeln!(
                f,
                "{}: {} titles, {} missing, {} skipped records, {} empty keys",
                side.label, side.total, side.missing, side.parse_issues, side.empty_keys
            )?;
        }
        write!(f, "rule divergences: {}", self.divergences)
    }
}
