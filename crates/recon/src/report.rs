//! Flattened, format-agnostic output tables.
//!
//! The engine only defines row shape: ordered, named string columns. File
//! formats belong to the export crate.

use serde::Serialize;

use crate::model::{AnnotatedTitle, ReconReport, ReconciliationResult, Side, SideIssue};

pub const COL_RULE_INDEX: &str = "RuleIndex";
pub const COL_RULE_NAME: &str = "RuleName";
pub const COL_RULE_CATEGORY: &str = "RuleCategory";
pub const COL_MATCHED_NAME: &str = "MatchedName";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn matched_table(result: &ReconciliationResult) -> OutputTable {
    let labelled = result.matched.iter().any(|p| p.label().is_some());
    let categorized = result
        .matched
        .iter()
        .any(|p| p.label().is_some_and(|l| l.category.is_some()));

    let mut table = match (labelled, categorized) {
        (true, true) => OutputTable::new("matched", &[COL_RULE_INDEX, COL_RULE_NAME, COL_RULE_CATEGORY]),
        (true, false) => OutputTable::new("matched", &[COL_RULE_INDEX, COL_RULE_NAME]),
        (false, _) => OutputTable::new("matched", &[COL_RULE_NAME, COL_MATCHED_NAME]),
    };

    for pair in &result.matched {
        let row = if labelled {
            let label = pair.label();
            let mut row = vec![
                label.map(|l| l.index.clone()).unwrap_or_default(),
                pair.report_name().to_string(),
            ];
            if categorized {
                row.push(label.and_then(|l| l.category.clone()).unwrap_or_default());
            }
            row
        } else {
            vec![pair.a.raw.text.clone(), pair.b.raw.text.clone()]
        };
        table.rows.push(row);
    }
    table
}

/// Titles from `side` with no equivalent on the other side.
pub fn missing_table(result: &ReconciliationResult, side: Side) -> OutputTable {
    let (name, titles): (&str, &[AnnotatedTitle]) = match side {
        Side::A => ("missing_from_a", result.missing_from_a.as_slice()),
        Side::B => ("missing_from_b", result.missing_from_b.as_slice()),
    };

    let labelled = titles.iter().any(|t| t.label.is_some());
    let mut table = if labelled {
        OutputTable::new(name, &[COL_RULE_INDEX, COL_RULE_NAME])
    } else {
        OutputTable::new(name, &[COL_RULE_NAME])
    };

    for title in titles {
        table.rows.push(if labelled {
            vec![
                title.record_index().unwrap_or_default().to_string(),
                title.display().to_string(),
            ]
        } else {
            vec![title.raw.text.clone()]
        });
    }
    table
}

pub fn audit_table(result: &ReconciliationResult) -> OutputTable {
    let mut table = OutputTable::new("audit", &["Source", "Original", "Primary", "Variant"]);
    for entry in &result.audit {
        table.rows.push(vec![
            entry.source.to_string(),
            entry.original.clone(),
            entry.primary.clone(),
            entry.variant.clone(),
        ]);
    }
    table
}

pub fn issues_table(issues: &[SideIssue]) -> OutputTable {
    let mut table = OutputTable::new("issues", &["Side", "Position", "Record", "Problem"]);
    for SideIssue { side, issue } in issues {
        table.rows.push(vec![
            side.to_string(),
            issue.position.map(|p| p.to_string()).unwrap_or_default(),
            issue.raw.clone(),
            issue.message.clone(),
        ]);
    }
    table
}

/// All non-empty tables of a report, in a stable order.
pub fn report_tables(report: &ReconReport) -> Vec<OutputTable> {
    [
        matched_table(&report.result),
        missing_table(&report.result, Side::A),
        missing_table(&report.result, Side::B),
        audit_table(&report.result),
        issues_table(&report.issues),
    ]
    .into_iter()
    .filter(|t| !t.is_empty())
    .collect()
}
