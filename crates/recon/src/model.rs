use serde::Serialize;

use crate::config::{Direction, MatchMode};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Where a title was scraped or fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Wiki,
    Catalogue,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wiki => write!(f, "wiki"),
            Self::Catalogue => write!(f, "catalogue"),
        }
    }
}

/// An extracted title exactly as it appeared in its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTitle {
    pub text: String,
    pub source: Source,
    /// Position in the source's own sequence (anchor order / record order).
    pub index: usize,
}

impl RawTitle {
    pub fn new(text: impl Into<String>, source: Source, index: usize) -> Self {
        Self {
            text: text.into(),
            source,
            index,
        }
    }
}

/// Structured fields of a catalogue record (`index *^* [category *^*] display`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordLabel {
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub display: String,
}

/// A raw title, optionally carrying the catalogue's pre-structured label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedTitle {
    pub raw: RawTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<RecordLabel>,
}

impl AnnotatedTitle {
    pub fn plain(raw: RawTitle) -> Self {
        Self { raw, label: None }
    }

    /// The text that takes part in matching: the label's display field
    /// when present, the raw text otherwise.
    pub fn display(&self) -> &str {
        match &self.label {
            Some(label) => &label.display,
            None => &self.raw.text,
        }
    }

    pub fn record_index(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.index.as_str())
    }

    pub fn category(&self) -> Option<&str> {
        self.label.as_ref().and_then(|l| l.category.as_deref())
    }
}

impl From<RawTitle> for AnnotatedTitle {
    fn from(raw: RawTitle) -> Self {
        Self::plain(raw)
    }
}

/// Recoverable problem found while turning a source payload into titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub raw: String,
    pub message: String,
}

/// One side of a reconciliation run, already extracted and parsed.
#[derive(Debug, Clone)]
pub struct SideInput {
    pub label: String,
    pub titles: Vec<AnnotatedTitle>,
    pub issues: Vec<ParseIssue>,
}

impl SideInput {
    pub fn new(label: impl Into<String>, titles: Vec<AnnotatedTitle>) -> Self {
        Self {
            label: label.into(),
            titles,
            issues: Vec::new(),
        }
    }

    pub fn with_issues(mut self, issues: Vec<ParseIssue>) -> Self {
        self.issues = issues;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReconInput {
    pub a: SideInput,
    pub b: SideInput,
}

// ---------------------------------------------------------------------------
// Canonical keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "a"),
            Self::B => write!(f, "b"),
        }
    }
}

/// Back-reference from a derived value to the title it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TitleRef {
    pub side: Side,
    pub position: usize,
}

/// Normalized comparison form of a title. Never outlives the run's inputs;
/// `source` points back into them instead of owning the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalKey {
    key: String,
    source: TitleRef,
}

impl CanonicalKey {
    pub fn new(key: String, source: TitleRef) -> Self {
        Self { key, source }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> TitleRef {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// Empty keys never match anything, including other empty keys.
    pub fn is_matchable(&self) -> bool {
        !self.key.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Equivalence {
    Equivalent,
    Distinct,
}

/// Pairwise decision plus the numbers it was based on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchVerdict {
    pub equivalence: Equivalence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<f64>,
    pub longer_len: usize,
    pub shorter_len: usize,
}

impl MatchVerdict {
    pub fn is_equivalent(&self) -> bool {
        self.equivalence == Equivalence::Equivalent
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchedPair {
    pub a: AnnotatedTitle,
    pub b: AnnotatedTitle,
    pub verdict: MatchVerdict,
}

impl MatchedPair {
    /// Catalogue label carried through the pairing, from whichever side has one.
    pub fn label(&self) -> Option<&RecordLabel> {
        self.b.label.as_ref().or(self.a.label.as_ref())
    }

    /// Name reported next to the label: the unlabelled side's original text.
    pub fn report_name(&self) -> &str {
        if self.b.label.is_some() {
            &self.a.raw.text
        } else if self.a.label.is_some() {
            &self.b.raw.text
        } else {
            &self.a.raw.text
        }
    }
}

/// A title whose canonical form depends on which rule-set variant ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub side: Side,
    pub source: Source,
    pub original: String,
    pub primary: String,
    pub variant: String,
}

/// Classified output of one reconciliation.
///
/// `missing_from_a` holds side-A titles with no equivalent on side B;
/// `missing_from_b` holds side-B titles with no equivalent on side A.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationResult {
    pub matched: Vec<MatchedPair>,
    pub missing_from_a: Vec<AnnotatedTitle>,
    pub missing_from_b: Vec<AnnotatedTitle>,
    pub audit: Vec<AuditEntry>,
}

// ---------------------------------------------------------------------------
// Summary + Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct SideSummary {
    pub label: String,
    pub total: usize,
    pub missing: usize,
    pub parse_issues: usize,
    pub empty_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub a: SideSummary,
    pub b: SideSummary,
    pub matched: usize,
    pub divergences: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SideIssue {
    pub side: Side,
    #[serde(flatten)]
    pub issue: ParseIssue,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub direction: Direction,
    pub match_mode: MatchMode,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: RunSummary,
    pub result: ReconciliationResult,
    pub issues: Vec<SideIssue>,
}
