//! Title normalization: an ordered pipeline of named reduction rules.
//!
//! Rule order is fixed: version annotation, citation suffix, comma-year,
//! punctuation, trim/case. Annotations are stripped first so digits inside
//! `(נוסח ...)` never feed the end-anchored citation patterns.
//!
//! The pipeline is re-run until the text stops changing. After the first
//! pass the text is already inside the output alphabet, so later passes can
//! only delete characters; the loop terminates and `normalize` is idempotent.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::NormalizeConfig;
use crate::error::ReconError;
use crate::model::{AnnotatedTitle, CanonicalKey, TitleRef};

/// Leading/trailing noise around a citation suffix: anything that is not a
/// bracket, Latin/Hebrew letter or ASCII digit.
const NOISE: &str = r"[^()\[\]{}a-zA-Zא-ת0-9]*";

pub const DEFAULT_VERSION_MARKERS: [&str; 2] = ["נוסח", "החדשות"];

// ---------------------------------------------------------------------------
// Rule set (configuration)
// ---------------------------------------------------------------------------

/// Which end-anchored enactment-year pattern to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationPattern {
    None,
    /// Any Hebrew token (letters and quote marks), optional dash, 2-6 digits.
    Generic,
    /// A `תש`-year with a gershayim mark, then anything up to trailing digits.
    #[default]
    YearMark,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub version_markers: Vec<String>,
    pub citation: CitationPattern,
    pub comma_year: bool,
    pub keep_brackets: bool,
    pub lowercase: bool,
}

impl RuleSet {
    /// Year-mark citation plus the comma-year fallback.
    pub fn year_mark() -> Self {
        Self {
            version_markers: DEFAULT_VERSION_MARKERS.iter().map(|m| m.to_string()).collect(),
            citation: CitationPattern::YearMark,
            comma_year: true,
            keep_brackets: false,
            lowercase: true,
        }
    }

    /// Generic Hebrew-token citation, no comma-year rule.
    pub fn generic() -> Self {
        Self {
            citation: CitationPattern::Generic,
            comma_year: false,
            ..Self::year_mark()
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for marker in &self.version_markers {
            if marker.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "version markers must not be empty".into(),
                ));
            }
            if marker.chars().any(|c| matches!(c, '(' | ')' | '[' | ']')) {
                return Err(ReconError::ConfigValidation(format!(
                    "version marker '{marker}' must not contain brackets"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::year_mark()
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    VersionAnnotation,
    CitationSuffix,
    CommaYear,
    Punctuation,
    TrimCase,
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionAnnotation => write!(f, "version_annotation"),
            Self::CitationSuffix => write!(f, "citation_suffix"),
            Self::CommaYear => write!(f, "comma_year"),
            Self::Punctuation => write!(f, "punctuation"),
            Self::TrimCase => write!(f, "trim_case"),
        }
    }
}

#[derive(Debug)]
enum RuleKind {
    Strip(Regex),
    Punctuation { keep_brackets: bool },
    TrimCase { lowercase: bool },
}

/// One named transform in the pipeline.
#[derive(Debug)]
pub struct Rule {
    name: RuleName,
    kind: RuleKind,
}

impl Rule {
    fn strip(name: RuleName, pattern: &str) -> Result<Self, ReconError> {
        let re = Regex::new(pattern).map_err(|e| ReconError::Pattern(format!("{name}: {e}")))?;
        Ok(Self {
            name,
            kind: RuleKind::Strip(re),
        })
    }

    pub fn name(&self) -> RuleName {
        self.name
    }

    pub fn apply(&self, text: &str) -> String {
        match &self.kind {
            RuleKind::Strip(re) => re.replace_all(text, "").into_owned(),
            RuleKind::Punctuation { keep_brackets } => collapse_punctuation(text, *keep_brackets),
            RuleKind::TrimCase { lowercase } => {
                let trimmed = text.trim();
                if *lowercase {
                    trimmed.to_ascii_lowercase()
                } else {
                    trimmed.to_string()
                }
            }
        }
    }
}

fn annotation_pattern(markers: &[String]) -> String {
    let alternatives: Vec<String> = markers.iter().map(|m| regex::escape(m.trim())).collect();
    format!(r"[\[(]\s*(?:{})(?:\s[^\])]*)?\s*[\])]", alternatives.join("|"))
}

fn citation_pattern(citation: CitationPattern) -> Option<String> {
    match citation {
        CitationPattern::None => None,
        CitationPattern::Generic => Some(format!(r#"{NOISE}[א-ת"׳]+\s*(?:[-–]\s*)?\d{{2,6}}{NOISE}$"#)),
        CitationPattern::YearMark => Some(format!(
            r#"{NOISE}ה?תש(?:['"״”]+|.['"״”]+)[^()]+\d+{NOISE}$"#
        )),
    }
}

// ---------------------------------------------------------------------------
// Punctuation
// ---------------------------------------------------------------------------

fn is_hebrew_letter(ch: char) -> bool {
    ('א'..='ת').contains(&ch)
}

/// Characters that belong to the canonical alphabet.
fn is_core_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || is_hebrew_letter(ch)
}

/// Marks deleted outright so `תשל"ג` stays one token.
fn is_dropped_mark(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '`' | '״' | '׳' | '“' | '”' | '‘' | '’')
        // niqqud and cantillation, except maqaf which separates words
        || (('\u{0591}'..='\u{05C7}').contains(&ch) && ch != '\u{05BE}')
}

fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}')
}

fn collapse_punctuation(text: &str, keep_brackets: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut space_pending = false;

    for ch in text.chars() {
        if is_dropped_mark(ch) {
            continue;
        }
        if is_core_char(ch) || (keep_brackets && is_bracket(ch)) {
            if space_pending && !out.is_empty() {
                out.push(' ');
            }
            space_pending = false;
            out.push(ch);
        } else {
            space_pending = true;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// A compiled rule set.
#[derive(Debug)]
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    pub fn new(rule_set: &RuleSet) -> Result<Self, ReconError> {
        rule_set.validate()?;

        let mut rules = Vec::new();
        if !rule_set.version_markers.is_empty() {
            rules.push(Rule::strip(
                RuleName::VersionAnnotation,
                &annotation_pattern(&rule_set.version_markers),
            )?);
        }
        if let Some(pattern) = citation_pattern(rule_set.citation) {
            rules.push(Rule::strip(RuleName::CitationSuffix, &pattern)?);
        }
        if rule_set.comma_year {
            rules.push(Rule::strip(RuleName::CommaYear, r",\s*\d{4}$")?);
        }
        rules.push(Rule {
            name: RuleName::Punctuation,
            kind: RuleKind::Punctuation {
                keep_brackets: rule_set.keep_brackets,
            },
        });
        rules.push(Rule {
            name: RuleName::TrimCase,
            kind: RuleKind::TrimCase {
                lowercase: rule_set.lowercase,
            },
        });

        Ok(Self { rules })
    }

    pub fn rule_names(&self) -> Vec<RuleName> {
        self.rules.iter().map(Rule::name).collect()
    }

    fn pass(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            let next = rule.apply(&current);
            if next != current {
                log::trace!("{}: {current:?} -> {next:?}", rule.name);
            }
            current = next;
        }
        current
    }

    /// Canonical comparison form of `text`.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    pub fn canonical_key(&self, title: &AnnotatedTitle, source: TitleRef) -> CanonicalKey {
        CanonicalKey::new(self.normalize(title.display()), source)
    }
}

/// One-shot helper: compile `rule_set` and normalize `text`.
pub fn normalize(text: &str, rule_set: &RuleSet) -> Result<String, ReconError> {
    Ok(Normalizer::new(rule_set)?.normalize(text))
}

// ---------------------------------------------------------------------------
// Side-by-side variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditedKey {
    pub primary: String,
    pub variant: Option<String>,
}

impl AuditedKey {
    pub fn diverges(&self) -> bool {
        matches!(&self.variant, Some(v) if *v != self.primary)
    }
}

/// Primary rule set plus an optional variant run on every input for cross-checking.
#[derive(Debug)]
pub struct AuditedNormalizer {
    primary: Normalizer,
    variant: Option<Normalizer>,
}

impl AuditedNormalizer {
    pub fn new(config: &NormalizeConfig) -> Result<Self, ReconError> {
        let variant = if config.audit {
            Some(Normalizer::new(&config.variant)?)
        } else {
            None
        };
        Ok(Self {
            primary: Normalizer::new(&config.primary)?,
            variant,
        })
    }

    pub fn normalize(&self, text: &str) -> AuditedKey {
        AuditedKey {
            primary: self.primary.normalize(text),
            variant: self.variant.as_ref().map(|v| v.normalize(text)),
        }
    }
}
