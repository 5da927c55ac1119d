use serde::{Deserialize, Serialize};

use crate::catalogue::RecordSchema;
use crate::error::ReconError;
use crate::extract::FilterMode;
use crate::normalize::RuleSet;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_side_a")]
    pub a: SideConfig,
    #[serde(default = "default_side_b")]
    pub b: SideConfig,
    #[serde(default)]
    pub matcher: MatchMode,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which side's titles are searched for in the other side's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Every A title is looked up in B.
    #[serde(rename = "a_in_b")]
    AInB,
    /// Every B title is looked up in A.
    #[serde(rename = "b_in_a")]
    BInA,
    /// Both lookups, independently.
    #[default]
    #[serde(rename = "both")]
    Both,
}

impl Direction {
    pub fn searches_a(&self) -> bool {
        matches!(self, Self::AInB | Self::Both)
    }

    pub fn searches_b(&self) -> bool {
        matches!(self, Self::BInA | Self::Both)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AInB => write!(f, "a_in_b"),
            Self::BInA => write!(f, "b_in_a"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a_in_b" | "a-in-b" => Ok(Self::AInB),
            "b_in_a" | "b-in-a" => Ok(Self::BInA),
            "both" => Ok(Self::Both),
            other => Err(ReconError::ConfigValidation(format!(
                "unknown direction \"{other}\" (expected a_in_b, b_in_a or both)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SideConfig {
    pub label: String,
    #[serde(default)]
    pub schema: RecordSchema,
}

fn default_side_a() -> SideConfig {
    SideConfig {
        label: "wiki".into(),
        schema: RecordSchema::Plain,
    }
}

fn default_side_b() -> SideConfig {
    SideConfig {
        label: "catalogue".into(),
        schema: RecordSchema::Indexed,
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchMode {
    /// Length-aware Levenshtein threshold over alphanumeric keys.
    #[default]
    EditDistance,
    /// Ordered character-overlap ratio of the shorter key inside the longer.
    Overlap {
        #[serde(default = "default_overlap_threshold")]
        threshold: f64,
    },
    /// Identical non-empty canonical keys.
    Exact,
}

fn default_overlap_threshold() -> f64 {
    DEFAULT_OVERLAP_THRESHOLD
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditDistance => write!(f, "edit_distance"),
            Self::Overlap { threshold } => write!(f, "overlap({threshold})"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalize + Extract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default = "RuleSet::year_mark")]
    pub primary: RuleSet,
    #[serde(default = "RuleSet::generic")]
    pub variant: RuleSet,
    /// Run the variant alongside the primary and record disagreements.
    #[serde(default = "default_true")]
    pub audit: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            primary: RuleSet::year_mark(),
            variant: RuleSet::generic(),
            audit: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub filter: FilterMode,
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

impl ReconConfig {
    /// Statute names: which wiki titles and catalogue names have a
    /// counterpart on the other side, keeping the catalogue index.
    pub fn names_preset() -> Self {
        Self {
            name: "statute names".into(),
            direction: Direction::Both,
            a: default_side_a(),
            b: default_side_b(),
            matcher: MatchMode::EditDistance,
            normalize: NormalizeConfig::default(),
            extract: ExtractConfig::default(),
        }
    }

    /// Regulations: wiki titles missing from the categorized catalogue.
    pub fn rules_preset() -> Self {
        Self {
            name: "regulations".into(),
            direction: Direction::AInB,
            a: default_side_a(),
            b: SideConfig {
                label: "catalogue".into(),
                schema: RecordSchema::Categorized,
            },
            matcher: MatchMode::EditDistance,
            normalize: NormalizeConfig::default(),
            extract: ExtractConfig::default(),
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self::names_preset()
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        for (side, cfg) in [("a", &self.a), ("b", &self.b)] {
            if cfg.label.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "side '{side}': label must not be empty"
                )));
            }
        }

        if self.a.schema != RecordSchema::Plain {
            return Err(ReconError::ConfigValidation(format!(
                "side 'a' is the wiki page and takes no record schema, got '{}'",
                self.a.schema
            )));
        }

        if self.a.label == self.b.label {
            return Err(ReconError::ConfigValidation(format!(
                "sides must have distinct labels, both are '{}'",
                self.a.label
            )));
        }

        if let MatchMode::Overlap { threshold } = self.matcher {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(ReconError::ConfigValidation(format!(
                    "overlap threshold must be in (0, 1], got {threshold}"
                )));
            }
        }

        self.normalize.primary.validate()?;
        if self.normalize.audit {
            self.normalize.variant.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::CitationPattern;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ReconConfig::from_toml(r#"name = "minimal""#).unwrap();
        assert_eq!(config.direction, Direction::Both);
        assert_eq!(config.a.label, "wiki");
        assert_eq!(config.b.schema, RecordSchema::Indexed);
        assert_eq!(config.matcher, MatchMode::EditDistance);
        assert_eq!(config.normalize.primary.citation, CitationPattern::YearMark);
        assert!(config.normalize.audit);
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
name = "rules"
direction = "a_in_b"

[a]
label = "wiki"

[b]
label = "catalogue"
schema = "categorized"

[matcher]
mode = "overlap"
threshold = 0.9

[normalize]
audit = false

[normalize.primary]
citation = "generic"
comma_year = false

[extract]
filter = "all"
"#;
        let config = ReconConfig::from_toml(toml).unwrap();
        assert_eq!(config.direction, Direction::AInB);
        assert_eq!(config.b.schema, RecordSchema::Categorized);
        assert_eq!(config.matcher, MatchMode::Overlap { threshold: 0.9 });
        assert_eq!(config.normalize.primary.citation, CitationPattern::Generic);
        assert!(!config.normalize.primary.comma_year);
        assert!(!config.normalize.audit);
        assert_eq!(config.extract.filter, FilterMode::All);
    }

    #[test]
    fn overlap_threshold_defaults() {
        let toml = "name = \"x\"\n[matcher]\nmode = \"overlap\"\n";
        let config = ReconConfig::from_toml(toml).unwrap();
        assert_eq!(
            config.matcher,
            MatchMode::Overlap { threshold: DEFAULT_OVERLAP_THRESHOLD }
        );
    }

    #[test]
    fn rejects_bad_threshold() {
        let toml = "name = \"x\"\n[matcher]\nmode = \"overlap\"\nthreshold = 1.5\n";
        let err = ReconConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)), "{err}");
    }

    #[test]
    fn rejects_same_side_labels() {
        let toml = "name = \"x\"\n[a]\nlabel = \"src\"\n[b]\nlabel = \"src\"\n";
        let err = ReconConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("distinct labels"));
    }

    #[test]
    fn rejects_record_schema_on_wiki_side() {
        let toml = "name = \"x\"\n[a]\nlabel = \"wiki\"\nschema = \"indexed\"\n";
        let err = ReconConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)), "{err}");
        assert!(err.to_string().contains("side 'a'"), "{err}");

        let plain = "name = \"x\"\n[a]\nlabel = \"wiki\"\nschema = \"plain\"\n";
        ReconConfig::from_toml(plain).unwrap();
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = ReconConfig::from_toml("name = \"x\"\ndirection = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn direction_from_str() {
        assert_eq!("a_in_b".parse::<Direction>().unwrap(), Direction::AInB);
        assert_eq!("b-in-a".parse::<Direction>().unwrap(), Direction::BInA);
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn presets_validate() {
        ReconConfig::names_preset().validate().unwrap();
        ReconConfig::rules_preset().validate().unwrap();
        assert_eq!(ReconConfig::rules_preset().b.schema, RecordSchema::Categorized);
    }
}
