//! `lawlist-recon`: Hebrew statute-title reconciliation engine.
//!
//! Pure engine crate: receives markup and catalogue payloads already
//! fetched, returns classified results. No network or file output.

pub mod catalogue;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;
pub mod summary;

pub use catalogue::{parse_catalogue, RecordSchema};
pub use config::{Direction, MatchMode, ReconConfig};
pub use engine::{reconcile, run, Reconciler, ResultBuilder};
pub use error::ReconError;
pub use extract::{FilterMode, TitleExtractor};
pub use matcher::Matcher;
pub use model::{AnnotatedTitle, RawTitle, ReconInput, ReconReport, ReconciliationResult, SideInput};
pub use normalize::{AuditedNormalizer, Normalizer, RuleSet};
pub use report::{report_tables, OutputTable};
