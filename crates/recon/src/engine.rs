use crate::config::{Direction, ReconConfig};
use crate::error::ReconError;
use crate::matcher::{Matcher, PreparedKey};
use crate::model::{
    AnnotatedTitle, AuditEntry, CanonicalKey, MatchVerdict, MatchedPair, ReconInput, ReconMeta,
    ReconReport, ReconciliationResult, Side, SideIssue, TitleRef,
};
use crate::normalize::AuditedNormalizer;
use crate::summary::compute_summary;

// ---------------------------------------------------------------------------
// Result builder
// ---------------------------------------------------------------------------

/// Accumulates one run's classification. Owned by the caller and threaded
/// through `Reconciler::reconcile_into`.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    result: ReconciliationResult,
    empty_keys_a: usize,
    empty_keys_b: usize,
}

impl ResultBuilder {
    pub fn matched(&mut self, a: &AnnotatedTitle, b: &AnnotatedTitle, verdict: MatchVerdict) {
        self.result.matched.push(MatchedPair {
            a: a.clone(),
            b: b.clone(),
            verdict,
        });
    }

    /// `title` from `side` has no equivalent on the other side.
    pub fn missing(&mut self, side: Side, title: &AnnotatedTitle) {
        match side {
            Side::A => self.result.missing_from_a.push(title.clone()),
            Side::B => self.result.missing_from_b.push(title.clone()),
        }
    }

    pub fn audit(&mut self, entry: AuditEntry) {
        self.result.audit.push(entry);
    }

    pub fn empty_key(&mut self, side: Side) {
        match side {
            Side::A => self.empty_keys_a += 1,
            Side::B => self.empty_keys_b += 1,
        }
    }

    pub fn empty_keys(&self, side: Side) -> usize {
        match side {
            Side::A => self.empty_keys_a,
            Side::B => self.empty_keys_b,
        }
    }

    pub fn build(self) -> ReconciliationResult {
        self.result
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct Reconciler {
    normalizer: AuditedNormalizer,
    matcher: Matcher,
}

impl Reconciler {
    pub fn new(config: &ReconConfig) -> Result<Self, ReconError> {
        Ok(Self {
            normalizer: AuditedNormalizer::new(&config.normalize)?,
            matcher: Matcher::new(config.matcher),
        })
    }

    /// Canonical keys for one side, computed once per title. Empty keys
    /// and primary/variant disagreements are recorded on `builder`.
    fn prepare(
        &self,
        side: Side,
        titles: &[AnnotatedTitle],
        builder: &mut ResultBuilder,
    ) -> Vec<PreparedKey> {
        titles
            .iter()
            .enumerate()
            .map(|(position, title)| {
                let keys = self.normalizer.normalize(title.display());

                if keys.primary.is_empty() {
                    log::warn!(
                        "side {side} title {position} normalizes to an empty key: {:?}",
                        title.raw.text
                    );
                    builder.empty_key(side);
                }

                if keys.diverges() {
                    if let Some(variant) = &keys.variant {
                        builder.audit(AuditEntry {
                            side,
                            source: title.raw.source,
                            original: title.raw.text.clone(),
                            primary: keys.primary.clone(),
                            variant: variant.clone(),
                        });
                    }
                }

                PreparedKey::new(CanonicalKey::new(keys.primary, TitleRef { side, position }))
            })
            .collect()
    }

    pub fn reconcile_into(
        &self,
        a: &[AnnotatedTitle],
        b: &[AnnotatedTitle],
        direction: Direction,
        mut builder: ResultBuilder,
    ) -> ResultBuilder {
        let a_keys = self.prepare(Side::A, a, &mut builder);
        let b_keys = self.prepare(Side::B, b, &mut builder);

        if direction.searches_a() {
            for (query, title) in a_keys.iter().zip(a) {
                match self.matcher.first_equivalent(query, &b_keys) {
                    Some((found, verdict)) => builder.matched(title, &b[found.position], verdict),
                    None => builder.missing(Side::A, title),
                }
            }
        }

        if direction.searches_b() {
            for (query, title) in b_keys.iter().zip(b) {
                match self.matcher.first_equivalent(query, &a_keys) {
                    // Under `Both` the pairs already came from the A pass.
                    Some((found, verdict)) if direction == Direction::BInA => {
                        builder.matched(&a[found.position], title, verdict)
                    }
                    Some(_) => {}
                    None => builder.missing(Side::B, title),
                }
            }
        }

        builder
    }
}

/// Classify `a` against `b`. Pairs are always `(a, b)` regardless of direction.
pub fn reconcile(
    a: &[AnnotatedTitle],
    b: &[AnnotatedTitle],
    direction: Direction,
    reconciler: &Reconciler,
) -> ReconciliationResult {
    reconciler
        .reconcile_into(a, b, direction, ResultBuilder::default())
        .build()
}

/// Run reconciliation per config. Returns the classified result plus summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconReport, ReconError> {
    config.validate()?;
    let reconciler = Reconciler::new(config)?;

    log::info!(
        "reconciling '{}': {} {} titles vs {} {} titles ({}, {})",
        config.name,
        input.a.titles.len(),
        input.a.label,
        input.b.titles.len(),
        input.b.label,
        config.direction,
        config.matcher
    );

    let builder = reconciler.reconcile_into(
        &input.a.titles,
        &input.b.titles,
        config.direction,
        ResultBuilder::default(),
    );
    let empty_keys = (builder.empty_keys(Side::A), builder.empty_keys(Side::B));
    let result = builder.build();

    let summary = compute_summary(input, &result, empty_keys);

    let issues = input
        .a
        .issues
        .iter()
        .map(|i| (Side::A, i))
        .chain(input.b.issues.iter().map(|i| (Side::B, i)))
        .map(|(side, issue)| SideIssue {
            side,
            issue: issue.clone(),
        })
        .collect();

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            direction: config.direction,
            match_mode: config.matcher,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        result,
        issues,
    })
}
