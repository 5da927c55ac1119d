use crate::config::MatchMode;
use crate::model::{CanonicalKey, Equivalence, MatchVerdict, TitleRef};

/// Keys whose stripped form is this short or shorter never match by edit distance.
pub const SHORT_KEY_LEN: usize = 5;
/// Minimum shorter-key length for overlap mode.
pub const OVERLAP_MIN_LEN: usize = 5;

/// Strip everything outside `[a-zA-Zא-ת0-9]`.
pub fn alnum_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || ('א'..='ת').contains(c))
        .collect()
}

/// A canonical key with its stripped form computed once per run.
#[derive(Debug, Clone)]
pub struct PreparedKey {
    pub key: CanonicalKey,
    stripped: Vec<char>,
}

impl PreparedKey {
    pub fn new(key: CanonicalKey) -> Self {
        let stripped = alnum_key(key.as_str()).chars().collect();
        Self { key, stripped }
    }

    pub fn source(&self) -> TitleRef {
        self.key.source()
    }

    pub fn is_matchable(&self) -> bool {
        self.key.is_matchable() && !self.stripped.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    mode: MatchMode,
}

impl Matcher {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Pairwise decision. Symmetric in `a` and `b` for every mode.
    pub fn compare(&self, a: &PreparedKey, b: &PreparedKey) -> MatchVerdict {
        let (shorter, longer) = if a.stripped.len() <= b.stripped.len() {
            (&a.stripped, &b.stripped)
        } else {
            (&b.stripped, &a.stripped)
        };

        let mut verdict = MatchVerdict {
            equivalence: Equivalence::Distinct,
            distance: None,
            overlap: None,
            longer_len: longer.len(),
            shorter_len: shorter.len(),
        };

        if !a.is_matchable() || !b.is_matchable() {
            return verdict;
        }

        let equivalent = match self.mode {
            MatchMode::EditDistance => {
                if shorter.len() <= SHORT_KEY_LEN {
                    false
                } else {
                    let d = char_levenshtein(shorter, longer);
                    verdict.distance = Some(d);
                    within_edit_threshold(d, longer.len())
                }
            }
            MatchMode::Overlap { threshold } => {
                if shorter.len() < OVERLAP_MIN_LEN {
                    false
                } else {
                    let mut ratio = ordered_overlap(shorter, longer);
                    if shorter.len() == longer.len() {
                        ratio = ratio.max(ordered_overlap(longer, shorter));
                    }
                    verdict.overlap = Some(ratio);
                    ratio >= threshold
                }
            }
            MatchMode::Exact => a.key.as_str() == b.key.as_str(),
        };

        if equivalent {
            verdict.equivalence = Equivalence::Equivalent;
        }
        verdict
    }

    /// Convenience over raw canonical strings (both sides' positions are irrelevant).
    pub fn is_equivalent(&self, a: &str, b: &str) -> MatchVerdict {
        let dummy = TitleRef {
            side: crate::model::Side::A,
            position: 0,
        };
        self.compare(
            &PreparedKey::new(CanonicalKey::new(a.to_string(), dummy)),
            &PreparedKey::new(CanonicalKey::new(b.to_string(), dummy)),
        )
    }

    /// First pool entry, in pool order, equivalent to `query`, returned as
    /// a reference to the title it was derived from.
    pub fn first_equivalent(
        &self,
        query: &PreparedKey,
        pool: &[PreparedKey],
    ) -> Option<(TitleRef, MatchVerdict)> {
        if !query.is_matchable() {
            return None;
        }
        pool.iter().find_map(|candidate| {
            let verdict = self.compare(query, candidate);
            verdict.is_equivalent().then(|| (candidate.source(), verdict))
        })
    }
}

/// Strict bounds: distance < 3 for long keys, < 2 otherwise.
fn within_edit_threshold(distance: usize, longer_len: usize) -> bool {
    (distance < 3 && longer_len > 20) || (distance < 2 && longer_len > SHORT_KEY_LEN)
}

fn char_levenshtein(a: &[char], b: &[char]) -> usize {
    let a: String = a.iter().collect();
    let b: String = b.iter().collect();
    strsim::levenshtein(&a, &b)
}

/// Greedy in-order match of `shorter`'s characters inside `longer`,
/// as a fraction of `shorter`'s length.
fn ordered_overlap(shorter: &[char], longer: &[char]) -> f64 {
    if shorter.is_empty() {
        return 0.0;
    }
    let mut matches = 0usize;
    let mut j = 0usize;
    for ch in shorter {
        while j < longer.len() && longer[j] != *ch {
            j += 1;
        }
        if j < longer.len() {
            matches += 1;
            j += 1;
        }
    }
    matches as f64 / shorter.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn edit() -> Matcher {
        Matcher::new(MatchMode::EditDistance)
    }

    #[test]
    fn alnum_key_strips_spaces_and_punctuation() {
        assert_eq!(alnum_key("חוק החוזים (תיקון) - 2"), "חוקהחוזיםתיקון2");
        assert_eq!(alnum_key("A.b c"), "Abc");
    }

    #[test]
    fn threshold_boundary_long_keys() {
        let base = "abcdefghijklmnopqrstuvwxy"; // 25
        let two = "abcdefghijklmnopqrstuvwZZ";
        let three = "abcdefghijklmnopqrstuvZZZ";
        let v = edit().is_equivalent(base, two);
        assert!(v.is_equivalent());
        assert_eq!(v.distance, Some(2));
        assert_eq!(v.longer_len, 25);

        let v = edit().is_equivalent(base, three);
        assert!(!v.is_equivalent());
        assert_eq!(v.distance, Some(3));
    }

    #[test]
    fn threshold_boundary_medium_keys() {
        // stripped length 9: distance 1 matches, 2 does not
        assert!(edit().is_equivalent("חוק החוזים", "חוק החוזיס").is_equivalent());
        assert!(!edit().is_equivalent("חוק החוזים", "חוק החוזספ").is_equivalent());
    }

    #[test]
    fn long_key_needs_more_than_twenty() {
        // exactly 20 chars: only distance < 2 applies
        let a = "abcdefghijklmnopqrst";
        let b = "abcdefghijklmnopqrZZ";
        assert!(!edit().is_equivalent(a, b).is_equivalent());
    }

    #[test]
    fn short_keys_never_match() {
        let v = edit().is_equivalent("abcd", "abce");
        assert!(!v.is_equivalent());
        assert_eq!(v.distance, None);
        assert!(!edit().is_equivalent("abcd", "abcd").is_equivalent());
        assert!(!edit().is_equivalent("חוק זר", "חוק זרה").is_equivalent());
    }

    #[test]
    fn spaces_do_not_count() {
        assert!(edit().is_equivalent("חוק החוזים", "חוקהחוזים").is_equivalent());
    }

    #[test]
    fn empty_keys_are_never_equivalent() {
        for mode in [
            MatchMode::EditDistance,
            MatchMode::Exact,
            MatchMode::Overlap { threshold: 0.1 },
        ] {
            assert!(!Matcher::new(mode).is_equivalent("", "").is_equivalent());
        }
    }

    #[test]
    fn overlap_mode() {
        let m = Matcher::new(MatchMode::Overlap { threshold: 0.8 });
        let v = m.is_equivalent("חוק החוזים", "חוק החוזים האחידים");
        assert!(v.is_equivalent());
        assert_eq!(v.overlap, Some(1.0));

        assert!(!m.is_equivalent("abcd", "abcd").is_equivalent());
        assert!(!m.is_equivalent("abcde", "vwxyz").is_equivalent());
        assert!(m.is_equivalent("abcde", "abcde").is_equivalent());
    }

    #[test]
    fn ordered_overlap_is_greedy_and_ordered() {
        let s: Vec<char> = "abc".chars().collect();
        let l: Vec<char> = "cba".chars().collect();
        // 'a' found at 2, then nothing left for 'b' or 'c'
        assert!((ordered_overlap(&s, &l) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn exact_mode_compares_canonical_keys() {
        let m = Matcher::new(MatchMode::Exact);
        assert!(m.is_equivalent("חוק א", "חוק א").is_equivalent());
        assert!(!m.is_equivalent("חוק א", "חוק ב").is_equivalent());
    }

    #[test]
    fn first_match_wins() {
        let r = |p| TitleRef { side: crate::model::Side::B, position: p };
        let pool: Vec<PreparedKey> = ["חוק אחר לגמרי", "חוק החוזימ", "חוק החוזים"]
            .iter()
            .enumerate()
            .map(|(i, s)| PreparedKey::new(CanonicalKey::new(s.to_string(), r(i))))
            .collect();
        let query = PreparedKey::new(CanonicalKey::new(
            "חוק החוזים".into(),
            TitleRef { side: crate::model::Side::A, position: 0 },
        ));
        let (found, verdict) = edit().first_equivalent(&query, &pool).unwrap();
        assert_eq!(found, TitleRef { side: crate::model::Side::B, position: 1 });
        assert_eq!(verdict.distance, Some(1));
    }

    proptest! {
        #[test]
        fn edit_distance_is_symmetric(a in "[א-ת a-z0-9]{0,30}", b in "[א-ת a-z0-9]{0,30}") {
            let m = edit();
            prop_assert_eq!(m.is_equivalent(&a, &b), m.is_equivalent(&b, &a));
        }

        #[test]
        fn overlap_is_symmetric(a in "[a-e]{0,12}", b in "[a-e]{0,12}") {
            let m = Matcher::new(MatchMode::Overlap { threshold: 0.8 });
            prop_assert_eq!(
                m.is_equivalent(&a, &b).is_equivalent(),
                m.is_equivalent(&b, &a).is_equivalent()
            );
        }
    }
}
