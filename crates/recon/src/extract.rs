//! Anchor-text extraction from the wiki's statute index page.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::error::ReconError;
use crate::model::{ParseIssue, RawTitle, Source};

/// Words naming a kind of legal instrument.
pub const LAW_KEYWORDS: &[&str] = &[
    "חוק", "תקנות", "פקודה", "צו", "הוראה", "חוקה", "תחיקה", "משפט", "פקודת", "חוקי", "תקנת",
    "הלכה", "דין",
];

/// Site chrome: skip links, menus, edit/history/talk links.
pub const NAVIGATION_KEYWORDS: &[&str] = &[
    "לדלג",
    "עמוד ראשי",
    "ברוכים הבאים",
    "שינויים אחרונים",
    "דף אקראי",
    "שער הקהילה",
    "עזרה",
    "מזנון",
    "ארגז חול",
    "בקשות מבעלי הרשאות",
    "צור קשר",
    "יציאה",
    "שפה",
    "דפדוף",
    "הדפסה",
    "מידע",
    "תרומה",
    "קישור",
    "עריכה",
    "היסטוריה",
    "דיון",
    "קטגוריה",
    "תבנית",
    "נושא",
    "נושאים",
    "רשימה",
];

static YEAR_CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"התש[נסעפצקרש]"[א-ת]-\d{4}"#).expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Every non-empty anchor text.
    All,
    #[default]
    LawLike,
}

/// Keyword match without navigation noise, or an enactment-year citation.
pub fn is_law_like(text: &str) -> bool {
    let has_law_keyword = LAW_KEYWORDS.iter().any(|k| text.contains(k));
    let is_navigation = NAVIGATION_KEYWORDS.iter().any(|k| text.contains(k));
    (has_law_keyword && !is_navigation) || YEAR_CITATION.is_match(text)
}

/// Visible text of an element: trimmed text nodes joined without separator.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub titles: Vec<RawTitle>,
    pub anchors_seen: usize,
    pub issues: Vec<ParseIssue>,
}

impl Extraction {
    /// Nothing extractable in the markup at all.
    pub fn is_degraded(&self) -> bool {
        self.anchors_seen == 0
    }
}

pub struct TitleExtractor {
    anchors: Selector,
    filter: FilterMode,
}

impl TitleExtractor {
    pub fn new(filter: FilterMode) -> Result<Self, ReconError> {
        let anchors = Selector::parse("a").map_err(|e| ReconError::Markup(format!("{e:?}")))?;
        Ok(Self { anchors, filter })
    }

    fn keep(&self, text: &str) -> bool {
        !text.is_empty() && (self.filter == FilterMode::All || is_law_like(text))
    }

    /// Lazily yield retained titles in document order. `index` is the
    /// anchor's position among all anchors in the document.
    pub fn titles<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = RawTitle> + 'a {
        document
            .select(&self.anchors)
            .enumerate()
            .filter_map(move |(index, anchor)| {
                let text = visible_text(anchor);
                self.keep(&text)
                    .then(|| RawTitle::new(text, Source::Wiki, index))
            })
    }

    pub fn extract(&self, markup: &str) -> Extraction {
        let document = Html::parse_document(markup);
        let anchors_seen = document.select(&self.anchors).count();
        let titles: Vec<RawTitle> = self.titles(&document).collect();

        let mut issues = Vec::new();
        if anchors_seen == 0 {
            log::warn!("markup contains no anchor elements");
            issues.push(ParseIssue {
                position: None,
                raw: String::new(),
                message: "no extractable anchors in markup".into(),
            });
        }

        log::info!(
            "extracted {} of {anchors_seen} anchors ({:?} filter)",
            titles.len(),
            self.filter
        );
        Extraction {
            titles,
            anchors_seen,
            issues,
        }
    }
}

/// Extract with the given filter.
pub fn extract(markup: &str, filter: FilterMode) -> Result<Extraction, ReconError> {
    Ok(TitleExtractor::new(filter)?.extract(markup))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><body>
        <a href="#content">לדלג לתוכן</a>
        <a href="/wiki/Main">עמוד ראשי</a>
        <a href="/a">חוק החוזים (חלק כללי), התשל"ג-1973</a>
        <a href="/b"><b>תקנות</b> התעבורה</a>
        <a href="/c">   </a>
        <a href="/d">היסטוריה של חוק</a>
        <a href="/e">מבוא, התשנ"ב-1992</a>
        <a href="/f">English page</a>
    </body></html>"##;

    #[test]
    fn law_like_filter() {
        let out = extract(PAGE, FilterMode::LawLike).unwrap();
        let texts: Vec<&str> = out.titles.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "חוק החוזים (חלק כללי), התשל\"ג-1973",
                "תקנותהתעבורה",
                "מבוא, התשנ\"ב-1992",
            ]
        );
        assert_eq!(out.anchors_seen, 8);
        assert!(!out.is_degraded());
    }

    #[test]
    fn all_filter_keeps_every_non_empty_anchor() {
        let out = extract(PAGE, FilterMode::All).unwrap();
        assert_eq!(out.titles.len(), 7);
        assert_eq!(out.titles[0].source, Source::Wiki);
        // the blank anchor at position 4 is skipped but positions are preserved
        assert_eq!(out.titles[4].index, 5);
    }

    #[test]
    fn navigation_keyword_excludes_law_keyword() {
        assert!(!is_law_like("עריכה: חוק"));
        assert!(!is_law_like("דיון על חוק"));
        assert!(is_law_like("פקודת הראיות"));
        assert!(!is_law_like("Main Page"));
    }

    #[test]
    fn year_citation_bypasses_navigation() {
        assert!(is_law_like("רשימה התשע\"ה-2015"));
    }

    #[test]
    fn malformed_markup_is_best_effort() {
        let out = extract("<div><a>חוק א<a>צו ב</div", FilterMode::LawLike).unwrap();
        assert_eq!(out.titles.len(), 2);
    }

    #[test]
    fn no_anchors_is_degraded() {
        let out = extract("<p>nothing here</p>", FilterMode::All).unwrap();
        assert!(out.is_degraded());
        assert_eq!(out.issues.len(), 1);
        assert!(out.titles.is_empty());
    }

    #[test]
    fn lazy_iterator_can_stop_early() {
        let extractor = TitleExtractor::new(FilterMode::All).unwrap();
        let doc = Html::parse_document(PAGE);
        let first: Vec<RawTitle> = extractor.titles(&doc).take(2).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].text, "עמוד ראשי");
    }
}
