pub mod requestor;


pub use requestor::Requestor;

use crate::sessions::{Author, Session};
use std::collections::HashMap;

/// The fixed outline every generated paper must contain, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Section {
    Abstract,
    Introduction,
    RelatedWork,
    Methodology,
    Results,
    Conclusion,
}

impl Section {
    pub const OUTLINE: [Section; 6] = [
        Section::Abstract,
        Section::Introduction,
        Section::RelatedWork,
        Section::Methodology,
        Section::Results,
        Section::Conclusion,
    ];

    /// The exact `## <HEADER>` marker the model must emit and the parser
    /// matches on. Fuzzy matching is deliberately not done.
    pub fn header(self) -> &'static str {
        match self {
            Section::Abstract => "ABSTRACT",
            Section::Introduction => "INTRODUCTION",
            Section::RelatedWork => "RELATED WORK",
            Section::Methodology => "METHODOLOGY",
            Section::Results => "RESULTS",
            Section::Conclusion => "CONCLUSION",
        }
    }

    /// Roman-numeral heading as it appears in the rendered paper. The
    /// abstract is typeset as the italic lead paragraph, not a numbered
    /// section.
    pub fn display_heading(self) -> Option<&'static str> {
        match self {
            Section::Abstract => None,
            Section::Introduction => Some("I. INTRODUCTION"),
            Section::RelatedWork => Some("II. RELATED WORK"),
            Section::Methodology => Some("III. METHODOLOGY"),
            Section::Results => Some("IV. RESULTS AND DISCUSSION"),
            Section::Conclusion => Some("V. CONCLUSION AND FUTURE WORK"),
        }
    }
}

/// Everything the requestor needs, derived from a `Ready` session — never
/// stored, never built from partial data.
#[derive(Debug, Clone)]
pub struct PaperRequest {
    pub title: String,
    pub authors: Vec<Author>,
    pub pages: u8,
}

impl PaperRequest {
    /// `None` unless the session holds all validated fields.
    pub fn from_session(session: &Session) -> Option<Self> {
        if !session.is_ready() {
            return None;
        }
        Some(Self {
            title: session.title.clone()?,
            authors: session.authors.clone(),
            pages: session.pages?,
        })
    }

    pub fn budgets(&self) -> WordBudgets {
        WordBudgets::for_pages(self.pages)
    }

    /// References scale with paper length.
    pub fn reference_count(&self) -> usize {
        std::cmp::max(8, usize::from(self.pages) + 4)
    }
}

/// Per-section word targets. A two-column A4 page at 10pt holds roughly 900
/// words of body text; the total is capped so a single completion is never
/// truncated by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordBudgets {
    pub total: u32,
}

pub const WORDS_PER_PAGE: u32 = 900;
const TOTAL_WORDS_CAP: u32 = 12_000;
const ABSTRACT_WORDS: u32 = 130;

impl WordBudgets {
    pub fn for_pages(pages: u8) -> Self {
        Self {
            total: (u32::from(pages) * WORDS_PER_PAGE).min(TOTAL_WORDS_CAP),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn words_for(self, section: Section) -> u32 {
        let share = |fraction: f64| (f64::from(self.total) * fraction) as u32;
        match section {
            Section::Abstract => ABSTRACT_WORDS,
            Section::Introduction => share(0.20),
            Section::RelatedWork => share(0.22),
            Section::Methodology => share(0.28),
            Section::Results => share(0.18),
            Section::Conclusion => share(0.12),
        }
    }

    /// Aim for 4-5 sentence paragraphs of ~80 words.
    pub fn paragraphs_for(self, section: Section) -> u32 {
        match section {
            Section::Abstract => 1,
            Section::Conclusion => std::cmp::max(2, self.words_for(section) / 80),
            _ => std::cmp::max(3, self.words_for(section) / 80),
        }
    }
}

/// The quantitative comparison table (Table I), typeset after the results
/// section. A caption line plus a header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperTable {
    pub caption: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parsed generation result: one body per outline section, plus the index
/// terms, comparison table and reference list the prompt also asks for.
#[derive(Debug, Clone, Default)]
pub struct PaperContent {
    pub sections: HashMap<Section, String>,
    pub keywords: Vec<String>,
    pub table: Option<PaperTable>,
    pub references: Vec<String>,
}

impl PaperContent {
    /// Body text for an outline section. Parsing guarantees presence, so
    /// missing keys only occur in hand-built test fixtures.
    pub fn section(&self, section: Section) -> &str {
        self.sections.get(&section).map_or("", String::as_str)
    }
}
