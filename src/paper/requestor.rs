//! Content generation: one prompt, one provider call, one strict parse.
//!
//! The model is instructed to emit every section under an exact `## HEADER`
//! line. The parser accepts only those markers; a missing or duplicated
//! header is a deterministic parse failure, never a degraded paper.

use super::{PaperContent, PaperRequest, PaperTable, Section};
use crate::error::GenerationError;
use crate::providers::Provider;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

const KEYWORDS_HEADER: &str = "KEYWORDS";
const TABLE_HEADER: &str = "TABLE";
const REFERENCES_HEADER: &str = "REFERENCES";

pub struct Requestor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Marker {
    Outline(Section),
    Keywords,
    Table,
    References,
}

impl Requestor {
    pub fn new(provider: Arc<dyn Provider>, model: String, temperature: f64) -> Self {
        Self {
            provider,
            model,
            temperature,
        }
    }

    /// Generate the full paper body. Exactly one provider call; upstream
    /// failures surface as `GenerationError::Upstream`, structural failures
    /// as `MissingSection`/`DuplicateSection`.
    pub async fn generate(&self, request: &PaperRequest) -> Result<PaperContent, GenerationError> {
        let prompt = build_prompt(request);

        tracing::info!(
            title = %request.title,
            pages = request.pages,
            model = %self.model,
            "generating paper content"
        );

        let raw = self
            .provider
            .complete(Some(SYSTEM_PROMPT), &prompt, &self.model, self.temperature)
            .await?;

        parse_response(&raw)
    }
}

const SYSTEM_PROMPT: &str = "You are an expert IEEE research paper writer producing \
publication-ready content. You MUST write VERBOSE, DETAILED academic text that reaches \
the word count specified for each section. Do not cut corners or summarize. \
Start every section with its exact '## HEADER' marker line and use no other markup. \
Do NOT use LaTeX notation; write math as plain text. Cite sources inline as [1], [2] \
and list them in the references section.";

/// One structured prompt embedding title, authors, outline markers, and
/// per-section word budgets.
pub fn build_prompt(request: &PaperRequest) -> String {
    let budgets = request.budgets();
    let author_list = request
        .authors
        .iter()
        .map(|a| format!("{} ({})", a.name, a.institution))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Write a {pages}-page IEEE conference paper.\n\n\
         Title: \"{title}\"\n\
         Authors: {author_list}\n\n\
         Output the paper as plain text sections. Each section MUST start with its \
         marker line, exactly as shown, and appear exactly once:\n\n",
        pages = request.pages,
        title = request.title,
    );

    for section in Section::OUTLINE {
        let _ = writeln!(
            prompt,
            "## {header}\n<~{words} words, {paragraphs} substantial paragraphs>",
            header = section.header(),
            words = budgets.words_for(section),
            paragraphs = budgets.paragraphs_for(section),
        );
    }

    let _ = writeln!(
        prompt,
        "## {KEYWORDS_HEADER}\n<exactly 5 comma-separated index terms>"
    );
    let _ = writeln!(
        prompt,
        "## {TABLE_HEADER}\n<first line: TABLE I: <short caption>; then a header row and \
         3-4 data rows comparing baselines against the proposed method, cells separated \
         by \" | \">"
    );
    let _ = writeln!(
        prompt,
        "## {REFERENCES_HEADER}\n<exactly {n} references, one per line, formatted as \
         [1] Author(s), \"Title,\" Journal/Conference, Year.>",
        n = request.reference_count(),
    );

    prompt.push_str(
        "\nRequirements:\n\
         - Reach each section's word count; expand every point with detail and analysis.\n\
         - Include one equation in the methodology section on its own line, written as \
         EQUATION: <plain-text formula> (1)\n\
         - Present the quantitative comparison in the table section and discuss it in \
         the results as Table I.\n\
         - Do not reference figures; there are none.\n\
         - No markdown besides the '## HEADER' marker lines.",
    );

    prompt
}

/// Split the completion on exact `## HEADER` lines. Unknown `##` headers are
/// kept as body text of the current section; text before the first known
/// marker is discarded.
pub fn parse_response(raw: &str) -> Result<PaperContent, GenerationError> {
    let mut bodies: HashMap<Marker, String> = HashMap::new();
    let mut current: Option<Marker> = None;

    for line in raw.lines() {
        // Models occasionally wrap output in fences despite instructions.
        let trimmed = line.trim();
        if trimmed == "```" || trimmed.strip_prefix("```").is_some_and(|rest| !rest.contains(' ')) {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix("## ") {
            let normalized = header.trim().trim_end_matches(':').to_uppercase();
            if let Some(marker) = marker_for(&normalized) {
                if bodies.contains_key(&marker) {
                    return Err(GenerationError::DuplicateSection { header: normalized });
                }
                bodies.insert(marker, String::new());
                current = Some(marker);
                continue;
            }
        }

        if let Some(marker) = current {
            let body = bodies.entry(marker).or_default();
            body.push_str(line);
            body.push('\n');
        }
    }

    let mut content = PaperContent::default();

    for section in Section::OUTLINE {
        let body = bodies
            .get(&Marker::Outline(section))
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .ok_or(GenerationError::MissingSection {
                header: section.header(),
            })?;
        content.sections.insert(section, body);
    }

    // Keywords, table and references are supplements; tolerate their absence.
    if let Some(raw_keywords) = bodies.get(&Marker::Keywords) {
        content.keywords = parse_keywords(raw_keywords);
    }
    if let Some(raw_table) = bodies.get(&Marker::Table) {
        content.table = parse_table(raw_table);
    }
    if let Some(raw_references) = bodies.get(&Marker::References) {
        content.references = parse_references(raw_references);
    }

    Ok(content)
}

fn marker_for(normalized: &str) -> Option<Marker> {
    if normalized == KEYWORDS_HEADER {
        return Some(Marker::Keywords);
    }
    if normalized == TABLE_HEADER {
        return Some(Marker::Table);
    }
    if normalized == REFERENCES_HEADER {
        return Some(Marker::References);
    }
    Section::OUTLINE
        .into_iter()
        .find(|s| s.header() == normalized)
        .map(Marker::Outline)
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|kw| kw.trim().trim_matches('.').to_string())
        .filter(|kw| !kw.is_empty())
        .collect()
}

/// First non-empty line is the caption; every following line is a row of
/// `|`-separated cells, the first of which is the header. A table without at
/// least a header and one data row is dropped rather than typeset broken.
fn parse_table(raw: &str) -> Option<PaperTable> {
    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());

    let caption = lines.next()?.to_string();
    let mut rows: Vec<Vec<String>> = lines
        .filter(|l| l.contains('|'))
        .map(|l| {
            l.split('|')
                .map(|cell| cell.trim().to_string())
                .filter(|cell| !cell.is_empty())
                .collect()
        })
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect();

    if rows.len() < 2 {
        return None;
    }
    let header = rows.remove(0);

    Some(PaperTable {
        caption,
        header,
        rows,
    })
}

/// Entries start with `[n]`; bare lines are continuations of the previous
/// entry.
fn parse_references(raw: &str) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let is_new_entry = line.starts_with('[')
            && line[1..]
                .split_once(']')
                .is_some_and(|(num, _)| num.chars().all(|c| c.is_ascii_digit()) && !num.is_empty());

        if is_new_entry {
            references.push(line.to_string());
        } else if let Some(last) = references.last_mut() {
            last.push(' ');
            last.push_str(line);
        }
    }

    references
}
