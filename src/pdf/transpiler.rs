//! Paper content to Typst markup.
//!
//! Geometry follows IEEE conference formatting: A4, 0.625in side margins,
//! two body columns, a full-width title/author header on the first page,
//! centered Roman-numeral section headings, and 8pt hanging-indent
//! references. No page numbers — IEEE adds them during publication.

use crate::paper::{PaperContent, PaperRequest, PaperTable, Section};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

static FIGURE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(as shown in |see |refer to |illustrated in |depicted in )?(Fig\.|Figure)\s*\d+[a-z]?(\s*\([^)]*\))?[,.]?",
    )
    .expect("valid regex")
});
static PERCENT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpercent\b").expect("valid regex"));
static PERCENT_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*%").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));
static EQUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EQUATION:\s*(.+?)\s*\((\d+)\)").expect("valid regex"));

pub struct Transpiler;

impl Transpiler {
    /// Build the complete Typst source for one paper.
    pub fn transpile(request: &PaperRequest, content: &PaperContent) -> String {
        let title = title_case(&request.title);

        // Clean each outline body, then renumber citations by first
        // occurrence and reorder the reference list to match.
        let mut bodies: Vec<(Section, String)> = Section::OUTLINE
            .into_iter()
            .map(|s| (s, clean_body(content.section(s))))
            .collect();
        let references = renumber_references(&mut bodies, &content.references);

        let mut out = String::new();

        let _ = writeln!(
            out,
            "#set document(title: \"{}\", author: \"{}\")",
            escape_string(&title),
            escape_string(
                request
                    .authors
                    .first()
                    .map_or("Author", |a| a.name.as_str())
            ),
        );
        out.push_str(
            "#set page(paper: \"a4\", margin: (top: 0.75in, bottom: 1in, left: 0.625in, right: 0.625in), columns: 2)\n\
             #set columns(gutter: 0.25in)\n\
             #set text(font: \"New Computer Modern\", size: 10pt)\n\
             #set par(justify: true, leading: 0.5em, first-line-indent: 1em)\n\n",
        );

        Self::push_header(&mut out, &title, request);
        Self::push_abstract(&mut out, &bodies, &content.keywords);

        for (section, body) in &bodies {
            let Some(heading) = section.display_heading() else {
                continue; // abstract is typeset above
            };
            Self::push_heading(&mut out, heading);
            Self::push_body(&mut out, body);
            if *section == Section::Results {
                if let Some(table) = &content.table {
                    Self::push_table(&mut out, table);
                }
            }
        }

        Self::push_references(&mut out, &references);

        out
    }

    /// Full-width title/author block floated across both columns.
    fn push_header(out: &mut String, title: &str, request: &PaperRequest) {
        out.push_str("#place(top + center, float: true, scope: \"parent\", clearance: 1.5em)[\n");
        let _ = writeln!(
            out,
            "  #text(size: 24pt)[{}]\n  #v(6pt)",
            escape(title)
        );

        if request.authors.len() == 1 {
            let a = &request.authors[0];
            let _ = writeln!(
                out,
                "  #text(weight: \"bold\", size: 10pt)[{}] \\\n  \
                 #text(style: \"italic\", size: 9pt)[{}] \\\n  \
                 #text(style: \"italic\", size: 9pt)[{}] \\\n  \
                 #text(style: \"italic\", size: 9pt)[{}] \\\n  \
                 #text(style: \"italic\", size: 9pt)[{}]",
                escape(&a.name),
                escape(&a.department),
                escape(&a.institution),
                escape(&a.city),
                escape(&a.email),
            );
        } else {
            // Authors side by side, one equal-width cell each.
            let columns = vec!["1fr"; request.authors.len()].join(", ");
            let _ = writeln!(out, "  #grid(columns: ({columns}), column-gutter: 8pt,");
            for a in &request.authors {
                let _ = writeln!(
                    out,
                    "    align(center)[#text(weight: \"bold\", size: 10pt)[{}] \\ \
                     #text(style: \"italic\", size: 9pt)[{}] \\ \
                     #text(style: \"italic\", size: 9pt)[{}] \\ \
                     #text(style: \"italic\", size: 9pt)[{}] \\ \
                     #text(style: \"italic\", size: 9pt)[{}]],",
                    escape(&a.name),
                    escape(&a.department),
                    escape(&a.institution),
                    escape(&a.city),
                    escape(&a.email),
                );
            }
            out.push_str("  )\n");
        }

        out.push_str("  #v(4pt)\n  #line(length: 100%, stroke: 0.5pt)\n]\n\n");
    }

    /// Abstract and index terms open the left column in 9pt italic.
    fn push_abstract(out: &mut String, bodies: &[(Section, String)], keywords: &[String]) {
        let abstract_body = bodies
            .iter()
            .find(|(s, _)| *s == Section::Abstract)
            .map_or("", |(_, b)| b.as_str());

        let _ = writeln!(
            out,
            "#text(size: 9pt, style: \"italic\")[#text(weight: \"bold\")[Abstract]—{}]\n#v(3pt)",
            escape(abstract_body)
        );

        if !keywords.is_empty() {
            let joined = keywords
                .iter()
                .map(|k| escape(k))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "#text(size: 9pt, style: \"italic\")[#text(weight: \"bold\")[Index Terms]—{joined}]\n#v(6pt)"
            );
        }
    }

    fn push_heading(out: &mut String, heading: &str) {
        let _ = writeln!(
            out,
            "#v(8pt)\n#align(center)[#text(weight: \"bold\", size: 10pt)[{}]]\n#v(3pt)",
            escape(heading)
        );
    }

    /// Paragraphs with inline `EQUATION: expr (n)` markers lifted out into a
    /// centered row with the equation number pinned to the right margin.
    fn push_body(out: &mut String, body: &str) {
        for paragraph in body.split("\n\n").filter(|p| !p.trim().is_empty()) {
            if let Some(caps) = EQUATION_RE.captures(paragraph) {
                let m = caps.get(0).expect("whole match");
                let before = paragraph[..m.start()].trim();
                let after = paragraph[m.end()..].trim();

                if !before.is_empty() {
                    let _ = writeln!(out, "{}\n", escape(before));
                }
                let _ = writeln!(
                    out,
                    "#grid(columns: (85%, 15%), align: (center + horizon, right + horizon), \
                     [#text(style: \"italic\")[{}]], [({})])",
                    escape(caps[1].trim()),
                    &caps[2],
                );
                if !after.is_empty() {
                    let _ = writeln!(out, "{}\n", escape(after));
                }
            } else {
                let _ = writeln!(out, "{}\n", escape(paragraph.trim()));
            }
        }
    }

    /// Comparison table after the results body: two-line caption above
    /// (label, then subtitle, both caps), horizontal rules only, 8pt.
    fn push_table(out: &mut String, table: &PaperTable) {
        let columns = table.header.len();
        if columns == 0 {
            return;
        }
        let (label, subtitle) = match table.caption.split_once(':') {
            Some((l, s)) => (l.trim().to_uppercase(), s.trim().to_uppercase()),
            None => (table.caption.trim().to_uppercase(), String::new()),
        };

        out.push_str("#v(6pt)\n#align(center)[");
        let _ = write!(out, "#text(size: 8pt, weight: \"bold\")[{}]", escape(&label));
        if !subtitle.is_empty() {
            let _ = write!(out, " \\ #text(size: 8pt)[{}]", escape(&subtitle));
        }
        out.push_str("]\n#v(2pt)\n#text(size: 8pt)[#table(\n");
        let _ = writeln!(out, "  columns: {columns},");
        out.push_str("  align: center + horizon,\n  stroke: none,\n  inset: 3pt,\n");
        out.push_str("  table.hline(stroke: 1pt),\n  table.header(");
        for cell in &table.header {
            let _ = write!(out, "[#text(weight: \"bold\")[{}]], ", escape(cell));
        }
        out.push_str("),\n  table.hline(stroke: 0.5pt),\n");
        for row in &table.rows {
            out.push_str("  ");
            // Ragged model rows are padded or clipped to the header width.
            for i in 0..columns {
                let cell = row.get(i).map_or("", String::as_str);
                let _ = write!(out, "[{}], ", escape(cell));
            }
            out.push('\n');
        }
        out.push_str("  table.hline(stroke: 1pt),\n)]\n");
    }

    fn push_references(out: &mut String, references: &[String]) {
        if references.is_empty() {
            return;
        }
        out.push_str(
            "#v(8pt)\n#align(center)[#text(weight: \"bold\", size: 10pt)[REFERENCES]]\n#v(3pt)\n\
             #block[\n#set text(size: 8pt)\n",
        );
        for (i, entry) in references.iter().enumerate() {
            let _ = writeln!(
                out,
                "#par(hanging-indent: 14pt, first-line-indent: 0pt)[\\[{}\\] {}]",
                i + 1,
                escape(entry)
            );
        }
        out.push_str("]\n");
    }
}

/// Normalize generated prose: drop figure references (there are no figures),
/// fix "percent" artifacts, and collapse intra-paragraph whitespace while
/// preserving blank-line paragraph breaks.
pub fn clean_body(text: &str) -> String {
    let text = FIGURE_REF_RE.replace_all(text, "");
    let text = PERCENT_WORD_RE.replace_all(&text, "%");
    let text = PERCENT_SPACE_RE.replace_all(&text, "$1%");

    text.split("\n\n")
        .map(|para| WHITESPACE_RE.replace_all(para.trim(), " ").into_owned())
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renumber `[n]` citations sequentially in order of first occurrence across
/// the body sections (document order), and reorder the reference list to
/// match. Uncited entries keep their relative order after the cited ones;
/// citations pointing past the list are left untouched.
pub fn renumber_references(
    bodies: &mut [(Section, String)],
    references: &[String],
) -> Vec<String> {
    let n = references.len();
    if n == 0 {
        return Vec::new();
    }

    let mut first_seen: Vec<usize> = Vec::new();
    for (_, body) in bodies.iter() {
        for caps in CITATION_RE.captures_iter(body) {
            if let Ok(old) = caps[1].parse::<usize>() {
                if (1..=n).contains(&old) && !first_seen.contains(&old) {
                    first_seen.push(old);
                }
            }
        }
    }

    let mut mapping = vec![0usize; n + 1];
    for (i, &old) in first_seen.iter().enumerate() {
        mapping[old] = i + 1;
    }

    let mut ordered: Vec<String> = first_seen
        .iter()
        .map(|&old| strip_reference_label(&references[old - 1]))
        .collect();
    let mut next = first_seen.len();
    for (idx, entry) in references.iter().enumerate() {
        if mapping[idx + 1] == 0 {
            next += 1;
            mapping[idx + 1] = next;
            ordered.push(strip_reference_label(entry));
        }
    }

    for (_, body) in bodies.iter_mut() {
        *body = CITATION_RE
            .replace_all(body, |caps: &regex::Captures<'_>| {
                match caps[1].parse::<usize>() {
                    Ok(old) if (1..=n).contains(&old) => format!("[{}]", mapping[old]),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned();
    }

    ordered
}

/// Drop a leading `[k]` label; entries are re-labeled by position on output.
fn strip_reference_label(entry: &str) -> String {
    let trimmed = entry.trim();
    if trimmed.starts_with('[') {
        if let Some((num, rest)) = trimmed[1..].split_once(']') {
            if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) {
                return rest.trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// IEEE title case: capitalize each word except short connectives, always
/// capitalize the first and last word, keep all-caps acronyms intact.
pub fn title_case(s: &str) -> String {
    const LOWERCASE: [&str; 18] = [
        "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "by", "in", "of",
        "up", "as", "if", "via",
    ];

    let words: Vec<&str> = s.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if word.chars().all(|c| !c.is_lowercase()) {
                // Acronyms (and punctuation-only tokens) pass through.
                (*word).to_string()
            } else if i != 0 && i != last && LOWERCASE.contains(&word.to_lowercase().as_str()) {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Escape characters with syntactic meaning in Typst markup so model text
/// renders literally. `//` starts a comment in markup, hence the slash.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '#' | '$' | '*' | '_' | '`' | '@' | '<' | '>' | '[' | ']' | '/' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Escape for Typst string literals (inside `"..."`).
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_keeps_acronyms_and_lowers_connectives() {
        assert_eq!(
            title_case("edge computing for IoT and the cloud"),
            "Edge Computing for IoT and the Cloud"
        );
    }

    #[test]
    fn title_case_always_capitalizes_first_and_last() {
        assert_eq!(title_case("of mice and men of"), "Of Mice and Men Of");
    }

    #[test]
    fn clean_body_normalizes_percent() {
        assert_eq!(
            clean_body("accuracy improved by 95.3 percent overall"),
            "accuracy improved by 95.3% overall"
        );
        assert_eq!(clean_body("gain of 12 %"), "gain of 12%");
    }

    #[test]
    fn clean_body_strips_figure_references() {
        let cleaned = clean_body("The pipeline, as shown in Fig. 3, performs well.");
        assert!(!cleaned.contains("Fig."));
        assert!(cleaned.contains("performs well"));
    }

    #[test]
    fn clean_body_preserves_paragraph_breaks() {
        let cleaned = clean_body("First  paragraph\nwrapped.\n\nSecond paragraph.");
        assert_eq!(cleaned, "First paragraph wrapped.\n\nSecond paragraph.");
    }

    #[test]
    fn escape_neutralizes_typst_syntax() {
        assert_eq!(escape("#let x = [1]"), "\\#let x = \\[1\\]");
        assert_eq!(escape("https://a.b/c"), "https:\\/\\/a.b\\/c");
    }

    #[test]
    fn escape_string_handles_quotes() {
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn strip_reference_label_removes_bracket_number() {
        assert_eq!(
            strip_reference_label("[3] A. Author, \"Title,\" 2024."),
            "A. Author, \"Title,\" 2024."
        );
        assert_eq!(strip_reference_label("no label"), "no label");
    }
}
