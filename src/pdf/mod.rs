//! IEEE-style PDF rendering via Typst.
//!
//! Two stages: the transpiler turns generated paper content into Typst
//! markup (two-column A4, full-width title header, numbered sections,
//! equation rows, renumbered references), and the compiler typesets that
//! markup in process. Deterministic — no network, no randomness.

mod compiler;
mod transpiler;

#[cfg(test)]
mod tests;

pub use compiler::Compiler;
pub use transpiler::Transpiler;

use crate::error::RenderError;
use crate::paper::{PaperContent, PaperRequest};

/// The finished artifact: PDF bytes plus the page count the document
/// actually occupies.
#[derive(Debug, Clone)]
pub struct RenderedPaper {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Render a complete paper. Must not fail for well-formed content; a
/// failure here is a defect, not a recoverable condition.
pub fn render_paper(
    request: &PaperRequest,
    content: &PaperContent,
) -> Result<RenderedPaper, RenderError> {
    let markup = Transpiler::transpile(request, content);
    Compiler::compile(&markup)
}

/// Filesystem-safe delivery name derived from the paper title.
pub fn document_filename(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed: String = safe.trim_matches('_').chars().take(50).collect();
    if trimmed.is_empty() {
        "IEEE_paper.pdf".to_string()
    } else {
        format!("IEEE_{trimmed}.pdf")
    }
}
