use super::RenderedPaper;
use crate::error::RenderError;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_as_lib::TypstEngine;

/// In-process Typst compilation. Fonts come from the engine's embedded set,
/// so rendering needs nothing from the host filesystem.
pub struct Compiler;

impl Compiler {
    /// Compile Typst markup to PDF bytes plus the laid-out page count.
    pub fn compile(markup: &str) -> Result<RenderedPaper, RenderError> {
        let engine = TypstEngine::builder()
            .main_file(markup.to_string())
            .search_fonts_with(TypstKitFontOptions::default())
            .build();

        let compiled = engine.compile();
        for warning in &compiled.warnings {
            tracing::debug!(?warning, "typst warning");
        }

        let document: typst::layout::PagedDocument = compiled
            .output
            .map_err(|e| RenderError::Compile(format!("{e:?}")))?;

        let pages = document.pages.len();

        let options = typst_pdf::PdfOptions::default();
        let bytes = typst_pdf::pdf(&document, &options)
            .map_err(|e| RenderError::Export(format!("{e:?}")))?;

        Ok(RenderedPaper {
            bytes: bytes.into(),
            pages,
        })
    }
}
