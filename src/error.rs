use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `paperbot`.
///
/// Each subsystem defines its own error enum. The orchestrator matches on
/// these to decide what the user sees; internal glue continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum BotError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── User input ──────────────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── LLM provider ────────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Paper generation ────────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── PDF rendering ───────────────────────────────────────────────────
    #[error("render: {0}")]
    Render(#[from] RenderError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── User-input validation errors ───────────────────────────────────────────
//
// Display strings double as the re-prompt text sent back to the chat, so
// they are written for end users, not for logs.

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please send a paper title.")]
    EmptyTitle,

    #[error("That title seems too short. Please enter a more descriptive paper title (at least {min} characters).")]
    TitleTooShort { min: usize },

    #[error("Please send your author details, one author per line.")]
    EmptyAuthors,

    #[error("Author line {line} is missing the {field} field. Use: name; department; institution; city; email")]
    MissingAuthorField { line: usize, field: &'static str },

    #[error("Author line {line} has too many fields. Use exactly: name; department; institution; city; email")]
    TooManyAuthorFields { line: usize },

    #[error("Author line {line}: \"{value}\" does not look like an email address.")]
    InvalidAuthorEmail { line: usize, value: String },

    #[error("Please enter a valid number (e.g., 6, 8, 10).")]
    NotANumber { input: String },

    #[error("Please enter a number between {min} and {max} pages.")]
    OutOfRange { value: i64, min: u8, max: u8 },

    #[error("Free papers are limited to {cap} pages. Redeem an access key with /redeem to unlock up to {max} pages.")]
    PageCapExceeded { value: i64, cap: u8, max: u8 },

    #[error("All details are already collected. Send /cancel to start over.")]
    AlreadyCollected,
}

// ─── LLM provider errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("provider {provider} returned an empty completion")]
    EmptyResponse { provider: String },
}

// ─── Paper generation errors ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network / HTTP / empty-payload failure at the provider.
    #[error("upstream: {0}")]
    Upstream(#[from] LlmError),

    /// The completion arrived but a required section header was absent.
    #[error("response is missing the {header} section")]
    MissingSection { header: &'static str },

    /// The completion contained the same section header twice.
    #[error("response contains a duplicated {header} section")]
    DuplicateSection { header: String },
}

// ─── PDF render errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF export failed: {0}")]
    Export(String),
}
