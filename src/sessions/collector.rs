//! Field collection: one pure transition per inbound message.
//!
//! `submit` validates the text against the session's current state, mutates
//! the session on acceptance, and advances exactly one step. Rejections leave
//! the session untouched; the caller re-prompts with the error's Display
//! text. Resubmission after all fields are collected is rejected, never
//! double-applied.

use super::{Author, DialogState, Session};
use crate::error::ValidationError;

pub const MIN_TITLE_CHARS: usize = 5;
pub const PAGE_MIN: u8 = 4;
pub const PAGE_MAX: u8 = 20;

const AUTHOR_FIELDS: [&str; 5] = ["name", "department", "institution", "city", "email"];

/// Feed one message into the collection dialogue.
///
/// `page_cap` is the per-user page limit (free tier vs. redeemed access key);
/// it only narrows the upper bound, never the [`PAGE_MIN`], [`PAGE_MAX`]
/// range itself.
pub fn submit(
    session: &mut Session,
    raw: &str,
    page_cap: u8,
) -> Result<String, ValidationError> {
    match session.state {
        DialogState::AwaitingTitle => {
            let title = accept_title(raw)?;
            session.title = Some(title);
            session.state = DialogState::AwaitingAuthors;
            Ok(prompt_authors())
        }
        DialogState::AwaitingAuthors => {
            let authors = parse_authors(raw)?;
            let summary = authors_summary(&authors);
            session.authors = authors;
            session.state = DialogState::AwaitingPageCount;
            Ok(prompt_pages(&summary))
        }
        DialogState::AwaitingPageCount => {
            let pages = accept_pages(raw, page_cap)?;
            session.pages = Some(pages);
            session.state = DialogState::Ready;
            Ok(format!(
                "✅ All set — generating a ~{pages}-page paper now. Hang tight!"
            ))
        }
        DialogState::Ready
        | DialogState::Generating
        | DialogState::Done
        | DialogState::Aborted => Err(ValidationError::AlreadyCollected),
    }
}

fn accept_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(ValidationError::TitleTooShort {
            min: MIN_TITLE_CHARS,
        });
    }
    Ok(title.to_string())
}

/// Parse the author block: one author per non-blank line, five positional
/// fields separated by `;`. The city field may itself contain a comma
/// ("Chennai, India").
pub fn parse_authors(raw: &str) -> Result<Vec<Author>, ValidationError> {
    let mut authors = Vec::new();

    for (idx, line) in raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
    {
        authors.push(parse_author_line(idx + 1, line)?);
    }

    if authors.is_empty() {
        return Err(ValidationError::EmptyAuthors);
    }
    Ok(authors)
}

fn parse_author_line(line_no: usize, line: &str) -> Result<Author, ValidationError> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();

    if fields.len() > AUTHOR_FIELDS.len() {
        return Err(ValidationError::TooManyAuthorFields { line: line_no });
    }

    // Name the first absent or blank field.
    for (i, field_name) in AUTHOR_FIELDS.iter().enumerate() {
        if fields.get(i).is_none_or(|f| f.is_empty()) {
            return Err(ValidationError::MissingAuthorField {
                line: line_no,
                field: field_name,
            });
        }
    }

    let email = fields[4];
    if !looks_like_email(email) {
        return Err(ValidationError::InvalidAuthorEmail {
            line: line_no,
            value: email.to_string(),
        });
    }

    Ok(Author {
        name: fields[0].to_string(),
        department: fields[1].to_string(),
        institution: fields[2].to_string(),
        city: fields[3].to_string(),
        email: email.to_string(),
    })
}

/// Shape check only: local@domain.tld with no whitespace.
fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
        && !domain.contains('@')
}

fn accept_pages(raw: &str, page_cap: u8) -> Result<u8, ValidationError> {
    let input = raw.trim();
    let value: i64 = input.parse().map_err(|_| ValidationError::NotANumber {
        input: input.to_string(),
    })?;

    if value < i64::from(PAGE_MIN) || value > i64::from(PAGE_MAX) {
        return Err(ValidationError::OutOfRange {
            value,
            min: PAGE_MIN,
            max: PAGE_MAX,
        });
    }
    if value > i64::from(page_cap) {
        return Err(ValidationError::PageCapExceeded {
            value,
            cap: page_cap,
            max: PAGE_MAX,
        });
    }

    // Range-checked above.
    Ok(u8::try_from(value).unwrap_or(PAGE_MIN))
}

// ─── Step prompts ────────────────────────────────────────────────────────────

pub fn prompt_welcome() -> String {
    "👋 <b>Welcome to the IEEE Research Paper Generator!</b>\n\n\
     I'll generate a fully formatted IEEE research paper PDF for you.\n\n\
     📝 <b>Step 1 of 3:</b> Please send me your <b>paper title</b>."
        .to_string()
}

fn prompt_authors() -> String {
    "✅ Title saved!\n\n\
     👤 <b>Step 2 of 3:</b> Send your <b>author details</b> — one author per line, \
     fields separated by semicolons:\n\n\
     <code>name; department; institution; city; email</code>\n\n\
     <i>Example:</i>\n\
     <code>Suriya D; Department of AI and Data Science; Meenakshi Sundararajan Engineering College; Chennai, India; 303suriya@gmail.com</code>"
        .to_string()
}

fn prompt_pages(author_summary: &str) -> String {
    format!(
        "✅ Author details saved!\n{author_summary}\n\n\
         📄 <b>Step 3 of 3:</b> How many pages should the paper be?\n\
         <i>(Enter a number between {PAGE_MIN} and {PAGE_MAX})</i>"
    )
}

fn authors_summary(authors: &[Author]) -> String {
    authors
        .iter()
        .map(|a| format!("👤 <b>{}</b> — {}, {}", a.name, a.department, a.institution))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn prompt_help() -> String {
    "📖 <b>IEEE Research Paper Generator Bot</b>\n\n\
     <b>Commands:</b>\n\
     /start — Generate a new IEEE paper\n\
     /cancel — Cancel current operation\n\
     /redeem &lt;key&gt; — Unlock papers longer than 4 pages\n\
     /help — Show this message\n\n\
     <b>How it works:</b>\n\
     1. Send /start\n\
     2. Enter your paper title\n\
     3. Enter your author details\n\
     4. Enter desired page count (4–20)\n\
     5. Receive your IEEE-formatted PDF! 🎓"
        .to_string()
}
