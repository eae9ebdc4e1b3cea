use super::sentinel::SENTINEL_RE;
use super::{ProtocolError, FOOTER_PREFIX, HEADER_PREFIX, INSTRUCTIONS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static CHECKLIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:>\s*)*[-*+]\s+\[([ xX])\]\s+\*\*(\d+)\.\*\*")
        .expect("checklist pattern is valid")
});

static QUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:>\s*)*").expect("quote pattern is valid"));

/// What a human said: the ticked item numbers and anything else they wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Ascending, without duplicates.
    pub checked: Vec<u32>,
    pub freeform: String,
}

impl Response {
    pub fn is_checked(&self, item: u32) -> bool {
        self.checked.binary_search(&item).is_ok()
    }
}

/// Split a reply into checked items and free text. Checklist lines, the
/// sentinel and the lines Lattice itself wrote are dropped from the text.
pub fn parse_response(body: &str) -> Result<Response, ProtocolError> {
    let mut checked = BTreeSet::new();
    let mut kept: Vec<&str> = Vec::new();

    for line in body.lines() {
        if let Some((ticked, item)) = checklist_item(line) {
            if ticked {
                checked.insert(item);
            }
            continue;
        }

        let unquoted = QUOTE_RE.replace(line, "");
        if is_boilerplate(&unquoted) {
            continue;
        }
        kept.push(line.trim_end());
    }

    let text = kept.join("\n");
    let text = SENTINEL_RE.replace_all(&text, "");
    let freeform = collapse_blank_lines(&text);

    if checked.is_empty() && freeform.is_empty() {
        return Err(ProtocolError::NotAResponse);
    }
    Ok(Response {
        checked: checked.into_iter().collect(),
        freeform,
    })
}

/// `(ticked, N)` for a checklist line. Items are numbered from 1; anything
/// else is prose.
fn checklist_item(line: &str) -> Option<(bool, u32)> {
    let caps = CHECKLIST_RE.captures(line)?;
    let item = caps[2].parse::<u32>().ok().filter(|n| *n >= 1)?;
    Some((!caps[1].trim().is_empty(), item))
}

fn is_boilerplate(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(HEADER_PREFIX) || line.starts_with(FOOTER_PREFIX) || line == INSTRUCTIONS
}

/// Trim the text and squeeze runs of blank (or quote-only) lines to one.
fn collapse_blank_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = false;
    for line in text.lines() {
        let blank = QUOTE_RE.replace(line, "").trim().is_empty();
        if blank {
            if !blank_run && !out.is_empty() {
                out.push("");
            }
            blank_run = true;
        } else {
            out.push(line);
            blank_run = false;
        }
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out.join("\n").trim().to_string()
}
