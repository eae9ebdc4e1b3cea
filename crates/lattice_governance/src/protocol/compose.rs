use super::sentinel::{Sentinel, SentinelKind};
use super::{FOOTER_PREFIX, HEADER_PREFIX, INSTRUCTIONS};
use crate::labels;
use lattice_intent::Intent;
use std::fmt::Write;

/// A numbered checklist asking a human to pick among `items`.
pub fn compose_question<S: AsRef<str>>(intent: &Intent, items: &[S]) -> String {
    let mut body = header("needs a decision", intent);
    push_checklist(&mut body, items);
    body.push_str(INSTRUCTIONS);
    body.push_str("\n\n");
    finish(body, Sentinel::new(SentinelKind::Question, intent.id.clone()), intent)
}

/// A plan proposal; `version` tells revisions apart when a plan is re-posted.
pub fn compose_plan<S: AsRef<str>>(intent: &Intent, steps: &[S], version: u32) -> String {
    let mut body = header(&format!("plan v{}", version), intent);
    push_checklist(&mut body, steps);
    body.push_str(INSTRUCTIONS);
    body.push_str("\n\n");
    let sentinel = Sentinel::new(SentinelKind::Plan, intent.id.clone())
        .with_attr("version", version.to_string());
    finish(body, sentinel, intent)
}

pub fn compose_summary(intent: &Intent, text: &str) -> String {
    let mut body = header("summary", intent);
    let text = escape_markers(text.trim());
    if !text.is_empty() {
        body.push_str(&text);
        body.push_str("\n\n");
    }
    finish(body, Sentinel::new(SentinelKind::Summary, intent.id.clone()), intent)
}

/// Current state and governance label of the intent.
pub fn compose_status(intent: &Intent) -> String {
    let mut body = header("status", intent);
    let _ = writeln!(body, "State: `{}`", intent.state);
    if let Ok(label) = labels::for_state(intent.state) {
        let _ = writeln!(body, "Label: `{}`", label);
    }
    body.push('\n');
    let sentinel = Sentinel::new(SentinelKind::Status, intent.id.clone())
        .with_attr("state", intent.state.as_str());
    finish(body, sentinel, intent)
}

fn header(title: &str, intent: &Intent) -> String {
    let summary = one_line(&intent.summary);
    if summary.is_empty() {
        format!("{} {}\n\n", HEADER_PREFIX, title)
    } else {
        format!("{} {}: {}\n\n", HEADER_PREFIX, title, summary)
    }
}

fn push_checklist<S: AsRef<str>>(body: &mut String, items: &[S]) {
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(body, "- [ ] **{}.** {}", idx + 1, one_line(item.as_ref()));
    }
    body.push('\n');
}

fn finish(mut body: String, sentinel: Sentinel, intent: &Intent) -> String {
    body.push_str(&sentinel.render());
    body.push('\n');
    let _ = writeln!(body, "{} for intent `{}`</sub>", FOOTER_PREFIX, intent.id);
    body
}

/// Checklist items and headers must stay on one line to remain parseable.
fn one_line(text: &str) -> String {
    escape_markers(&text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Caller text must never open an HTML comment: a sentinel-shaped string
/// above the real sentinel would be decoded in its place.
fn escape_markers(text: &str) -> String {
    text.replace("<!--", "&lt;!--")
}
