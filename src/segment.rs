use crate::model::{Paragraph, TextRun};

const BOLD_MARKER: &str = "**";
const TAB_EXPANSION: &str = "    ";

/// Split raw text into paragraphs of styled runs.
///
/// Never fails: replacement characters and stray control characters are
/// dropped, tabs become four spaces, an unmatched `**` is kept as literal text.
pub fn segment(text: &str) -> Vec<Paragraph> {
    let cleaned = strip_degraded(text);
    cleaned
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                Paragraph::Blank
            } else {
                Paragraph::Runs(parse_bold(line))
            }
        })
        .collect()
}

fn strip_degraded(text: &str) -> String {
    let mut dropped = 0usize;
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => cleaned.push(c),
            // neither Helvetica nor WinAnsi has a tab glyph
            '\t' => cleaned.push_str(TAB_EXPANSION),
            '\r' => {}
            '\u{FFFD}' => dropped += 1,
            c if c.is_control() => dropped += 1,
            c => cleaned.push(c),
        }
    }
    if dropped > 0 {
        log::warn!("segment: dropped {dropped} replacement/control characters");
    }
    cleaned
}

/// Parse one paragraph's `**bold**` pairs, matched left to right, non-greedy.
pub fn parse_bold(line: &str) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find(BOLD_MARKER) {
        let after = &rest[open + BOLD_MARKER.len()..];
        let Some(close) = after.find(BOLD_MARKER) else {
            log::warn!("segment: unmatched bold marker kept as text");
            break;
        };
        push_normal(&mut runs, &rest[..open]);
        runs.push(TextRun::bold(&after[..close]));
        rest = &after[close + BOLD_MARKER.len()..];
    }
    push_normal(&mut runs, rest);
    runs
}

fn push_normal(runs: &mut Vec<TextRun>, text: &str) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if !last.bold => last.text.push_str(text),
        _ => runs.push(TextRun::normal(text)),
    }
}
