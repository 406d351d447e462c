use crate::error::Error;
use crate::model::{Line, PlacedToken, TextRun, Token};

/// Split runs on whitespace, keeping each separator as its own token and
/// carrying the run's style onto every token.
pub fn tokenize(runs: &[TextRun]) -> Vec<Token> {
    let mut tokens = Vec::new();
    for run in runs {
        let mut start = 0;
        let mut in_ws: Option<bool> = None;
        for (i, ch) in run.text.char_indices() {
            let ws = ch.is_whitespace();
            if in_ws.is_some_and(|prev| prev != ws) {
                tokens.push(Token {
                    text: run.text[start..i].to_string(),
                    bold: run.bold,
                });
                start = i;
            }
            in_ws = Some(ws);
        }
        if start < run.text.len() {
            tokens.push(Token {
                text: run.text[start..].to_string(),
                bold: run.bold,
            });
        }
    }
    tokens
}

/// A word that may span several runs ("**bo**ld") and is never split.
struct Cluster {
    parts: Vec<(Token, f32)>,
    width: f32,
}

fn checked_width(
    token: &Token,
    measure: &mut impl FnMut(&str, bool) -> Result<f32, Error>,
) -> Result<f32, Error> {
    let w = measure(&token.text, token.bold)?;
    if !w.is_finite() || w < 0.0 {
        return Err(Error::measurement(&token.text, w));
    }
    Ok(w)
}

struct LineBuilder {
    lines: Vec<Line>,
    current: Line,
    has_word: bool,
}

impl LineBuilder {
    fn place(&mut self, token: Token, width: f32) {
        self.current.tokens.push(PlacedToken {
            text: token.text,
            bold: token.bold,
            x: self.current.width,
            width,
        });
        self.current.width += width;
    }

    fn place_cluster(&mut self, cluster: Cluster) {
        for (token, w) in cluster.parts {
            self.place(token, w);
        }
        self.has_word = true;
    }

    fn finish_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.has_word = false;
    }
}

/// Pack one paragraph's runs into lines no wider than `max_width`.
///
/// Only a single word wider than `max_width` may exceed it; such a word gets
/// a line of its own. A word that exactly fills the remaining width stays on
/// the line. Whitespace is dropped at wrap points and never trails a line.
pub fn break_lines(
    runs: &[TextRun],
    max_width: f32,
    mut measure: impl FnMut(&str, bool) -> Result<f32, Error>,
) -> Result<Vec<Line>, Error> {
    let tokens = tokenize(runs);
    let mut builder = LineBuilder {
        lines: Vec::new(),
        current: Line::default(),
        has_word: false,
    };
    let mut pending_ws: Vec<(Token, f32)> = Vec::new();

    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if token.is_whitespace() {
            let w = checked_width(&token, &mut measure)?;
            pending_ws.push((token, w));
            continue;
        }

        let mut cluster = Cluster {
            parts: Vec::new(),
            width: 0.0,
        };
        let w = checked_width(&token, &mut measure)?;
        cluster.parts.push((token, w));
        cluster.width += w;
        while let Some(next) = iter.next_if(|t| !t.is_whitespace()) {
            let w = checked_width(&next, &mut measure)?;
            cluster.parts.push((next, w));
            cluster.width += w;
        }

        let ws_width: f32 = pending_ws.iter().map(|(_, w)| w).sum();
        let first_line = builder.lines.is_empty();

        if builder.has_word {
            if builder.current.width + ws_width + cluster.width > max_width {
                builder.finish_line();
                pending_ws.clear();
            }
        } else if !first_line || ws_width + cluster.width > max_width {
            // leading whitespace survives only on a paragraph's first line, and only if it fits
            pending_ws.clear();
        }

        let oversized = cluster.width > max_width;
        if oversized {
            log::debug!(
                "layout: word of {:.1}pt exceeds line width {:.1}pt, placed alone",
                cluster.width,
                max_width
            );
        }

        let ws_width: f32 = pending_ws.iter().map(|(_, w)| w).sum();
        let line_width = builder.current.width + ws_width + cluster.width;
        for (ws, w) in pending_ws.drain(..) {
            builder.place(ws, w);
        }
        builder.place_cluster(cluster);
        // keep the width the fit test saw, not the re-accumulated sum
        builder.current.width = line_width;

        if oversized {
            builder.finish_line();
        }
    }

    if builder.has_word {
        builder.finish_line();
    }
    Ok(builder.lines)
}
