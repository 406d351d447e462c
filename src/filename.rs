const FALLBACK_FILENAME: &str = "document.pdf";

/// Whitespace runs become `_`; anything else outside `[A-Za-z0-9_]` is dropped.
pub fn sanitize_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_ws = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                out.push('_');
            }
            in_ws = true;
            continue;
        }
        in_ws = false;
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        }
    }
    out
}

/// Fill `{name}` placeholders in `template` with sanitized field values.
///
/// Unknown placeholders expand to nothing, an unclosed `{` is kept literally.
/// The result always ends in `.pdf`.
pub fn render_filename(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = after[..close].trim();
        match fields.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => out.push_str(&sanitize_field(value)),
            None => log::debug!("filename: no value for placeholder {{{name}}}"),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    let stem_empty = out
        .strip_suffix(".pdf")
        .unwrap_or(&out)
        .trim_matches('_')
        .is_empty();
    if stem_empty {
        return FALLBACK_FILENAME.to_string();
    }
    if !out.to_ascii_lowercase().ends_with(".pdf") {
        out.push_str(".pdf");
    }
    out
}
