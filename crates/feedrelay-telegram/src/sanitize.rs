//! Reduce arbitrary feed markup to the HTML subset Telegram accepts.
//!
//! Keeps `<b>` and `<a>`, turns paragraph and line-break tags into newlines,
//! strips every other tag while retaining its inner text, and normalizes
//! entities and whitespace. The whole pass is idempotent:
//! `sanitize_html(sanitize_html(x)) == sanitize_html(x)`.

/// Tags that survive sanitization verbatim.
const ALLOWED_TAGS: &[&str] = &["b", "a"];

/// Longest entity body considered when scanning for a terminating `;`.
const MAX_ENTITY_LEN: usize = 12;

/// Sanitize `input` into Telegram-safe rich text.
///
/// Rules, in order: decode entities (to fixpoint, so double-escaped input
/// cannot smuggle markup through a later pass), `<p>` to a blank line,
/// `</p>`/`<br>` to a line break, strip all tags outside the allow-list,
/// collapse 3+ consecutive line breaks to 2, trim.
#[must_use]
pub fn sanitize_html(input: &str) -> String {
    let mut decoded = decode_entities(input);
    loop {
        let again = decode_entities(&decoded);
        if again == decoded {
            break;
        }
        decoded = again;
    }

    let converted = transform_tags(&decoded);
    let collapsed = collapse_newlines(&converted);
    collapsed.trim().to_string()
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = tail[1..]
            .find(';')
            .filter(|i| *i > 0 && *i <= MAX_ENTITY_LEN)
            .and_then(|i| decode_entity(&tail[1..=i]).map(|d| (d, i + 2)));
        match decoded {
            Some((value, span)) => {
                out.push_str(&value);
                rest = &tail[span..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<String> {
    let literal = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            return char::from_u32(code).map(String::from);
        }
    };
    Some(literal.to_string())
}

fn transform_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match tag_span(tail) {
            Some(span) => {
                emit_tag(&mut out, &tail[..span]);
                rest = &tail[span..];
            }
            None => {
                // Not a recognizable tag; keep the bracket as text.
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of a well-formed tag span at the start of `s` (which begins with
/// `<`), or `None` when the bracket is just text.
fn tag_span(s: &str) -> Option<usize> {
    let close = s.find('>')?;
    if close < 2 {
        return None;
    }
    // A later `<` before the `>` means the bracket never formed a tag.
    if s[1..close].contains('<') {
        return None;
    }
    let first = s[1..].chars().next()?;
    if first.is_ascii_alphabetic() || first == '/' || first == '!' {
        Some(close + 1)
    } else {
        None
    }
}

fn emit_tag(out: &mut String, span: &str) {
    let inner = span
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/');
    let closing = inner.starts_with('/');
    let name = inner
        .trim_start_matches('/')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    match name.as_str() {
        "p" => out.push_str(if closing { "\n" } else { "\n\n" }),
        "br" => out.push('\n'),
        _ if ALLOWED_TAGS.contains(&name.as_str()) => out.push_str(span),
        _ => {}
    }
}

fn collapse_newlines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = 0usize;
    for ch in s.chars() {
        if ch == '\n' {
            run += 1;
            if run <= 2 {
                out.push(ch);
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
    out
}
