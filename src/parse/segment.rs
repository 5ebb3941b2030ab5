use super::types::{Operator, ParsedCommand, Segment};

/// Accumulates segment text between operator boundaries.
#[derive(Default)]
struct Accumulator {
    segments: Vec<Segment>,
    buf: String,
    /// Operator that opened the segment currently being accumulated.
    pending: Option<Operator>,
}

impl Accumulator {
    /// Close the current segment and start a new one opened by `next`.
    /// Blank text is dropped; the first emitted segment never carries an operator.
    fn flush(&mut self, next: Option<Operator>) {
        let text = self.buf.trim();
        if !text.is_empty() {
            let operator = if self.segments.is_empty() {
                None
            } else {
                self.pending
            };
            self.segments.push(Segment::new(text.to_string(), operator));
        }
        self.buf.clear();
        self.pending = next;
    }
}

/// True when the `&` at `i` belongs to a redirect such as `2>&1`, `>&2` or `>1&`.
fn follows_redirect(chars: &[char], i: usize) -> bool {
    match i.checked_sub(1).map(|p| chars[p]) {
        Some('>') => true,
        Some(d) if d.is_ascii_digit() => i >= 2 && chars[i - 2] == '>',
        _ => false,
    }
}

/// Split a raw command string into the segments it runs.
///
/// Splits at `&&`, `||`, `;`, `|` and background `&`, never inside single or
/// double quotes, `$(...)` spans, backtick spans, or right after a backslash.
/// Unbalanced quotes or parens are not an error: the scan keeps whatever state
/// it has until the end of the string.
pub fn segment(raw: &str) -> ParsedCommand {
    let chars: Vec<char> = raw.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let (mut sq, mut dq, mut esc) = (false, false, false);
    let mut depth: u32 = 0;
    let mut backtick = false;
    let mut acc = Accumulator::default();

    while i < len {
        let c = chars[i];

        if esc {
            acc.buf.push(c);
            esc = false;
            i += 1;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            acc.buf.push(c);
            i += 1;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            acc.buf.push(c);
            i += 1;
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
            acc.buf.push(c);
            i += 1;
            continue;
        }
        if sq || dq {
            acc.buf.push(c);
            i += 1;
            continue;
        }

        // Substitution spans: $( opens, nested ( deepens, ) closes.
        if c == '$' && chars.get(i + 1) == Some(&'(') {
            depth += 1;
            acc.buf.push_str("$(");
            i += 2;
            continue;
        }
        if c == '(' && depth > 0 {
            depth += 1;
            acc.buf.push(c);
            i += 1;
            continue;
        }
        if c == ')' && depth > 0 {
            depth -= 1;
            acc.buf.push(c);
            i += 1;
            continue;
        }
        if c == '`' {
            backtick = !backtick;
            acc.buf.push(c);
            i += 1;
            continue;
        }
        if depth > 0 || backtick {
            acc.buf.push(c);
            i += 1;
            continue;
        }

        // Two-char operators before one-char operators
        let operator = match (c, chars.get(i + 1)) {
            ('&', Some('&')) => Some((Operator::And, 2)),
            ('|', Some('|')) => Some((Operator::Or, 2)),
            (';', _) => Some((Operator::Sequence, 1)),
            ('|', _) => Some((Operator::Pipe, 1)),
            ('&', _) if !follows_redirect(&chars, i) => Some((Operator::Background, 1)),
            _ => None,
        };
        if let Some((op, width)) = operator {
            acc.flush(Some(op));
            i += width;
            continue;
        }

        acc.buf.push(c);
        i += 1;
    }

    acc.flush(None);

    ParsedCommand {
        original: raw.to_string(),
        segments: acc.segments,
    }
}
