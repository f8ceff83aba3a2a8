//! Token-level JSON re-indentation.
//!
//! The input is never parsed into a value tree: strings, numbers and keys are
//! copied byte for byte, so `1.50`, `1e2`, integers wider than 64 bits and
//! repeated keys come out exactly as they went in. Only insignificant
//! whitespace between tokens is replaced.

/// Indentation unit used by [`indent`].
pub const INDENT: &str = "  ";

/// Re-indent an already validated JSON document.
///
/// Objects and arrays put each member on its own line, `:` is followed by one
/// space, and empty containers stay as `{}` / `[]`.
pub fn indent(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    // Set after `{` / `[`; the newline is written once we know the container is not empty.
    let mut open_pending = false;

    for c in raw.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            continue;
        }

        if open_pending && c != '}' && c != ']' {
            open_pending = false;
            depth += 1;
            newline(&mut out, depth);
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                out.push(c);
                open_pending = true;
            }
            '}' | ']' => {
                if open_pending {
                    open_pending = false;
                } else {
                    depth = depth.saturating_sub(1);
                    newline(&mut out, depth);
                }
                out.push(c);
            }
            ',' => {
                out.push(c);
                newline(&mut out, depth);
            }
            ':' => out.push_str(": "),
            _ => out.push(c),
        }
    }

    out
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
