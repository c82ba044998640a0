//! Canonical layout for generated Go source.
//!
//! Writers mark alignment points with a vertical tab (`\x0b`), the same cell
//! separator go/printer hands to its tabwriter. [`format_source`] checks the
//! source is lexically well formed and then aligns each block of consecutive
//! cell lines the way gofmt does: every cell except the last in a line is
//! padded to the widest cell of its column plus one space.

use crate::error::FormatError;

/// Cell separator understood by [`format_source`].
pub const CELL: char = '\x0b';

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Whether `name` can be declared as a Go identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !KEYWORDS.contains(&name)
}

/// Ensure `name` is a declarable identifier.
pub fn identifier(name: &str) -> Result<&str, FormatError> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(FormatError::InvalidIdentifier(name.to_string()))
    }
}

/// Go interpreted string literal for `value`.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Validate and lay out generated Go source.
pub fn format_source(source: &str) -> Result<String, FormatError> {
    check_delimiters(source)?;

    let mut out = String::with_capacity(source.len());
    let mut block: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for line in source.lines() {
        if line.contains(CELL) {
            block.push(line);
            continue;
        }
        flush_block(&mut out, &mut block);

        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    flush_block(&mut out, &mut block);

    while out.ends_with("\n\n") {
        out.pop();
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn flush_block(out: &mut String, block: &mut Vec<&str>) {
    if block.is_empty() {
        return;
    }

    let rows: Vec<(&str, Vec<&str>)> = block
        .iter()
        .map(|line| {
            let body = line.trim_start_matches('\t');
            let indent = &line[..line.len() - body.len()];
            (indent, body.split(CELL).map(str::trim).collect())
        })
        .collect();

    let columns = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for (_, cells) in &rows {
        // The last cell of a row is never padded, so it does not widen its column.
        for (i, cell) in cells.iter().enumerate().take(cells.len().saturating_sub(1)) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    for (indent, cells) in rows {
        let mut line = String::from(indent);
        let last = cells.len().saturating_sub(1);
        for (i, cell) in cells.iter().enumerate() {
            line.push_str(cell);
            if i < last {
                let pad = widths[i] + 1 - cell.chars().count();
                line.extend(std::iter::repeat_n(' ', pad));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    block.clear();
}

/// Reject unbalanced brackets and unterminated literals, ignoring anything
/// inside comments and string literals.
fn check_delimiters(source: &str) -> Result<(), FormatError> {
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let mut chars = raw_line.chars().peekable();
        let mut in_string = false;
        while let Some(c) = chars.next() {
            if in_string {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '"' => in_string = true,
                '`' => {
                    // Raw strings in generated code never span lines.
                    if !chars.by_ref().any(|c| c == '`') {
                        return Err(FormatError::UnterminatedLiteral("raw string"));
                    }
                }
                '(' | '{' | '[' => stack.push((c, line_no)),
                ')' | '}' | ']' => {
                    let open = match c {
                        ')' => '(',
                        '}' => '{',
                        _ => '[',
                    };
                    match stack.pop() {
                        Some((top, _)) if top == open => {}
                        _ => {
                            return Err(FormatError::Unbalanced {
                                line: line_no,
                                delimiter: c,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        if in_string {
            return Err(FormatError::UnterminatedLiteral("string"));
        }
    }

    match stack.pop() {
        Some((delimiter, line)) => Err(FormatError::Unbalanced { line, delimiter }),
        None => Ok(()),
    }
}
