//! Statement splitting for generated DDL.

/// Split a DDL script into statements.
///
/// Semicolons inside string literals, quoted identifiers, comments and
/// dollar-quoted bodies do not end a statement. Returned statements are
/// trimmed, carry no trailing `;`, and chunks holding only comments are
/// dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_code = false;
    let mut i = 0;
    let bytes = sql.as_bytes();

    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = sql[i..].find('\n').map_or(bytes.len(), |n| i + n + 1);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
                continue;
            }
            quote @ (b'\'' | b'"') => {
                has_code = true;
                i = skip_quoted(bytes, i, quote);
                continue;
            }
            b'$' => {
                if let Some(tag) = dollar_tag(&sql[i..]) {
                    has_code = true;
                    let body = i + tag.len();
                    i = sql[body..].find(tag).map_or(bytes.len(), |n| body + n + tag.len());
                    continue;
                }
                has_code = true;
            }
            b';' => {
                if has_code {
                    statements.push(sql[start..i].trim().to_string());
                }
                start = i + 1;
                has_code = false;
            }
            c if !c.is_ascii_whitespace() => has_code = true,
            _ => {}
        }
        i += 1;
    }

    if has_code {
        let tail = sql[start..].trim();
        if !tail.is_empty() {
            statements.push(tail.to_string());
        }
    }
    statements
}

/// Index just past the closing quote. A doubled quote is an escaped quote.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// `$$` or `$tag$` at the start of `s`. Positional parameters such as `$1`
/// are not tags.
fn dollar_tag(s: &str) -> Option<&str> {
    let rest = s.strip_prefix('$')?;
    let end = rest.find('$')?;
    let tag = &rest[..end];
    let valid = tag.is_empty()
        || (tag
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    valid.then(|| &s[..end + 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_statements() {
        let sql = "CREATE TABLE a (id TEXT);\n\nCREATE TABLE b (id TEXT);\n";
        assert_eq!(
            split_statements(sql),
            ["CREATE TABLE a (id TEXT)", "CREATE TABLE b (id TEXT)"]
        );
    }

    #[test]
    fn comments_and_literals_hide_semicolons() {
        let sql = "-- header; still a comment\n\
                   CREATE TABLE a (s TEXT CHECK (s IN ('x;y', 'it''s')));\n\
                   /* block; comment */\n\
                   CREATE TABLE \"odd;name\" (id TEXT);";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("('x;y', 'it''s')))"));
        assert_eq!(statements[1], "/* block; comment */\nCREATE TABLE \"odd;name\" (id TEXT)");
    }

    #[test]
    fn dollar_quoted_bodies_stay_whole() {
        let sql = "DO $$\nBEGIN\n    ALTER TABLE a ADD x;\nEXCEPTION\n    WHEN duplicate_object THEN NULL;\nEND\n$$;\n\
                   CREATE FUNCTION f() RETURNS trigger AS $fn$ SELECT $1; $fn$;\n";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("DO $$"));
        assert!(statements[0].ends_with("END\n$$"));
        assert!(statements[1].ends_with("$fn$"));
    }

    #[test]
    fn comment_only_input_yields_nothing() {
        assert!(split_statements("-- nothing\n-- here\n").is_empty());
        assert!(split_statements("").is_empty());
        assert_eq!(split_statements("SELECT 1"), ["SELECT 1"]);
    }

    #[test]
    fn positional_parameters_are_not_tags() {
        assert_eq!(dollar_tag("$$ body"), Some("$$"));
        assert_eq!(dollar_tag("$fn$ body"), Some("$fn$"));
        assert_eq!(dollar_tag("$1 = $2"), None);
    }
}
