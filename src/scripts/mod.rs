//! Script resources: named, ordered sequences of SQL statements.
//!
//! A script is the unit an upgrade step declares for its prepare and
//! cleanup phases. Statements execute in file order; the splitter
//! understands line comments, block comments, quoted strings, and
//! dollar-quoted bodies, so a `;` inside any of those does not end a
//! statement.

mod locator;
mod runner;

pub use locator::ScriptLocator;
pub use runner::run_script;

/// An ordered sequence of SQL statements sourced from a named resource.
#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    statements: Vec<String>,
}

impl Script {
    /// Splits raw SQL text into a script of individual statements.
    pub fn parse(name: impl Into<String>, sql: &str) -> Self {
        Self {
            name: name.into(),
            statements: split_statements(sql),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

/// Splits SQL text on statement-terminating semicolons.
///
/// Semicolons inside single/double quotes, line comments (`--`), block
/// comments (`/* */`), and dollar-quoted strings (`$tag$ ... $tag$`) are
/// preserved. Chunks containing only whitespace and comments are dropped.
fn split_statements(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        // Doubled quote is an escaped quote, not a terminator
                        if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b'$' => {
                // Possible dollar-quote opener: $tag$ where tag is [A-Za-z0-9_]*
                let mut j = i + 1;
                while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j] == b'$' {
                    let tag = &sql[i..=j];
                    match sql[j + 1..].find(tag) {
                        Some(pos) => i = j + 1 + pos + tag.len(),
                        // Unterminated dollar-quote swallows the rest
                        None => i = bytes.len(),
                    }
                } else {
                    i += 1;
                }
            }
            b';' => {
                let chunk = &sql[start..i];
                if !is_effectively_empty(chunk) {
                    statements.push(chunk.trim().to_string());
                }
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }

    let tail = &sql[start..];
    if !is_effectively_empty(tail) {
        statements.push(tail.trim().to_string());
    }

    statements
}

/// True when a chunk contains only whitespace and comments.
fn is_effectively_empty(chunk: &str) -> bool {
    let bytes = chunk.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            c if c.is_ascii_whitespace() => i += 1,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_statements() {
        let script = Script::parse(
            "basic.sql",
            "CREATE TABLE a (id INT);\nALTER TABLE a ADD COLUMN name TEXT;\n",
        );
        assert_eq!(
            script.statements(),
            &[
                "CREATE TABLE a (id INT)",
                "ALTER TABLE a ADD COLUMN name TEXT"
            ]
        );
    }

    #[test]
    fn test_semicolon_inside_string_literal() {
        let statements = split_statements("INSERT INTO t (v) VALUES ('a;b');UPDATE t SET v = 'x'");
        assert_eq!(
            statements,
            &["INSERT INTO t (v) VALUES ('a;b')", "UPDATE t SET v = 'x'"]
        );
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let statements = split_statements("INSERT INTO t (v) VALUES ('it''s; fine');");
        assert_eq!(statements, &["INSERT INTO t (v) VALUES ('it''s; fine')"]);
    }

    #[test]
    fn test_semicolon_inside_comments() {
        let sql = "-- leading; comment\nCREATE TABLE a (id INT); /* block; comment */ DROP TABLE b;";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("CREATE TABLE a (id INT)"));
        assert!(statements[1].ends_with("DROP TABLE b"));
    }

    #[test]
    fn test_dollar_quoted_body() {
        let sql = "CREATE FUNCTION f() RETURNS void AS $fn$ BEGIN NULL; END; $fn$ LANGUAGE plpgsql;SELECT 1";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("BEGIN NULL; END;"));
        assert_eq!(statements[1], "SELECT 1");
    }

    #[test]
    fn test_comment_only_tail_dropped() {
        let statements = split_statements("DROP TABLE a;\n-- done\n");
        assert_eq!(statements, &["DROP TABLE a"]);
    }

    #[test]
    fn test_missing_trailing_semicolon_keeps_statement() {
        let statements = split_statements("DROP TABLE a");
        assert_eq!(statements, &["DROP TABLE a"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_statements("").is_empty());
        assert!(split_statements("  \n -- nothing\n").is_empty());
    }
}
