//! Scanning of SQLite table DDL for CHECK constraints.
//!
//! SQLite keeps constraints only inside the `CREATE TABLE` text stored in
//! `sqlite_master`, so detecting a rigid column means reading that text.

/// One `CHECK (...)` clause and where it sits in the DDL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckClause<'a> {
    /// Expression without the outer parentheses.
    pub body: &'a str,
    /// Byte offset of the clause, including a leading `CONSTRAINT name`.
    pub start: usize,
    /// Byte offset just past the closing parenthesis.
    pub end: usize,
}

/// Every `CHECK (...)` clause in `ddl`, in source order.
pub fn scan_checks(ddl: &str) -> Vec<CheckClause<'_>> {
    let bytes = ddl.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    // Start of a `CONSTRAINT` keyword and how many tokens followed it.
    let mut constraint: Option<(usize, u8)> = None;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                constraint = None;
                i = skip_quoted(bytes, i);
            }
            b'"' | b'`' => {
                constraint = constraint.map(|(at, n)| (at, n + 1));
                i = skip_quoted(bytes, i);
            }
            b'[' => {
                constraint = constraint.map(|(at, n)| (at, n + 1));
                i = skip_bracketed(bytes, i);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            b if is_ident_start(b) => {
                let start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                let word = &ddl[start..i];
                if word.eq_ignore_ascii_case("constraint") {
                    constraint = Some((start, 0));
                    continue;
                }
                if !word.eq_ignore_ascii_case("check") {
                    constraint = constraint.map(|(at, n)| (at, n + 1));
                    continue;
                }
                let named_start = match constraint.take() {
                    Some((at, 1)) => at,
                    _ => start,
                };
                let mut open = i;
                while open < bytes.len() && bytes[open].is_ascii_whitespace() {
                    open += 1;
                }
                if bytes.get(open) != Some(&b'(') {
                    continue;
                }
                if let Some(close) = matching_paren(bytes, open) {
                    out.push(CheckClause {
                        body: ddl[open + 1..close].trim(),
                        start: named_start,
                        end: close + 1,
                    });
                    i = close + 1;
                }
            }
            _ => {
                constraint = None;
                i += 1;
            }
        }
    }

    out
}

/// Bodies of every `CHECK (...)` clause in `ddl`, without the outer parentheses.
pub fn check_clauses(ddl: &str) -> Vec<&str> {
    scan_checks(ddl).into_iter().map(|c| c.body).collect()
}

/// `ddl` with every CHECK clause that references `column` cut out. A
/// table-level clause takes its separating comma with it. Everything else,
/// other columns' checks included, is left byte for byte.
pub fn strip_column_checks(ddl: &str, column: &str) -> String {
    let bytes = ddl.as_bytes();
    let mut out = ddl.to_string();
    let doomed: Vec<CheckClause<'_>> = scan_checks(ddl)
        .into_iter()
        .filter(|c| references_column(c.body, column))
        .collect();

    // Back to front so earlier offsets stay valid.
    for clause in doomed.iter().rev() {
        let before = bytes[..clause.start]
            .iter()
            .rposition(|b| !b.is_ascii_whitespace());
        let after = bytes[clause.end..]
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map(|p| clause.end + p);
        let prev = before.map(|p| bytes[p]);
        let next = after.map(|p| bytes[p]);

        let range = match (prev, next) {
            (Some(b','), Some(b',' | b')')) => before.unwrap_or(clause.start)..clause.end,
            (Some(b'('), Some(b',')) => clause.start..after.map_or(clause.end, |p| p + 1),
            _ => clause.start..clause.end,
        };
        out.replace_range(range, "");
    }
    out
}

/// `CREATE TABLE` text re-pointed at `new_name`. `None` when the column
/// list cannot be found.
pub fn rename_create_table(ddl: &str, new_name: &str) -> Option<String> {
    let bytes = ddl.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_quoted(bytes, i),
            b'[' => i = skip_bracketed(bytes, i),
            b'(' => {
                let quoted = format!("\"{}\"", new_name.replace('"', "\"\""));
                return Some(format!("CREATE TABLE {quoted} {}", &ddl[i..]));
            }
            _ => i += 1,
        }
    }
    None
}

/// Whether `expr` mentions `column` as an identifier (bare or quoted).
/// String literals are ignored, so `'role'` does not count.
pub fn references_column(expr: &str, column: &str) -> bool {
    let bytes = expr.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_quoted(bytes, i),
            q @ (b'"' | b'`') => {
                let end = skip_quoted(bytes, i);
                let inner_end = if end > i + 1 && bytes[end - 1] == q {
                    end - 1
                } else {
                    end
                };
                let doubled = if q == b'"' { "\"\"" } else { "``" };
                let single = if q == b'"' { "\"" } else { "`" };
                if expr[i + 1..inner_end]
                    .replace(doubled, single)
                    .eq_ignore_ascii_case(column)
                {
                    return true;
                }
                i = end;
            }
            b'[' => {
                let end = skip_bracketed(bytes, i);
                let inner_end = if end > i + 1 { end - 1 } else { end };
                if expr[i + 1..inner_end].eq_ignore_ascii_case(column) {
                    return true;
                }
                i = end;
            }
            b if is_ident_start(b) => {
                let start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                if expr[start..i].eq_ignore_ascii_case(column) {
                    return true;
                }
            }
            _ => i += 1,
        }
    }

    false
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Index just past the quoted run starting at `start`. Doubled quotes are escapes.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}

fn skip_bracketed(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b']')
        .map(|p| start + p + 1)
        .unwrap_or(bytes.len())
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = open;
    while j < bytes.len() {
        match bytes[j] {
            b'\'' | b'"' | b'`' => {
                j = skip_quoted(bytes, j);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}
