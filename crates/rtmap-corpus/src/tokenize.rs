//! Line and token primitives shared by the per-file parsers.

const CONTINUATION: char = '\\';
const COMMENT_MARKER: char = '#';
const EXPORT_KEYWORD: &str = "export";
const QUOTE_CHARS: [char; 2] = ['"', '\''];

/// One statement after continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based physical line the statement starts on.
    pub line_no: usize,
    pub text: String,
}

fn push_piece(acc: &mut String, piece: &str) {
    if !acc.is_empty() && !piece.is_empty() {
        acc.push(' ');
    }
    acc.push_str(piece);
}

/// Join physical lines that end in a backslash continuation with the lines
/// after them. Continued pieces are trimmed and joined by a single space.
/// A `#` comment line never continues, and a trailing continuation on the
/// last line is dropped.
pub fn numbered_logical_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut pending: Option<LogicalLine> = None;
    for (index, raw) in lines.iter().enumerate() {
        let line = raw.as_ref();
        let piece = if pending.is_some() {
            line.trim()
        } else {
            line.trim_end()
        };
        let is_comment = pending.is_none() && piece.trim_start().starts_with(COMMENT_MARKER);
        if !is_comment && let Some(body) = piece.strip_suffix(CONTINUATION) {
            let acc = pending.get_or_insert_with(|| LogicalLine {
                line_no: index + 1,
                text: String::new(),
            });
            push_piece(&mut acc.text, body.trim_end());
            continue;
        }
        match pending.take() {
            Some(mut acc) => {
                push_piece(&mut acc.text, piece);
                out.push(acc);
            }
            None => out.push(LogicalLine {
                line_no: index + 1,
                text: line.to_string(),
            }),
        }
    }
    out.extend(pending);
    out
}

/// [`numbered_logical_lines`] without the line numbers.
pub fn logical_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    numbered_logical_lines(lines)
        .into_iter()
        .map(|line| line.text)
        .collect()
}

pub fn words(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Remove surrounding quote characters.
pub fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches(&QUOTE_CHARS[..])
}

/// Split a shell-style `KEY=VALUE` statement on its first `=`.
///
/// An optional leading `export` keyword is ignored. Returns `None` unless
/// both sides are present and the key is a single word.
pub fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let mut statement = text.trim();
    if let Some(rest) = statement.strip_prefix(EXPORT_KEYWORD)
        && rest.starts_with(char::is_whitespace)
    {
        statement = rest.trim_start();
    }
    let (key, value) = statement.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_lines_are_joined() {
        let lines = [
            "cp ${FILEDIR}/a.nc \\",
            "   $PTMP/a.nc",
            "ln -s x y",
        ];
        assert_eq!(
            logical_lines(&lines),
            vec![
                "cp ${FILEDIR}/a.nc $PTMP/a.nc".to_string(),
                "ln -s x y".to_string(),
            ]
        );
    }

    #[test]
    fn dangling_continuation_is_kept_without_backslash() {
        let lines = ["rsync -a src \\"];
        assert_eq!(logical_lines(&lines), vec!["rsync -a src".to_string()]);
    }

    #[test]
    fn joined_statements_remember_their_first_physical_line() {
        let lines = [
            "mkdir INPUT",
            "export LIST_FILES=\"sfcf000.nc \\",
            "   sfcf024.nc \\",
            "   atmf000.nc\"",
            "ln -s x y",
        ];
        assert_eq!(
            numbered_logical_lines(&lines),
            vec![
                LogicalLine {
                    line_no: 1,
                    text: "mkdir INPUT".to_string(),
                },
                LogicalLine {
                    line_no: 2,
                    text: "export LIST_FILES=\"sfcf000.nc sfcf024.nc atmf000.nc\"".to_string(),
                },
                LogicalLine {
                    line_no: 5,
                    text: "ln -s x y".to_string(),
                },
            ]
        );
    }

    #[test]
    fn comment_lines_do_not_continue() {
        let lines = ["# staging \\", "cp a b"];
        assert_eq!(
            logical_lines(&lines),
            vec!["# staging \\".to_string(), "cp a b".to_string()]
        );
    }

    #[test]
    fn export_prefix_is_ignored() {
        assert_eq!(
            split_assignment("export CNTL_DIR=baseline_v1"),
            Some(("CNTL_DIR", "baseline_v1"))
        );
        assert_eq!(split_assignment("  DT_ATMOS=720"), Some(("DT_ATMOS", "720")));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        assert_eq!(
            split_assignment("export OPTS=\"a=b\""),
            Some(("OPTS", "\"a=b\""))
        );
    }

    #[test]
    fn incomplete_assignments_are_rejected() {
        assert_eq!(split_assignment("export_fv3"), None);
        assert_eq!(split_assignment("EMPTY="), None);
        assert_eq!(split_assignment("=value"), None);
        assert_eq!(split_assignment("if [ $X = 1 ]"), None);
        assert_eq!(split_assignment("exported=1"), Some(("exported", "1")));
    }

    #[test]
    fn quotes_are_stripped_from_both_ends() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("'input.nc'"), "input.nc");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
