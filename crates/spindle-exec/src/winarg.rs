//! CreateProcess argument escaping.
//!
//! Windows hands child processes a single concatenated command line that the
//! C runtime re-parses into argv. Tokens must be escaped so that re-parsing
//! reproduces the caller's argv exactly. Unix spawns take the vector as-is
//! and never go through this module.

/// Escape one argv token for a CreateProcess command line.
///
/// Tokens without whitespace or quotes pass through unchanged. Everything
/// else is wrapped in double quotes; embedded quotes are backslash-escaped,
/// a run of N backslashes before a quote becomes 2N+1, and a trailing run of
/// N backslashes becomes 2N so the closing quote survives re-parsing.
pub fn escape_create_process_arg(arg: &str) -> String {
    let needs_quoting =
        arg.is_empty() || arg.chars().any(|c| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '"'));
    if !needs_quoting {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut chars = arg.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let mut run = 1usize;
            while chars.peek() == Some(&'\\') {
                chars.next();
                run += 1;
            }
            match chars.peek() {
                // Trailing backslashes sit against the closing quote we add.
                None => push_backslashes(&mut out, run * 2),
                Some('"') => {
                    push_backslashes(&mut out, run * 2 + 1);
                    out.push('"');
                    chars.next();
                }
                Some(_) => push_backslashes(&mut out, run),
            }
        } else if c == '"' {
            out.push('\\');
            out.push('"');
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

fn push_backslashes(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push('\\');
    }
}

#[cfg(test)]
mod tests {
    use super::escape_create_process_arg;

    #[test]
    fn plain_tokens_pass_through() {
        assert_eq!(escape_create_process_arg("cl.exe"), "cl.exe");
        assert_eq!(escape_create_process_arg("--flag=value"), "--flag=value");
        assert_eq!(escape_create_process_arg(r"C:\dir\file.txt"), r"C:\dir\file.txt");
    }

    #[test]
    fn empty_token_becomes_quoted_pair() {
        assert_eq!(escape_create_process_arg(""), r#""""#);
    }

    #[test]
    fn whitespace_forces_quoting() {
        assert_eq!(escape_create_process_arg("a b"), r#""a b""#);
        assert_eq!(escape_create_process_arg("a\tb"), "\"a\tb\"");
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        assert_eq!(escape_create_process_arg(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn backslashes_before_quote_are_doubled_plus_one() {
        // a\"b re-parses back to a\"b only if the single backslash becomes three.
        assert_eq!(escape_create_process_arg(r#"a\"b"#), r#""a\\\"b""#);
        assert_eq!(escape_create_process_arg(r#"a\\"b"#), r#""a\\\\\"b""#);
    }

    #[test]
    fn trailing_backslashes_are_doubled() {
        assert_eq!(escape_create_process_arg(r"a b\"), r#""a b\\""#);
        assert_eq!(escape_create_process_arg(r"a b\\"), r#""a b\\\\""#);
    }

    #[test]
    fn interior_backslashes_stay_literal() {
        // Backslashes not adjacent to a quote carry no special meaning.
        assert_eq!(escape_create_process_arg(r"path\to a"), r#""path\to a""#);
    }
}
