//! Tokenizes a single command-line string into arguments.
//!
//! No backslash escapes, no variable expansion, no subshells — this is a
//! deliberately small shell-lexer subset, not a POSIX-compliant one.

/// Split `line` into whitespace-separated tokens, treating double-quoted
/// substrings as a single token with the quotes stripped.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_current = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_current = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_current {
                    tokens.push(std::mem::take(&mut current));
                    has_current = false;
                }
            }
            c => {
                current.push(c);
                has_current = true;
            }
        }
    }
    if has_current {
        tokens.push(current);
    }
    tokens
}

/// Detect an `echo … > file` redirection without going through the general
/// tokenizer.
///
/// Only lines starting with `echo ` and containing a `>` are recognized.
/// The left side (quoted or bare) becomes the text to write; the right side
/// is trimmed and has surrounding quotes stripped to become the target path.
/// A literal two-character `\n` in the text becomes a real newline.
///
/// Returns `(text, path)` on match.
pub fn parse_echo_redirect(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("echo ")?;
    let gt = rest.find('>')?;
    let (left, right) = rest.split_at(gt);
    let right = right[1..].trim();

    let text = left.trim();
    let text = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);
    let text = text.replace("\\n", "\n");

    let path = right
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(right);

    Some((text, path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(tokenize("git commit -m x"), vec!["git", "commit", "-m", "x"]);
    }

    #[test]
    fn tokenize_preserves_quoted_whitespace() {
        assert_eq!(
            tokenize(r#"git commit -m "a b  c""#),
            vec!["git", "commit", "-m", "a b  c"]
        );
    }

    #[test]
    fn tokenize_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn echo_redirect_basic() {
        let (text, path) = parse_echo_redirect(r#"echo "# Hello" > README.md"#).unwrap();
        assert_eq!(text, "# Hello");
        assert_eq!(path, "README.md");
    }

    #[test]
    fn echo_redirect_unquoted_text() {
        let (text, path) = parse_echo_redirect("echo hello > file.txt").unwrap();
        assert_eq!(text, "hello");
        assert_eq!(path, "file.txt");
    }

    #[test]
    fn echo_redirect_literal_newline_escape() {
        let (text, _) = parse_echo_redirect(r#"echo "a\nb" > f"#).unwrap();
        assert_eq!(text, "a\nb");
    }

    #[test]
    fn non_redirect_echo_returns_none() {
        assert!(parse_echo_redirect("echo hello").is_none());
    }

    #[test]
    fn non_echo_line_returns_none() {
        assert!(parse_echo_redirect("git status").is_none());
    }
}
