use thiserror::Error;

use crate::config::MAX_TOKENS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("too many arguments (at most {limit} words per line)")]
    TooManyTokens { limit: usize },
}

/// Characters that separate tokens. Tabs are ordinary token content.
const DELIMITERS: [char; 2] = [' ', '\n'];

/// Split a line into whitespace-delimited tokens
///
/// Runs of spaces and newlines separate tokens and never appear inside one.
/// There is no quoting or escaping: every space splits. A blank line yields an
/// empty vector. Lines with more than [`MAX_TOKENS`] tokens are rejected whole.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    tokenize_bounded(line, MAX_TOKENS)
}

pub(crate) fn tokenize_bounded(line: &str, limit: usize) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    for word in line.split(DELIMITERS).filter(|w| !w.is_empty()) {
        if tokens.len() == limit {
            return Err(TokenizeError::TooManyTokens { limit });
        }
        tokens.push(word.to_string());
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_command_and_arguments() {
        assert_eq!(
            tokenize("setenv FOO bar\n").unwrap(),
            vec!["setenv", "FOO", "bar"]
        );
    }

    #[test]
    fn blank_lines_are_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("\n").unwrap().is_empty());
        assert!(tokenize("   \n").unwrap().is_empty());
    }

    #[test]
    fn runs_of_delimiters_collapse() {
        assert_eq!(
            tokenize("  ls   -l \n\n /tmp  ").unwrap(),
            vec!["ls", "-l", "/tmp"]
        );
    }

    #[test]
    fn no_quoting_or_escaping() {
        assert_eq!(
            tokenize("echo \"a b\" c\\ d").unwrap(),
            vec!["echo", "\"a", "b\"", "c\\", "d"]
        );
    }

    #[test]
    fn tabs_stay_inside_tokens() {
        assert_eq!(tokenize("a\tb c").unwrap(), vec!["a\tb", "c"]);
    }

    #[test]
    fn exactly_at_capacity_is_accepted() {
        let line = vec!["x"; MAX_TOKENS].join(" ");
        assert_eq!(tokenize(&line).unwrap().len(), MAX_TOKENS);
    }

    #[test]
    fn over_capacity_is_an_error() {
        let line = vec!["x"; MAX_TOKENS + 1].join(" ");
        assert_eq!(
            tokenize(&line),
            Err(TokenizeError::TooManyTokens { limit: MAX_TOKENS })
        );
    }

    #[test]
    fn custom_bound() {
        assert!(tokenize_bounded("a b", 2).is_ok());
        assert!(tokenize_bounded("a b c", 2).is_err());
    }
}
