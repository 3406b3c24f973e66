//! Intcode program text format.
//!
//! Programs are plain text:
//! - Decimal integers separated by commas
//! - Whitespace and line breaks are ignored
//! - Lines starting with `#` are comments

use std::path::Path;
use thiserror::Error;

/// Parse program text into words.
pub fn parse_program(source: &str) -> Result<Vec<i64>, ProgramError> {
    let mut program = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        for token in trimmed.split(',').map(str::trim) {
            // Trailing commas leave an empty token
            if token.is_empty() {
                continue;
            }
            let word = token.parse::<i64>().map_err(|e| ProgramError::ParseError {
                line: line_num + 1,
                token: token.to_string(),
                message: e.to_string(),
            })?;
            program.push(word);
        }
    }

    if program.is_empty() {
        return Err(ProgramError::Empty);
    }

    Ok(program)
}

/// Load a program file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<i64>, ProgramError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ProgramError::IoError(e.to_string()))?;
    parse_program(&source)
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {token:?}: {message}")]
    ParseError { line: usize, token: String, message: String },

    #[error("program contains no words")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        assert_eq!(parse_program("1,9,10,3,2,3,11,0,99,30,40,50\n").unwrap().len(), 12);
        assert_eq!(parse_program("104,-1,99").unwrap(), vec![104, -1, 99]);
    }

    #[test]
    fn test_parse_multi_line_with_comments() {
        let source = "# doubles address 0\n1, 0, 0, 0,\n\n  99\n";
        assert_eq!(parse_program(source).unwrap(), vec![1, 0, 0, 0, 99]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_program("1,0\n0,x,99").unwrap_err();
        match err {
            ProgramError::ParseError { line, token, .. } => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse_program("# nothing\n\n"), Err(ProgramError::Empty));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_program("/nonexistent/program.txt").unwrap_err();
        assert!(matches!(err, ProgramError::IoError(_)));
    }
}
