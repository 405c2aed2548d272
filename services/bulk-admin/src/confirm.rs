//! Operator confirmation before any write.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Returns true only when the operator supplies exactly `phrase`.
///
/// A phrase passed on the command line is checked as-is; otherwise the
/// operator is prompted and one line is read from `input`.
pub fn confirm<R: BufRead, W: Write>(
    phrase: &str,
    provided: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    if let Some(provided) = provided {
        return Ok(provided == phrase);
    }

    write!(output, "Type \"{}\" to continue: ", phrase)?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read confirmation")?;

    Ok(line.trim_end_matches(['\r', '\n']) == phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_exact_phrase_confirms() {
        let mut out = Vec::new();
        let ok = confirm("RESET MARKETPLACE", None, &mut Cursor::new("RESET MARKETPLACE\n"), &mut out)
            .unwrap();
        assert!(ok);
        assert!(String::from_utf8(out).unwrap().contains("RESET MARKETPLACE"));
    }

    #[test]
    fn test_near_misses_are_rejected() {
        for answer in ["reset marketplace\n", "RESET MARKETPLACE \n", "y\n", ""] {
            let ok = confirm("RESET MARKETPLACE", None, &mut Cursor::new(answer), &mut Vec::new())
                .unwrap();
            assert!(!ok, "accepted {:?}", answer);
        }
    }

    #[test]
    fn test_flag_skips_prompt() {
        let mut out = Vec::new();
        let mut input = Cursor::new("");
        assert!(confirm("PURGE", Some("PURGE"), &mut input, &mut out).unwrap());
        assert!(!confirm("PURGE", Some("purge"), &mut input, &mut out).unwrap());
        assert!(out.is_empty());
    }
}
