//! Punctuation and whitespace normalisation for pasted or imported text

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::OnceLock;

/// Result of a sanitize pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    /// Normalised text
    pub text: String,
    /// Number of replacements made (punctuation and whitespace)
    pub count: usize,
}

/// Half-width punctuation replaced by its full-width form.
/// `.` is handled separately: only after a CJK character.
const PUNCTUATION: [(char, char); 7] = [
    (',', '，'),
    (':', '：'),
    (';', '；'),
    ('(', '（'),
    (')', '）'),
    ('?', '？'),
    ('!', '！'),
];

fn cjk_dot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\x{4e00}-\x{9fff}\x{3000}-\x{303f}\x{ff00}-\x{ffef}])\.")
            .expect("cjk dot pattern")
    })
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern"))
}

fn multi_newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("newline run pattern"))
}

fn replace_char(text: &str, from: char, to: char, count: &mut usize) -> String {
    let hits = text.matches(from).count();
    if hits == 0 {
        return text.to_string();
    }
    *count += hits;
    text.replace(from, to.encode_utf8(&mut [0; 4]))
}

/// Replace half-width punctuation with full-width forms and tidy whitespace.
///
/// Rules run in a fixed order: `,` then `.` after CJK, then the remaining
/// punctuation, NBSP to space, per-line trim, and finally runs of three or
/// more newlines collapse to one blank line.
pub fn sanitize_text(text: &str) -> SanitizeReport {
    let mut count = 0;

    let (comma, rest) = PUNCTUATION.split_at(1);
    let mut result = replace_char(text, comma[0].0, comma[0].1, &mut count);

    result = cjk_dot_re()
        .replace_all(&result, |caps: &Captures| {
            count += 1;
            format!("{}。", &caps[1])
        })
        .into_owned();

    for &(from, to) in rest {
        result = replace_char(&result, from, to, &mut count);
    }

    result = replace_char(&result, '\u{00A0}', ' ', &mut count);

    result = result
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.len() != line.len() {
                count += 1;
            }
            trimmed
        })
        .collect::<Vec<_>>()
        .join("\n");

    result = blank_run_re()
        .replace_all(&result, |_: &Captures| {
            count += 1;
            "\n\n"
        })
        .into_owned();

    SanitizeReport {
        text: result,
        count,
    }
}

/// Normalise text extracted from an imported file: trim every line,
/// collapse paragraph gaps to single newlines and trim the whole.
pub fn normalize_imported_text(text: &str) -> String {
    let trimmed = text
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    multi_newline_re()
        .replace_all(&trimmed, "\n")
        .trim()
        .to_string()
}
