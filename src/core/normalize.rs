//! Text normalizers applied to a single message: LaTeX delimiters and general cleanup.

use std::sync::LazyLock;

use regex::Regex;

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));
static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid regex"));

/// Pure text-to-text cleanup selectable from the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    Latex,
    Clean,
}

impl Normalizer {
    pub fn apply(self, text: &str) -> String {
        match self {
            Normalizer::Latex => convert_latex_delimiters(text),
            Normalizer::Clean => clean_text(text),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Normalizer::Latex => "Format LaTeX",
            Normalizer::Clean => "Clean",
        }
    }
}

/// `\(`/`\)` become `$`, `\[`/`\]` become `$$`. Each token is replaced on its own;
/// unbalanced delimiters are converted all the same.
pub fn convert_latex_delimiters(text: &str) -> String {
    text.replace(r"\)", "$")
        .replace(r"\(", "$")
        .replace(r"\]", "$$")
        .replace(r"\[", "$$")
}

/// Whitespace, accent, quote, and dash normalization.
///
/// Quotes are normalized before `E'`/`e'` are accented so that `E’` ends up as `È`
/// on the first pass; this keeps the function idempotent.
pub fn clean_text(text: &str) -> String {
    let text = SPACE_RUNS.replace_all(text, " ");
    let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");

    let text = text
        .replace(['\u{2019}', '\u{2018}'], "'") // ’ ‘
        .replace("''", "\"")
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"") // “ ” « »
        .replace(['\u{2014}', '\u{2013}', '\u{2010}'], "-"); // — – ‐

    text.replace("E'", "\u{00C8}").replace("e'", "\u{00E8}") // È è
}
