/// Line comment marker. Only recognized at the start of a (trimmed) line.
const COMMENT_MARKER: &str = "//";

/// A non-blank, non-comment line with its position in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original text.
    pub number: usize,
    /// Number of leading whitespace characters that were trimmed.
    pub indent: usize,
    /// Trimmed content.
    pub text: String,
}

impl SourceLine {
    /// 1-based column of the first non-whitespace character.
    pub fn column(&self) -> usize {
        self.indent + 1
    }

    /// 1-based column of the first occurrence of `needle`, or of the line
    /// start when it does not occur.
    pub fn column_of(&self, needle: &str) -> usize {
        if needle.is_empty() {
            return self.column();
        }
        match self.text.find(needle) {
            Some(byte_idx) => self.indent + self.text[..byte_idx].chars().count() + 1,
            None => self.column(),
        }
    }
}

/// Strips blank lines and line-initial comments, keeping original line numbers.
///
/// Trailing comments on a content line are left in place.
pub fn preprocess(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let text = raw.trim();
            if text.is_empty() || text.starts_with(COMMENT_MARKER) {
                return None;
            }
            let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
            Some(SourceLine {
                number: idx + 1,
                indent,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Counts the line-initial comments [`preprocess`] strips.
pub fn count_comment_lines(source: &str) -> usize {
    source
        .lines()
        .filter(|raw| raw.trim_start().starts_with(COMMENT_MARKER))
        .count()
}
