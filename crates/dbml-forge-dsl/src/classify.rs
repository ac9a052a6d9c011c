use crate::token::{lex_prefix, Keyword, Token};

/// What construct a preprocessed line starts.
///
/// Computed once per line from its first one or two tokens. Whether a
/// `ColumnLike` line really is a column depends on the enclosing scope,
/// which the parser tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Table,
    Ref,
    Enum,
    Project,
    TableGroup,
    /// `indexes {`, or a bare `indexes` with its brace on the next line.
    /// Only meaningful inside a table body.
    Indexes,
    /// `Note: '...'`
    NoteLine,
    /// A line that starts with `}` (or is a lone `{`).
    Brace,
    /// Starts with a name followed by something else.
    ColumnLike,
    Unknown,
}

impl LineKind {
    /// Keyword constructs that open top-level blocks the model ignores.
    pub fn unmodeled_keyword(self) -> Option<Keyword> {
        match self {
            Self::Enum => Some(Keyword::Enum),
            Self::Project => Some(Keyword::Project),
            Self::TableGroup => Some(Keyword::TableGroup),
            Self::Indexes => Some(Keyword::Indexes),
            _ => None,
        }
    }
}

/// Classifies a trimmed, non-empty line.
pub fn classify(text: &str) -> LineKind {
    if text.starts_with('}') || text == "{" {
        return LineKind::Brace;
    }

    let (tokens, _) = lex_prefix(text);
    let Some(first) = tokens.first() else {
        return LineKind::Unknown;
    };
    let second = tokens.get(1).map(|t| t.token);

    match first.token {
        Token::Ident => match Keyword::from_ident(first.text) {
            Some(Keyword::Table) if second.is_some() => LineKind::Table,
            Some(Keyword::Ref)
                if matches!(second, Some(Token::Colon | Token::Ident | Token::LBrace)) =>
            {
                LineKind::Ref
            }
            Some(Keyword::Enum) if second.is_some() => LineKind::Enum,
            Some(Keyword::Project) if second.is_some() => LineKind::Project,
            Some(Keyword::TableGroup) if second.is_some() => LineKind::TableGroup,
            Some(Keyword::Indexes)
                if second == Some(Token::LBrace) || text.len() == first.text.len() =>
            {
                LineKind::Indexes
            }
            Some(Keyword::Note) if second == Some(Token::Colon) => LineKind::NoteLine,
            _ if second.is_some() || text.len() > first.text.len() => {
                LineKind::ColumnLike
            }
            _ => LineKind::Unknown,
        },
        Token::StringLiteral if second.is_some() => LineKind::ColumnLike,
        _ => LineKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_keywords() {
        assert_eq!(classify("Table users {"), LineKind::Table);
        assert_eq!(classify("table users {"), LineKind::Table);
        assert_eq!(classify("Ref: a.b > c.d"), LineKind::Ref);
        assert_eq!(classify("Ref fk_posts: a.b > c.d"), LineKind::Ref);
        assert_eq!(classify("Ref {"), LineKind::Ref);
        assert_eq!(classify("Enum status {"), LineKind::Enum);
        assert_eq!(classify("Project shop {"), LineKind::Project);
        assert_eq!(classify("TableGroup core {"), LineKind::TableGroup);
    }

    #[test]
    fn body_lines() {
        assert_eq!(classify("indexes {"), LineKind::Indexes);
        assert_eq!(classify("Indexes"), LineKind::Indexes);
        assert_eq!(classify("Note: 'hello'"), LineKind::NoteLine);
        assert_eq!(classify("note: 'hello'"), LineKind::NoteLine);
        assert_eq!(classify("}"), LineKind::Brace);
        assert_eq!(classify("{"), LineKind::Brace);
        assert_eq!(classify("id integer [pk]"), LineKind::ColumnLike);
        assert_eq!(classify("\"first name\" varchar"), LineKind::ColumnLike);
    }

    #[test]
    fn keyword_named_columns_are_column_like() {
        assert_eq!(classify("note text"), LineKind::ColumnLike);
        assert_eq!(classify("indexes integer"), LineKind::ColumnLike);
        assert_eq!(classify("Tables integer"), LineKind::ColumnLike);
    }

    #[test]
    fn ident_followed_by_unlexable_text_is_column_like() {
        assert_eq!(classify("price $money"), LineKind::ColumnLike);
    }

    #[test]
    fn unknown_lines() {
        assert_eq!(classify("users"), LineKind::Unknown);
        assert_eq!(classify("???"), LineKind::Unknown);
        assert_eq!(classify("Table"), LineKind::Unknown);
        assert_eq!(classify("> users.id"), LineKind::Unknown);
    }

    #[test]
    fn unmodeled_keywords() {
        assert_eq!(LineKind::Enum.unmodeled_keyword(), Some(Keyword::Enum));
        assert_eq!(LineKind::Table.unmodeled_keyword(), None);
    }
}
