use logos::Logos;

/// Tokens used to classify line heads and to read reference expressions.
///
/// Keywords are not separate tokens: the notation's keywords are
/// case-insensitive and double as ordinary names inside table bodies, so
/// they are recognized from `Ident` text by [`Keyword::from_ident`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // -- Punctuation --
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    // -- Relationship symbols --
    #[token("<>")]
    ManyToMany,

    #[token(">")]
    Greater,

    #[token("<")]
    Less,

    #[token("-")]
    Dash,

    // -- Literals --
    /// A single- or double-quoted string, e.g. `'text'` or `"first name"`.
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    StringLiteral,

    /// A run of word characters. Deliberately wider than a valid identifier
    /// (`1bad` lexes as one token) so validation can name the bad text.
    #[regex(r"[a-zA-Z0-9_]+")]
    Ident,
}

impl Token {
    /// Returns a human-readable description of this token kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::ManyToMany => "'<>'",
            Self::Greater => "'>'",
            Self::Less => "'<'",
            Self::Dash => "'-'",
            Self::StringLiteral => "string literal",
            Self::Ident => "identifier",
        }
    }

    /// Returns true for the four relationship symbols.
    pub fn is_relation_symbol(&self) -> bool {
        matches!(
            self,
            Self::ManyToMany | Self::Greater | Self::Less | Self::Dash
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Construct keywords, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Table,
    Ref,
    Enum,
    Project,
    TableGroup,
    Indexes,
    Note,
}

impl Keyword {
    pub fn from_ident(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "table" => Some(Self::Table),
            "ref" => Some(Self::Ref),
            "enum" => Some(Self::Enum),
            "project" => Some(Self::Project),
            "tablegroup" => Some(Self::TableGroup),
            "indexes" => Some(Self::Indexes),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    /// Canonical spelling, as used in diagnostics and generated text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Ref => "Ref",
            Self::Enum => "Enum",
            Self::Project => "Project",
            Self::TableGroup => "TableGroup",
            Self::Indexes => "Indexes",
            Self::Note => "Note",
        }
    }
}

/// A token with its source text and byte range within the lexed string.
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub text: &'a str,
    pub start: usize,
}

/// Lexes `input` up to the first byte no token rule matches.
///
/// Returns the tokens read so far plus the byte offset of the unlexable
/// remainder, if any. Line heads are classified from a prefix, so trailing
/// free text (settings, notes) never needs to be tokenizable.
pub fn lex_prefix(input: &str) -> (Vec<SpannedToken<'_>>, Option<usize>) {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(input);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                text: &input[range.clone()],
                start: range.start,
            }),
            Err(()) => return (tokens, Some(range.start)),
        }
    }
    (tokens, None)
}
