//! The bracketed `key: value` settings mini-language shared by tables,
//! columns, and references.

use crate::error::DslError;

const QUOTES: [u8; 3] = [b'\'', b'"', b'`'];

/// A line split around its trailing settings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSplit<'a> {
    /// Text before the settings list, trailing whitespace removed.
    pub head: &'a str,
    /// Text between the brackets, if the line has a settings list.
    pub settings: Option<&'a str>,
    /// Anything after the closing bracket (normally empty).
    pub trailing: &'a str,
}

/// Finds the settings list of a line: the first `[` outside quotes that
/// starts the line or follows whitespace, up to its matching `]`.
///
/// A `[` glued to the preceding text (`text[]`) is part of a type, not a
/// settings list.
pub fn split_settings_list(text: &str) -> Result<SettingsSplit<'_>, DslError> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if QUOTES.contains(&b) => quote = Some(b),
            None if b == b'[' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) => {
                let close = find_closing_bracket(bytes, i).ok_or(DslError::UnterminatedSettings)?;
                return Ok(SettingsSplit {
                    head: text[..i].trim_end(),
                    settings: Some(&text[i + 1..close]),
                    trailing: text[close + 1..].trim(),
                });
            }
            None => {}
        }
        i += 1;
    }
    Ok(SettingsSplit {
        head: text.trim_end(),
        settings: None,
        trailing: "",
    })
}

fn find_closing_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if QUOTES.contains(&b) => quote = Some(b),
            None if b == b'[' => depth += 1,
            None if b == b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            None => {}
        }
        i += 1;
    }
    None
}

/// Splits a settings list on top-level commas.
///
/// Quoted spans and parenthesized/bracketed groups are opaque, so
/// `note: 'a, b', default: coalesce(x, y)` yields two settings.
pub fn split_top_level(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if QUOTES.contains(&b) => quote = Some(b),
            None if b == b'(' || b == b'[' => depth += 1,
            None if b == b')' || b == b']' => depth = depth.saturating_sub(1),
            None if b == b',' && depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            None => {}
        }
        i += 1;
    }
    parts.push(&inner[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// The fixed setting vocabulary. Anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    PrimaryKey,
    NotNull,
    Null,
    Unique,
    Default,
    Note,
    Ref,
    Delete,
    Update,
    Other,
}

impl SettingKey {
    fn from_name(name: &str) -> Self {
        match name {
            "pk" | "primary key" => Self::PrimaryKey,
            "not null" => Self::NotNull,
            "null" => Self::Null,
            "unique" => Self::Unique,
            "default" => Self::Default,
            "note" => Self::Note,
            "ref" => Self::Ref,
            "delete" => Self::Delete,
            "update" => Self::Update,
            _ => Self::Other,
        }
    }
}

/// One `key` or `key: value` entry of a settings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: SettingKey,
    /// Lower-cased key with inner whitespace collapsed (`not null`).
    pub name: String,
    /// Value with outer quotes removed and escapes reversed.
    pub value: Option<String>,
}

/// Parses a single setting, splitting on its first colon only.
pub fn parse_setting(raw: &str) -> Setting {
    let (key_text, value) = match raw.split_once(':') {
        Some((k, v)) => (k, Some(unquote(v.trim()))),
        None => (raw, None),
    };
    let name = key_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    Setting {
        key: SettingKey::from_name(&name),
        name,
        value,
    }
}

/// Parses every setting of a settings list, in order.
pub fn parse_settings(inner: &str) -> Vec<Setting> {
    split_top_level(inner).into_iter().map(parse_setting).collect()
}

/// Returns true if `s` is wrapped in a matching pair of quote characters.
pub fn is_quoted(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && QUOTES.contains(&bytes[0]) && bytes[bytes.len() - 1] == bytes[0]
}

/// Removes one pair of matching outer quotes and reverses string escapes.
/// Unquoted text is returned as-is.
pub fn unquote(s: &str) -> String {
    if is_quoted(s) {
        unescape(&s[1..s.len() - 1])
    } else {
        s.to_string()
    }
}

/// Reverses [`escape`]: `\\`, `\'`, `\"`, `` \` ``, `\n`, `\r`. Any other
/// backslash sequence is kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some(q @ ('\\' | '\'' | '"' | '`')) => result.push(q),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Escapes `s` for embedding between two `quote` characters.
pub fn escape(s: &str, quote: char) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            c if c == quote => {
                result.push('\\');
                result.push(c);
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_column_with_settings() {
        let split = split_settings_list("id integer [pk, increment]").unwrap();
        assert_eq!(split.head, "id integer");
        assert_eq!(split.settings, Some("pk, increment"));
        assert_eq!(split.trailing, "");
    }

    #[test]
    fn split_without_settings() {
        let split = split_settings_list("name varchar(255)").unwrap();
        assert_eq!(split.head, "name varchar(255)");
        assert_eq!(split.settings, None);
    }

    #[test]
    fn glued_brackets_belong_to_the_type() {
        let split = split_settings_list("tags text[] [not null]").unwrap();
        assert_eq!(split.head, "tags text[]");
        assert_eq!(split.settings, Some("not null"));
    }

    #[test]
    fn brackets_inside_quotes_are_ignored() {
        let split = split_settings_list("\"a [b]\" text [note: 'x ] y']").unwrap();
        assert_eq!(split.head, "\"a [b]\" text");
        assert_eq!(split.settings, Some("note: 'x ] y'"));
    }

    #[test]
    fn trailing_text_is_reported() {
        let split = split_settings_list("id int [pk] extra").unwrap();
        assert_eq!(split.trailing, "extra");
    }

    #[test]
    fn unterminated_list() {
        assert_eq!(
            split_settings_list("id int [pk, unique"),
            Err(DslError::UnterminatedSettings)
        );
    }

    #[test]
    fn top_level_split_respects_quotes_and_parens() {
        let parts = split_top_level("note: 'a, b', default: coalesce(x, y), unique");
        assert_eq!(parts, vec!["note: 'a, b'", "default: coalesce(x, y)", "unique"]);
    }

    #[test]
    fn top_level_split_skips_empty_entries() {
        assert_eq!(split_top_level(" pk ,, unique, "), vec!["pk", "unique"]);
        assert!(split_top_level("   ").is_empty());
    }

    #[test]
    fn setting_keys_are_case_insensitive() {
        assert_eq!(parse_setting("PK").key, SettingKey::PrimaryKey);
        assert_eq!(parse_setting("Primary Key").key, SettingKey::PrimaryKey);
        assert_eq!(parse_setting("NOT   NULL").key, SettingKey::NotNull);
        assert_eq!(parse_setting("not null").name, "not null");
    }

    #[test]
    fn setting_value_splits_on_first_colon_only() {
        let s = parse_setting("note: 'time: 12:00'");
        assert_eq!(s.key, SettingKey::Note);
        assert_eq!(s.value.as_deref(), Some("time: 12:00"));
    }

    #[test]
    fn unknown_keys_are_other() {
        let s = parse_setting("headercolor: #3498DB");
        assert_eq!(s.key, SettingKey::Other);
        assert_eq!(s.name, "headercolor");
        assert_eq!(s.value.as_deref(), Some("#3498DB"));
    }

    #[test]
    fn flag_has_no_value() {
        let s = parse_setting("increment");
        assert_eq!(s.key, SettingKey::Other);
        assert_eq!(s.value, None);
    }

    #[test]
    fn inner_quotes_preserved() {
        assert_eq!(unquote(r#"'say "hi"'"#), r#"say "hi""#);
        assert_eq!(unquote("`now()`"), "now()");
        assert_eq!(unquote("42"), "42");
        assert_eq!(unquote("'"), "'");
    }

    #[test]
    fn escape_and_unescape_are_inverse() {
        for s in ["it's", "line1\nline2", "back\\slash", "cr\r\n", "plain", "\\'"] {
            assert_eq!(unescape(&escape(s, '\'')), s, "input {s:?}");
        }
    }

    #[test]
    fn escape_single_quotes_and_newlines() {
        assert_eq!(escape("it's\nnew", '\''), "it\\'s\\nnew");
        assert_eq!(escape("say \"x\"", '"'), "say \\\"x\\\"");
    }

    #[test]
    fn unescape_keeps_unknown_sequences() {
        assert_eq!(unescape("a\\tb"), "a\\tb");
        assert_eq!(unescape("end\\"), "end\\");
    }
}
