use dbml_forge_core::types::{DiagnosticKind, PropertyValue, ReferentialAction, RelationKind};
use dbml_forge_dsl::{generate, parse, GenerateOptions};

const BLOG: &str = r#"
// Blog schema
Project blog {
  database_type: 'PostgreSQL'
  Note: 'demo project'
}

Enum post_status {
  draft
  published
}

Table users as U {
  id integer [pk, increment]
  email varchar(255) [unique, not null]
  "display name" varchar(100) [note: 'shown in the UI']
  created_at timestamp [default: `now()`]
  Note: 'Registered accounts'
}

Table posts.blog [headercolor: #3498db] {
  id integer [primary key]
  author_id integer [ref: > users.id]
  title "character varying" [not null]
  body text
  status post_status [default: 'draft']
  tags text[]
  price decimal(10, 2) [default: 0]

  indexes {
    (author_id, status)
    title [unique]
  }
}

Table comments {
  id integer [pk]
  post_id integer
  user_id integer
}

Ref fk_comment_post: comments.post_id > posts.blog.id [delete: cascade, update: no action]
Ref: comments.user_id > users.id
"#;

#[test]
fn parse_blog_schema() {
    let result = parse(BLOG);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);

    let schema = &result.schema;
    assert_eq!(schema.table_names(), vec!["users", "posts.blog", "comments"]);
    assert_eq!(schema.column_count(), 4 + 7 + 3);
    assert_eq!(schema.references.len(), 3);

    let users = &schema.tables[0];
    assert_eq!(users.alias.as_ref().map(|a| a.as_str()), Some("U"));
    assert_eq!(users.note.as_deref(), Some("Registered accounts"));
    assert_eq!(users.columns[2].name, "display name");
    assert_eq!(users.columns[2].note.as_deref(), Some("shown in the UI"));
    assert_eq!(users.columns[3].default.as_deref(), Some("now()"));

    let posts = &schema.tables[1];
    assert_eq!(posts.schema.as_ref().map(|s| s.as_str()), Some("blog"));
    assert_eq!(
        posts.custom_properties.get("headercolor"),
        Some(&PropertyValue::Text("#3498db".into()))
    );
    assert!(posts.columns[0].primary_key);
    assert!(posts.columns[1].foreign_key);
    assert_eq!(posts.columns[2].column_type, "character varying");
    assert_eq!(posts.columns[4].default.as_deref(), Some("draft"));
    assert_eq!(posts.columns[5].column_type, "text[]");
    assert_eq!(posts.columns[6].column_type, "decimal(10, 2)");

    let named = &schema.references[1];
    assert_eq!(named.name.as_deref(), Some("fk_comment_post"));
    assert_eq!(named.to_schema.as_deref(), Some("blog"));
    assert_eq!(named.to_table, "posts");
    assert_eq!(named.on_delete, Some(ReferentialAction::Cascade));
    assert_eq!(named.on_update, Some(ReferentialAction::NoAction));
}

#[test]
fn blog_schema_warnings() {
    let result = parse(BLOG);
    let kinds: Vec<_> = result.warnings.iter().map(|w| (w.line, w.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (3, DiagnosticKind::UnsupportedConstruct),
            (8, DiagnosticKind::UnsupportedConstruct),
            (14, DiagnosticKind::UnknownSetting),
            (21, DiagnosticKind::UnknownSetting),
            (30, DiagnosticKind::UnsupportedConstruct),
        ]
    );
    assert_eq!(
        result.metadata.features_used,
        vec![
            "projects",
            "enums",
            "tables",
            "custom_properties",
            "notes",
            "schemas",
            "inline_references",
            "indexes",
            "references",
        ]
    );
}

#[test]
fn users_and_posts_scenario() {
    let source = "Table users {\n  id integer [pk]\n}\nTable posts {\n  id integer [pk]\n  user_id integer\n}\nRef: posts.user_id > users.id";
    let result = parse(source);
    assert!(result.errors.is_empty());
    assert_eq!(result.schema.tables.len(), 2);

    let reference = &result.schema.references[0];
    assert_eq!(reference.from_table, "posts");
    assert_eq!(reference.from_column, "user_id");
    assert_eq!(reference.to_table, "users");
    assert_eq!(reference.to_column, "id");
    assert_eq!(reference.kind, RelationKind::OneToMany);
    assert!(result.schema.tables[1].columns[1].foreign_key);
}

#[test]
fn invalid_table_name_scenario() {
    let result = parse("Table 1bad {\n  id integer\n}\nTable good {\n  id integer\n}");
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.line, 1);
    assert_eq!(error.kind, DiagnosticKind::Semantic);
    assert!(error.message.contains("1bad"));
    assert_eq!(error.suggestion.as_deref(), Some("Rename to '_1bad'."));
    assert_eq!(result.schema.table_names(), vec!["good"]);
}

#[test]
fn invalid_identifiers_yield_one_error_each() {
    let result = parse("Table 9s.ok {\n id int\n}\nTable t {\n bad-name int\n}");
    let messages: Vec<_> = result.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Invalid schema name: 9s", "Invalid column name: bad-name"]
    );
    assert!(result
        .errors
        .iter()
        .all(|e| e.kind == DiagnosticKind::Semantic));
}

#[test]
fn duplicate_table_keeps_the_first() {
    let result = parse("Table a {\n x int\n}\nTable a {\n y int\n}");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 4);
    assert_eq!(result.errors[0].kind, DiagnosticKind::Semantic);
    assert_eq!(result.schema.tables.len(), 1);
    assert_eq!(result.schema.tables[0].columns[0].name, "x");
}

#[test]
fn reference_to_later_table_is_rejected() {
    let result = parse("Table a {\n x int\n}\nRef: a.x > b.y\nTable b {\n y int\n}");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].message, "Referenced table not found: b");
    assert!(result.schema.references.is_empty());
    assert_eq!(result.schema.tables.len(), 2);
}

#[test]
fn reference_to_missing_table_is_rejected() {
    let result = parse("Table a {\n x int\n}\nRef: a.x > b.y");
    assert_eq!(result.errors[0].message, "Referenced table not found: b");
    assert!(result.schema.references.is_empty());
}

#[test]
fn relation_symbols_map_to_kinds() {
    let cases = [
        ("-", RelationKind::OneToOne),
        (">", RelationKind::OneToMany),
        ("<", RelationKind::ManyToOne),
        ("<>", RelationKind::ManyToMany),
    ];
    for (symbol, kind) in cases {
        let source = format!("Table a {{\n x int\n}}\nTable b {{\n y int\n}}\nRef: a.x {symbol} b.y");
        let result = parse(&source);
        assert!(result.errors.is_empty(), "{symbol}: {:?}", result.errors);
        assert_eq!(result.schema.references[0].kind, kind, "symbol {symbol}");
    }
}

#[test]
fn now_default_round_trips_as_quoted_string() {
    let result = parse("Table a {\n created_at timestamp [default: `now()`]\n}");
    let text = generate(&result.schema, &GenerateOptions::default()).text;
    assert!(text.contains("default: 'now()'"), "{text}");

    let reparsed = parse(&text);
    assert_eq!(
        reparsed.schema.tables[0].columns[0].default.as_deref(),
        Some("now()")
    );
}

#[test]
fn colons_and_commas_inside_quoted_values() {
    let result = parse("Table a {\n url text [note: 'see http://x.io, page 2', default: 'a:b']\n}");
    assert!(result.errors.is_empty());
    let column = &result.schema.tables[0].columns[0];
    assert_eq!(column.note.as_deref(), Some("see http://x.io, page 2"));
    assert_eq!(column.default.as_deref(), Some("a:b"));
}

#[test]
fn settings_keys_are_case_insensitive() {
    let result = parse("Table a {\n id int [PK, Not Null, UNIQUE]\n}");
    let column = &result.schema.tables[0].columns[0];
    assert!(column.primary_key && column.not_null && column.unique);
    assert!(result.warnings.is_empty());
}

#[test]
fn unterminated_settings_list() {
    let result = parse("Table a {\n id int [pk\n name text\n}");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, DiagnosticKind::Structural);
    assert_eq!(result.schema.tables[0].columns.len(), 1);
}

#[test]
fn keywords_are_case_insensitive() {
    let result = parse("TABLE a {\n id int\n}\ntable b {\n a_id int\n}\nref: b.a_id > a.id");
    assert!(result.errors.is_empty());
    assert_eq!(result.schema.tables.len(), 2);
    assert_eq!(result.schema.references.len(), 1);
}

#[test]
fn each_parse_is_independent() {
    let first = parse("Table a {\n id int\n}");
    let second = parse("Table b {\n id int\n}");
    assert_eq!(first.schema.tables[0].id, second.schema.tables[0].id);
    assert_eq!(second.schema.table_names(), vec!["b"]);
}

#[test]
fn parse_result_serializes_camel_case() {
    let result = parse("Table a {\n id int [pk]\n}");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["schema"]["tables"][0]["columns"][0]["primaryKey"], true);
    assert_eq!(json["metadata"]["linesProcessed"], 3);
    assert!(json["errors"].as_array().unwrap().is_empty());
}
