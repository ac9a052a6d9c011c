use dbml_forge_dsl::{generate, parse, validate_round_trip, GenerateOptions};

/// Helper: parse source, generate it, parse again, and compare the two
/// schemas column by column.
///
/// Entity ids are sequential per parse, so they line up as long as the
/// declaration order is preserved.
fn assert_round_trip(source: &str) {
    let first = parse(source);
    assert!(first.errors.is_empty(), "first parse failed: {:?}", first.errors);

    let generated = generate(&first.schema, &GenerateOptions::default());
    assert!(generated.success, "generation failed: {:?}", generated.errors);

    let second = parse(&generated.text);
    assert!(
        second.errors.is_empty(),
        "second parse (after generating) failed with errors: {:?}\n\nGenerated text:\n{}",
        second.errors,
        generated.text
    );

    assert_eq!(first.schema.table_names(), second.schema.table_names());
    for (t1, t2) in first.schema.tables.iter().zip(&second.schema.tables) {
        assert_eq!(t1.alias, t2.alias, "alias mismatch for {}", t1.name);
        assert_eq!(t1.note, t2.note, "note mismatch for {}", t1.name);
        assert_eq!(
            t1.custom_properties, t2.custom_properties,
            "custom property mismatch for {}",
            t1.name
        );
        assert_eq!(
            t1.columns, t2.columns,
            "column mismatch in table '{}'\n\nGenerated text:\n{}",
            t1.name, generated.text
        );
    }
    assert_eq!(first.schema.references, second.schema.references);
}

#[test]
fn round_trip_minimal() {
    assert_round_trip("Table a {\n id int\n}");
}

#[test]
fn round_trip_column_settings() {
    assert_round_trip(
        r#"
Table users {
  id integer [pk, increment]
  email varchar(255) [not null, unique]
  bio text [note: 'shown on the profile page']
  score decimal(10, 2) [default: 0.5]
  created_at timestamp [default: `now()`]
  status varchar [default: 'active', note: 'one of: active, banned']
  "display name" text
}
"#,
    );
}

#[test]
fn round_trip_escaped_note() {
    assert_round_trip(r"Table a {
  id int [note: 'it\'s a \\path\\ with\nnewline']
  Note: 'table \'note\''
}");
}

#[test]
fn multi_line_note_is_restored() {
    let first = parse(r"Table a {
  id int [note: 'first\nsecond']
}");
    let note = first.schema.tables[0].columns[0].note.clone();
    assert_eq!(note.as_deref(), Some("first\nsecond"));

    let text = generate(&first.schema, &GenerateOptions::default()).text;
    assert!(text.contains(r"note: 'first\nsecond'"));
    assert_eq!(parse(&text).schema.tables[0].columns[0].note, note);
}

#[test]
fn round_trip_references() {
    assert_round_trip(
        r#"
Table users {
  id integer [pk]
}

Table posts {
  id integer [pk]
  author_id integer [ref: > users.id]
  editor_id integer
}

Table tags {
  id integer [pk]
}

Ref editor: posts.editor_id > users.id [delete: set null]
Ref: posts.id <> tags.id
Ref: users.id - posts.id
"#,
    );
}

#[test]
fn round_trip_schemas_and_aliases() {
    assert_round_trip(
        r#"
Table users.auth as U [headercolor: #3498db] {
  id integer [pk]
  Note: 'Accounts'
}

Table posts.blog {
  id integer [pk]
  author_id integer [ref: > users.auth.id]
}

Ref: posts.blog.id < users.auth.id
"#,
    );
}

#[test]
fn round_trip_types() {
    assert_round_trip(
        r#"
Table t {
  a "timestamp with time zone"
  b text[]
  c numeric(12, 4)
  d varchar(100)
}
"#,
    );
}

#[test]
fn unmodeled_constructs_are_dropped_on_generate() {
    let source = "Enum s {\n a\n}\nTable t {\n id int\n indexes {\n  id\n }\n}";
    let first = parse(source);
    let text = generate(&first.schema, &GenerateOptions::default()).text;
    assert_eq!(text, "Table t {\n  id int\n}\n");
}

#[test]
fn generation_is_stable_under_a_second_pass() {
    let source = r#"
Table users {
  id integer [pk]
}
Table posts {
  id integer [pk]
  user_id integer [ref: > users.id]
}
Ref: posts.id - users.id
"#;
    let options = GenerateOptions::default();
    let once = generate(&parse(source).schema, &options).text;
    let twice = generate(&parse(&once).schema, &options).text;
    assert_eq!(once, twice);
}

#[test]
fn round_trip_with_comments_and_metadata() {
    let schema = parse("Table a {\n id int\n}\nTable b {\n a_id int\n}\nRef: b.a_id > a.id").schema;
    let options = GenerateOptions {
        include_comments: true,
        include_metadata: true,
        ..GenerateOptions::default()
    };
    let report = validate_round_trip(&schema, &options);
    assert!(report.passed(), "{:?}", report.mismatches);
    assert!(report.generated.contains("// References"));
}

#[test]
fn round_trip_compact_output() {
    let schema = parse("Table a {\n id int [pk]\n}\nTable b {\n a_id int [ref: > a.id]\n}").schema;
    let options = GenerateOptions {
        format_output: false,
        ..GenerateOptions::default()
    };
    let report = validate_round_trip(&schema, &options);
    assert!(report.passed(), "{:?}", report.mismatches);
}
