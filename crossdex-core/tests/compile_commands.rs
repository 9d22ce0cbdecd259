use crossdex_core::parse_compilation_database;
use crossdex_core::types::{tokenize_command_line, CompileCommand};

#[test]
fn parses_a_compile_commands_document() {
    let doc = r#"[
  {
    "directory": "/proj/build",
    "file": "src/main.cc",
    "command": "clang++ -Iinclude -c src/main.cc",
    "output": "CMakeFiles/main.o"
  },
  {
    "directory": "/proj/build",
    "file": "src/util.cc",
    "arguments": ["clang++", "-c", "src/util.cc"]
  }
]"#;

    let db = parse_compilation_database(doc).unwrap();

    assert_eq!(db.len(), 2);
    assert_eq!(db[0].directory, "/proj/build");
    assert_eq!(db[0].file, "src/main.cc");
    assert_eq!(db[0].output.as_deref(), Some("CMakeFiles/main.o"));
    assert_eq!(db[1].command, None);
    assert_eq!(db[1].arguments.as_ref().map(Vec::len), Some(3));
}

#[test]
fn non_array_document_is_rejected() {
    assert!(parse_compilation_database("{}").is_err());
    assert!(parse_compilation_database("not json at all").is_err());
}

#[test]
fn record_missing_required_keys_is_rejected() {
    let doc = r#"[{ "file": "a.cc" }]"#;

    assert!(parse_compilation_database(doc).is_err());
}

fn record(command: Option<&str>, arguments: Option<&[&str]>) -> CompileCommand {
    CompileCommand {
        directory: "/proj/build".to_string(),
        file: "src/main.cc".to_string(),
        command: command.map(str::to_string),
        arguments: arguments.map(|args| args.iter().map(|a| a.to_string()).collect()),
        output: None,
    }
}

#[test]
fn presplit_arguments_win_over_the_command_string() {
    let rec = record(
        Some("clang++ -DIGNORED -c src/main.cc"),
        Some(&["clang++", "-c", "src/main.cc"]),
    );

    assert_eq!(rec.argv(), vec!["clang++", "-c", "src/main.cc"]);
}

#[test]
fn command_string_is_tokenized_when_arguments_are_absent() {
    let rec = record(Some("clang++ -Iinclude -c src/main.cc"), None);

    assert_eq!(rec.argv(), vec!["clang++", "-Iinclude", "-c", "src/main.cc"]);
}

#[test]
fn record_with_neither_command_nor_arguments_has_empty_argv() {
    let rec = record(None, None);

    assert!(rec.argv().is_empty());
}

#[test]
fn tokenizer_collapses_whitespace_runs() {
    let tokens = tokenize_command_line("  cc   -c \t a.cc  ");

    assert_eq!(tokens, vec!["cc", "-c", "a.cc"]);
}

#[test]
fn tokenizer_unescapes_quoted_macro_values() {
    let tokens = tokenize_command_line(r#"cc -DVERSION=\"1.2\" -c a.cc"#);

    assert_eq!(tokens, vec!["cc", r#"-DVERSION="1.2""#, "-c", "a.cc"]);
}

#[test]
fn tokenizer_erases_doubled_quotes() {
    let tokens = tokenize_command_line(r#"cc -DEMPTY="" -c a.cc"#);

    assert_eq!(tokens, vec!["cc", "-DEMPTY=", "-c", "a.cc"]);
}

#[test]
fn tokenizer_reduces_escaped_empty_strings() {
    let tokens = tokenize_command_line(r#"cc -DFOO=\"\" -c a.cc"#);

    assert_eq!(tokens, vec!["cc", "-DFOO=", "-c", "a.cc"]);
}
