use std::path::PathBuf;

use crossdex_core::{parse_config_str, ConfigError, DocumentFormat, ProjectConfig};

fn complete() -> ProjectConfig {
    ProjectConfig {
        kythe_path: Some("/opt/kythe".into()),
        project_root: Some("/proj".into()),
        compilation_database: Some("/proj/compile_commands.json".into()),
        output_directory: Some("/proj-index".into()),
        subtree: None,
        parallel: Some(2),
        listen_address: None,
    }
}

#[test]
fn full_json_config_resolves() {
    let doc = r#"{
  "kythe_path": "/opt/kythe",
  "project_root": "/home/dev/widget",
  "compilation_database": "/home/dev/widget/compile_commands.json",
  "output_directory": "/home/dev/widget-index",
  "subtree": "src/",
  "parallel": 4,
  "listen_address": "0.0.0.0:9000"
}"#;

    let parsed = parse_config_str(doc, DocumentFormat::Json).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);

    let resolved = parsed.config.resolve().unwrap();
    assert_eq!(resolved.project_root, PathBuf::from("/home/dev/widget"));
    assert_eq!(resolved.subtree, "src/");
    assert_eq!(resolved.parallel, 4);
    assert_eq!(resolved.listen_address, "0.0.0.0:9000");
}

#[test]
fn full_yaml_config_resolves() {
    let doc = r#"
kythe_path: /opt/kythe
project_root: /home/dev/widget
compilation_database: /home/dev/widget/compile_commands.json
output_directory: /home/dev/widget-index
subtree: src/
parallel: 4
listen_address: 0.0.0.0:9000
"#;

    let parsed = parse_config_str(doc, DocumentFormat::Yaml).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);

    let resolved = parsed.config.resolve().unwrap();
    assert_eq!(resolved.parallel, 4);
    assert_eq!(resolved.listen_address, "0.0.0.0:9000");
}

#[test]
fn auto_detection_reports_the_format_that_parsed() {
    let json = r#"{ "subtree": "src/" }"#;
    let yaml = "subtree: src/\n";

    assert_eq!(
        parse_config_str(json, DocumentFormat::Auto).unwrap().format,
        DocumentFormat::Json
    );
    assert_eq!(
        parse_config_str(yaml, DocumentFormat::Auto).unwrap().format,
        DocumentFormat::Yaml
    );
}

#[test]
fn auto_detection_falls_back_to_yaml_for_braced_non_json() {
    // YAML flow mapping: starts with a brace but the unquoted key is not JSON.
    let doc = "{kythe_path: /opt/kythe}";

    let parsed = parse_config_str(doc, DocumentFormat::Auto).unwrap();

    assert_eq!(parsed.format, DocumentFormat::Yaml);
    assert_eq!(parsed.config.kythe_path, Some(PathBuf::from("/opt/kythe")));
}

#[test]
fn malformed_documents_are_parse_errors() {
    assert!(parse_config_str("{ nope", DocumentFormat::Json).is_err());
    assert!(parse_config_str("key: [unclosed", DocumentFormat::Yaml).is_err());
    assert!(parse_config_str("%%%%", DocumentFormat::Auto).is_err());
}

#[test]
fn empty_document_parses_but_does_not_resolve() {
    let parsed = parse_config_str("{}", DocumentFormat::Auto).unwrap();

    assert_eq!(parsed.config, ProjectConfig::default());
    assert!(parsed.config.resolve().is_err());
}

fn missing_field_of(mutate: impl FnOnce(&mut ProjectConfig)) -> &'static str {
    let mut config = complete();
    mutate(&mut config);
    match config.resolve() {
        Err(ConfigError::MissingField { field }) => field,
        other => panic!("expected missing-field error, got: {other:?}"),
    }
}

#[test]
fn missing_required_fields_are_reported_by_name() {
    assert_eq!(missing_field_of(|c| c.kythe_path = None), "kythe_path");
    assert_eq!(missing_field_of(|c| c.project_root = None), "project_root");
    assert_eq!(
        missing_field_of(|c| c.compilation_database = None),
        "compilation_database"
    );
    assert_eq!(
        missing_field_of(|c| c.output_directory = None),
        "output_directory"
    );
}

#[test]
fn zero_workers_is_rejected() {
    let mut config = complete();
    config.parallel = Some(0);

    match config.resolve() {
        Err(ConfigError::InvalidField { field, .. }) => assert_eq!(field, "parallel"),
        other => panic!("expected invalid-field error, got: {other:?}"),
    }
}

#[test]
fn empty_listen_address_is_rejected() {
    let mut config = complete();
    config.listen_address = Some(String::new());

    match config.resolve() {
        Err(ConfigError::InvalidField { field, .. }) => assert_eq!(field, "listen_address"),
        other => panic!("expected invalid-field error, got: {other:?}"),
    }
}

#[test]
fn optional_fields_fall_back_to_defaults() {
    let mut config = complete();
    config.parallel = None;

    let resolved = config.resolve().unwrap();

    assert_eq!(resolved.subtree, "");
    assert!(resolved.parallel >= 1);
    assert_eq!(resolved.listen_address, "localhost:8080");
}

#[test]
fn tool_and_output_paths_are_derived_from_the_roots() {
    let resolved = complete().resolve().unwrap();

    assert_eq!(
        resolved.tools.extractor,
        PathBuf::from("/opt/kythe/extractors/cxx_extractor")
    );
    assert_eq!(
        resolved.tools.indexer,
        PathBuf::from("/opt/kythe/indexers/cxx_indexer")
    );
    assert_eq!(
        resolved.tools.write_entries,
        PathBuf::from("/opt/kythe/tools/write_entries")
    );
    assert_eq!(
        resolved.tools.write_tables,
        PathBuf::from("/opt/kythe/tools/write_tables")
    );
    assert_eq!(
        resolved.tools.http_server,
        PathBuf::from("/opt/kythe/tools/http_server")
    );
    assert_eq!(resolved.tools.web_ui, PathBuf::from("/opt/kythe/web/ui"));

    assert_eq!(resolved.output.root, PathBuf::from("/proj-index"));
    assert_eq!(resolved.output.kzips, PathBuf::from("/proj-index/kzips"));
    assert_eq!(
        resolved.output.graphstore,
        PathBuf::from("/proj-index/graphstore")
    );
    assert_eq!(resolved.output.serving, PathBuf::from("/proj-index/serving"));
}
