use std::path::Path;

use tempfile::TempDir;

use crossdex_core::config::{ProjectConfig, ResolvedConfig};
use crossdex_core::types::CompileCommand;
use crossdex_exec::driver::{
    build_stages, extract_invocation, serve_invocation, KzipQueueSource,
};
use crossdex_exec::executor::{EnvMode, QueueSource, StageError, WorkKind};

fn resolved(root: &Path) -> ResolvedConfig {
    ProjectConfig {
        kythe_path: Some(root.join("kythe")),
        project_root: Some(root.join("src")),
        compilation_database: Some(root.join("compile_commands.json")),
        output_directory: Some(root.join("out")),
        subtree: None,
        parallel: Some(2),
        listen_address: None,
    }
    .resolve()
    .unwrap()
}

fn record(file: &str, directory: &str, command: &str) -> CompileCommand {
    CompileCommand {
        directory: directory.to_string(),
        file: file.to_string(),
        command: Some(command.to_string()),
        arguments: None,
        output: None,
    }
}

#[test]
fn stages_come_in_pipeline_order_with_their_scratch_dirs() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());

    let stages = build_stages(&config, &[record("a.cc", "/proj", "cc -c a.cc")]);

    let names: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["extract", "index", "tables"]);
    assert_eq!(stages[0].scratch_dir.as_deref(), Some(config.output.kzips.as_path()));
    assert_eq!(
        stages[1].scratch_dir.as_deref(),
        Some(config.output.graphstore.as_path())
    );
    assert_eq!(
        stages[2].scratch_dir.as_deref(),
        Some(config.output.serving.as_path())
    );
}

#[tokio::test]
async fn extract_stage_has_one_item_per_selected_record() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());
    let selected = vec![
        record("a.cc", "/proj", "cc -c a.cc"),
        record("b.cc", "/proj", "cc -c b.cc"),
    ];

    let stages = build_stages(&config, &selected);
    let items = stages[0].queue.build().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "a.cc");
    assert_eq!(items[1].label, "b.cc");
}

#[test]
fn extractor_gets_compiler_args_cwd_and_env_contract() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());
    let rec = record(
        "src/widget.cc",
        "/proj/build",
        "clang++ -Iinclude -DNDEBUG -c src/widget.cc",
    );

    let invocation = extract_invocation(&config, &rec);

    assert_eq!(invocation.label, "src/widget.cc");
    assert_eq!(invocation.program, config.tools.extractor);
    // The compiler itself is dropped; the extractor replaces it.
    assert_eq!(
        invocation.args,
        vec!["-Iinclude", "-DNDEBUG", "-c", "src/widget.cc"]
    );
    assert_eq!(invocation.cwd.as_deref(), Some(Path::new("/proj/build")));
    assert_eq!(invocation.env_mode, EnvMode::Inherit);
    assert_eq!(
        invocation.env.get("KYTHE_ROOT_DIRECTORY"),
        Some(&config.project_root.display().to_string())
    );
    assert_eq!(
        invocation.env.get("KYTHE_OUTPUT_DIRECTORY"),
        Some(&config.output.kzips.display().to_string())
    );
}

#[tokio::test]
async fn kzip_queue_lists_archives_sorted_and_ignores_other_files() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());
    std::fs::create_dir_all(&config.output.kzips).unwrap();
    std::fs::write(config.output.kzips.join("b.kzip"), b"").unwrap();
    std::fs::write(config.output.kzips.join("a.kzip"), b"").unwrap();
    std::fs::write(config.output.kzips.join("notes.txt"), b"").unwrap();

    let items = KzipQueueSource::from_config(&config).build().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "a.kzip");
    assert_eq!(items[1].label, "b.kzip");

    match &items[0].kind {
        WorkKind::Piped { producer, consumer } => {
            assert_eq!(producer.program, config.tools.indexer);
            assert_eq!(
                producer.args,
                vec![config.output.kzips.join("a.kzip").display().to_string()]
            );
            assert_eq!(consumer.program, config.tools.write_entries);
            assert_eq!(
                consumer.args,
                vec![
                    "--graphstore".to_string(),
                    config.output.graphstore.display().to_string()
                ]
            );
        }
        other => panic!("expected piped item, got: {other:?}"),
    }
}

#[tokio::test]
async fn kzip_queue_fails_when_the_archive_dir_is_missing() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());

    let result = KzipQueueSource::from_config(&config).build().await;

    assert!(matches!(result, Err(StageError::Io { .. })));
}

#[tokio::test]
async fn tables_stage_is_one_invocation_over_the_graphstore() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());

    let stages = build_stages(&config, &[]);
    let items = stages[2].queue.build().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "write_tables");
    match &items[0].kind {
        WorkKind::Single(invocation) => {
            assert_eq!(invocation.program, config.tools.write_tables);
            assert_eq!(
                invocation.args,
                vec![
                    "--graphstore".to_string(),
                    config.output.graphstore.display().to_string(),
                    "--out".to_string(),
                    config.output.serving.display().to_string(),
                    "--num_workers".to_string(),
                    "2".to_string(),
                ]
            );
        }
        other => panic!("expected single item, got: {other:?}"),
    }
}

#[test]
fn server_is_pointed_at_the_serving_tables() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());

    let invocation = serve_invocation(&config);

    assert_eq!(invocation.program, config.tools.http_server);
    assert_eq!(
        invocation.args,
        vec![
            "--public_resources".to_string(),
            config.tools.web_ui.display().to_string(),
            "--listen".to_string(),
            "localhost:8080".to_string(),
            "--serving_table".to_string(),
            config.output.serving.display().to_string(),
        ]
    );
}
