use std::path::Path;

use crossdex_core::{parse_compilation_database, parse_config_str, DocumentFormat, ResolvedConfig};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct Check {
    name: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct DoctorResult {
    checks: Vec<Check>,
    all_passed: bool,
}

pub async fn doctor_cmd(path: &Path, output: OutputArgs) -> i32 {
    let mut checks = Vec::new();

    let config = check_config(path, &mut checks);
    if let Some(config) = &config {
        check_tools(config, &mut checks);
        checks.push(check_database(config));
        checks.push(check_output(config));
        checks.push(check_listen_address(config));
    }

    let all_passed = checks.iter().all(|c| c.status == "ok");
    let result = DoctorResult { checks, all_passed };

    if output.format == OutputFormat::Text && !output.quiet {
        println!("Environment checks:");
        for c in &result.checks {
            let icon = if c.status == "ok" { "✓" } else { "✗" };
            print!("  {} {}: {}", icon, c.name, c.status);
            if let Some(msg) = &c.message {
                print!(" - {msg}");
            }
            println!();
        }
        if result.all_passed {
            println!("\nAll checks passed.");
        } else {
            println!("\nSome checks failed.");
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if all_passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUNTIME_ERROR
    }
}

fn check_config(path: &Path, checks: &mut Vec<Check>) -> Option<ResolvedConfig> {
    let fail = |checks: &mut Vec<Check>, message: String| {
        checks.push(Check {
            name: "config".to_string(),
            status: "error".to_string(),
            message: Some(message),
        });
        None
    };

    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => return fail(checks, format!("failed to read {}: {e}", path.display())),
    };
    let parsed = match parse_config_str(&content, DocumentFormat::Auto) {
        Ok(p) => p,
        Err(e) => return fail(checks, e.to_string()),
    };
    match parsed.config.resolve() {
        Ok(config) => {
            checks.push(Check {
                name: "config".to_string(),
                status: "ok".to_string(),
                message: Some(format!("{} ({:?})", path.display(), parsed.format)),
            });
            Some(config)
        }
        Err(e) => fail(checks, e.to_string()),
    }
}

fn check_tools(config: &ResolvedConfig, checks: &mut Vec<Check>) {
    let tools = [
        ("extractor", &config.tools.extractor),
        ("indexer", &config.tools.indexer),
        ("write_entries", &config.tools.write_entries),
        ("write_tables", &config.tools.write_tables),
        ("http_server", &config.tools.http_server),
    ];
    for (name, path) in tools {
        let check = if path.is_file() {
            Check {
                name: name.to_string(),
                status: "ok".to_string(),
                message: Some(path.display().to_string()),
            }
        } else {
            Check {
                name: name.to_string(),
                status: "error".to_string(),
                message: Some(format!("not found at {}", path.display())),
            }
        };
        checks.push(check);
    }

    let web_ui = &config.tools.web_ui;
    checks.push(if web_ui.is_dir() {
        Check {
            name: "web_ui".to_string(),
            status: "ok".to_string(),
            message: Some(web_ui.display().to_string()),
        }
    } else {
        Check {
            name: "web_ui".to_string(),
            status: "warning".to_string(),
            message: Some(format!(
                "no UI assets at {} (the server will have no UI)",
                web_ui.display()
            )),
        }
    });
}

fn check_database(config: &ResolvedConfig) -> Check {
    let path = &config.compilation_database;
    let content = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) => {
            return Check {
                name: "database".to_string(),
                status: "error".to_string(),
                message: Some(format!("failed to read {}: {e}", path.display())),
            }
        }
    };
    match parse_compilation_database(&content) {
        Ok(db) => Check {
            name: "database".to_string(),
            status: "ok".to_string(),
            message: Some(format!("{} records", db.len())),
        },
        Err(e) => Check {
            name: "database".to_string(),
            status: "error".to_string(),
            message: Some(format!("failed to parse {}: {e}", path.display())),
        },
    }
}

fn check_output(config: &ResolvedConfig) -> Check {
    let root = &config.output.root;
    if root.exists() && !root.is_dir() {
        Check {
            name: "output".to_string(),
            status: "error".to_string(),
            message: Some(format!("{} exists but is not a directory", root.display())),
        }
    } else if root.is_dir() {
        Check {
            name: "output".to_string(),
            status: "ok".to_string(),
            message: Some(format!(
                "{} exists (run prompts before deleting)",
                root.display()
            )),
        }
    } else {
        Check {
            name: "output".to_string(),
            status: "ok".to_string(),
            message: Some(format!("{} will be created", root.display())),
        }
    }
}

fn check_listen_address(config: &ResolvedConfig) -> Check {
    let addr = &config.listen_address;
    let well_formed = match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    };
    if well_formed {
        Check {
            name: "listen_address".to_string(),
            status: "ok".to_string(),
            message: Some(addr.clone()),
        }
    } else {
        Check {
            name: "listen_address".to_string(),
            status: "error".to_string(),
            message: Some(format!("{addr} is not host:port")),
        }
    }
}
