use std::path::Path;

use crossdex_core::ResolvedConfig;
use crossdex_exec::driver;

use crate::exit_codes;
use crate::output::{print_error, OutputFormat};
use crate::OutputArgs;

pub async fn serve_cmd(path: &Path, output: OutputArgs) -> i32 {
    let config = match super::config::load_config(path, &output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if !config.output.serving.is_dir() {
        print_error(
            output.format,
            output.quiet,
            &format!(
                "no serving tables at {}; run `crossdex run` first",
                config.output.serving.display()
            ),
        );
        return exit_codes::RUNTIME_ERROR;
    }

    serve_and_wait(&config, &output).await
}

/// Spawns the external query server in the foreground and waits for it to
/// exit. The child inherits stdio so its own logging stays visible.
pub async fn serve_and_wait(config: &ResolvedConfig, output: &OutputArgs) -> i32 {
    let invocation = driver::serve_invocation(config);
    if output.format == OutputFormat::Text && !output.quiet {
        println!(
            "Serving cross-references at http://{} (Ctrl-C to stop)",
            config.listen_address
        );
    }

    let status = match tokio::process::Command::new(&invocation.program)
        .args(&invocation.args)
        .status()
        .await
    {
        Ok(status) => status,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to start {}: {e}", invocation.program.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if status.success() {
        exit_codes::SUCCESS
    } else {
        print_error(
            output.format,
            output.quiet,
            &format!("server exited with {status}"),
        );
        exit_codes::RUNTIME_ERROR
    }
}
