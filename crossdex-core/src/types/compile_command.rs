/// One record of a `compile_commands.json` database.
///
/// Either `command` (a single shell-style string) or `arguments` (a pre-split
/// argv array) is present; `arguments` wins when both are.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompileCommand {
    /// Working directory of the compilation. Relative paths inside the
    /// command are meaningful only from here.
    pub directory: String,

    /// The main translation unit this record compiles.
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl CompileCommand {
    /// The full compiler argv for this record, compiler name included at
    /// index 0. Pre-split `arguments` are returned verbatim; a `command`
    /// string is tokenized with [`tokenize_command_line`].
    pub fn argv(&self) -> Vec<String> {
        if let Some(args) = &self.arguments {
            return args.clone();
        }
        match &self.command {
            Some(cmd) => tokenize_command_line(cmd),
            None => Vec::new(),
        }
    }
}

/// An ordered compilation database. Record order is preserved from the file;
/// selection and scheduling both depend on it.
pub type CompilationDatabase = Vec<CompileCommand>;

/// Splits a compilation-database `command` string into argv tokens.
///
/// Build systems emit these with escaped quotes (`\"`) around macro values
/// and occasionally doubled quotes for empty strings. The transform is:
/// trim, unescape `\"` to `"`, erase `""`, then split on whitespace. Runs of
/// whitespace never produce empty tokens.
///
/// This is intentionally not a shell parser. Records that need full quoting
/// fidelity should carry an `arguments` array instead.
pub fn tokenize_command_line(command: &str) -> Vec<String> {
    command
        .trim()
        .replace("\\\"", "\"")
        .replace("\"\"", "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
