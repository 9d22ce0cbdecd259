mod compile_command;

pub use compile_command::{tokenize_command_line, CompilationDatabase, CompileCommand};
