//! cfglang: a small declarative configuration language.
//!
//! Source text is tokenized, parsed into an AST, compiled to a flat list of
//! bytecode instructions and evaluated on a stack VM. The result of a run is
//! the set of typed bindings left in the VM's root frame.
//!
//! ```text
//! type User: object { name: string  email: string? }
//! let admin: User = new { name = "root" }
//! server { let port: int = 8080  print("listening on", port) }
//! ```

#![allow(clippy::module_inception)]
#![allow(clippy::result_large_err)]
#![allow(clippy::new_without_default)]
#![allow(clippy::len_without_is_empty)]

pub mod ast;
pub mod config;
pub mod error;
pub mod host;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod span;
pub mod vm;

use tracing::instrument;

pub use config::{LogConfig, Options, Phase, VmConfig};
pub use error::CfgError;
pub use vm::{Chunk, Value, Vm};

/// Tokenize source code.
#[instrument(target = "cfglang::lexer", skip(source), fields(len = source.len()))]
pub fn tokenize(source: &str) -> Result<Vec<lexer::Token>, CfgError> {
    Ok(lexer::Scanner::new(source).scan_tokens()?)
}

/// Parse source code into an AST.
pub fn parse(source: &str) -> Result<ast::Source, CfgError> {
    let tokens = tokenize(source)?;
    parse_tokens(tokens)
}

#[instrument(target = "cfglang::parser", skip(tokens), fields(count = tokens.len()))]
fn parse_tokens(tokens: Vec<lexer::Token>) -> Result<ast::Source, CfgError> {
    Ok(parser::Parser::new(tokens).parse()?)
}

/// Parse and compile source code to bytecode.
pub fn compile(source: &str) -> Result<Chunk, CfgError> {
    let ast = parse(source)?;
    compile_ast(&ast)
}

#[instrument(target = "cfglang::compiler", skip(ast), fields(statements = ast.statements().len()))]
fn compile_ast(ast: &ast::Source) -> Result<Chunk, CfgError> {
    Ok(vm::Compiler::compile(ast)?)
}

/// Evaluate source code with the default host library and limits.
pub fn run(source: &str) -> Result<Vm, CfgError> {
    run_with_options(source, &Options::default())
}

/// Evaluate source code with full control over the run options.
///
/// Returns the halted VM so its root bindings can be inspected.
pub fn run_with_options(source: &str, options: &Options) -> Result<Vm, CfgError> {
    let chunk = compile(source)?;
    run_chunk(chunk, options)
}

/// Evaluate an already compiled chunk with the default host library.
pub fn run_chunk(chunk: Chunk, options: &Options) -> Result<Vm, CfgError> {
    let mut machine = Vm::with_config(chunk, &options.limits);
    host::register_defaults(&mut machine);
    execute(&mut machine)?;
    Ok(machine)
}

/// Evaluate a file.
pub fn run_file(path: &std::path::Path, options: &Options) -> Result<Vm, CfgError> {
    let source = std::fs::read_to_string(path)?;
    run_with_options(&source, options)
}

#[instrument(target = "cfglang::vm", skip(machine))]
fn execute(machine: &mut Vm) -> Result<(), CfgError> {
    machine.run()?;
    tracing::info!(target: "cfglang::vm", bindings = machine.globals().len(), "run complete");
    Ok(())
}
