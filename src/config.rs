//! Configuration data structures.
//!
//! Plain data, no logic beyond defaults and lookups, no global state.

use tracing::Level;

/// Execution limits for the VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of cells on the data stack.
    pub max_stack_size: usize,
    /// Maximum number of frames, the root included.
    pub max_frame_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack_size: 1024,
            max_frame_depth: 256,
        }
    }
}

/// Pipeline phase, used to route log output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    Compiler,
    Vm,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Lexer, Phase::Parser, Phase::Compiler, Phase::Vm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Compiler => "compiler",
            Phase::Vm => "vm",
        }
    }

    /// Log target name for this phase.
    pub fn target(&self) -> String {
        format!("cfglang::{}", self.as_str())
    }

    pub fn from_name(name: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|phase| phase.as_str() == name)
    }
}

/// Log levels, globally and per phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub global: Level,
    pub lexer: Option<Level>,
    pub parser: Option<Level>,
    pub compiler: Option<Level>,
    pub vm: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            lexer: None,
            parser: None,
            compiler: None,
            vm: None,
        }
    }
}

impl LogConfig {
    /// Get the log level for a specific target.
    pub fn level_for(&self, target: &str) -> Level {
        match target {
            "cfglang::lexer" => self.lexer.unwrap_or(self.global),
            "cfglang::parser" => self.parser.unwrap_or(self.global),
            "cfglang::compiler" => self.compiler.unwrap_or(self.global),
            "cfglang::vm" => self.vm.unwrap_or(self.global),
            _ => self.global,
        }
    }

    pub fn set_phase(&mut self, phase: Phase, level: Level) {
        let slot = match phase {
            Phase::Lexer => &mut self.lexer,
            Phase::Parser => &mut self.parser,
            Phase::Compiler => &mut self.compiler,
            Phase::Vm => &mut self.vm,
        };
        *slot = Some(level);
    }
}

/// Everything a run needs besides the source text.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub log: LogConfig,
    pub limits: VmConfig,
    /// Print the compiled bytecode before running.
    pub disassemble: bool,
    /// Print the root bindings as JSON after running.
    pub dump: bool,
}
