//! A typed, action-based command-line parser for async tools.
//!
//! A tool is a [`CommandLineParser`] with optional global parameters and a set of
//! [`Action`]s. Each action declares its own parameters on a [`ParameterSet`] and
//! receives their values before its async body runs. [`CommandLineParser::execute`]
//! turns help requests, bad input and failing actions into messages and an exit code.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod system;

pub use crate::cli::console::{CaptureBuffer, Console};
pub use crate::core::action::{Action, ActionDefinition, ActionOptions};
pub use crate::core::errors::{ExitSignal, UsageError};
pub use crate::core::exit_code::ExitCodeCell;
pub use crate::core::parameters::{
    ChoiceHandle, FlagHandle, IntegerHandle, ParameterDefinition, ParameterHandle, ParameterKind,
    ParameterOptions, ParameterSet, StringHandle, StringListHandle,
};
pub use crate::core::parser::{CommandLineParser, ExecuteHook, ParserState, ToolOptions};
