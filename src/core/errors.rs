// src/core/errors.rs

use thiserror::Error;

/// Programming errors: the tool was wired incorrectly.
///
/// These are never expected in a correctly built tool, so the driver reports them
/// like any other fault instead of mapping them to a friendly exit code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("A parameter named '{0}' is already defined.")]
    DuplicateParameter(String),
    #[error("The short name '{short_name}' is already used by parameter '{owner}'.")]
    DuplicateShortName { short_name: String, owner: String },
    #[error("Invalid parameter name '{0}': expected a lower-case long name such as '--dry-run'.")]
    InvalidParameterName(String),
    #[error("Invalid short name '{0}': expected a dash followed by a single letter, such as '-v'.")]
    InvalidShortName(String),
    #[error("The name '{0}' is reserved for help output.")]
    ReservedName(String),
    #[error(
        "Invalid environment variable '{variable}' for parameter '{name}': use upper-case letters, digits and underscores."
    )]
    InvalidEnvironmentVariable { name: String, variable: String },
    #[error("Invalid argument name '{argument}' for parameter '{name}': use upper-case letters, digits and underscores.")]
    InvalidArgumentName { name: String, argument: String },
    #[error("Flag parameter '{0}' cannot be required.")]
    RequiredFlag(String),
    #[error("Parameter '{0}' is required and cannot also declare a default value.")]
    RequiredWithDefault(String),
    #[error("Choice parameter '{0}' must declare at least one alternative.")]
    EmptyChoices(String),
    #[error("Default value '{default}' for parameter '{name}' is not one of: {alternatives}.")]
    InvalidDefault {
        name: String,
        default: String,
        alternatives: String,
    },
    #[error("Parameter '{0}' cannot be defined after the command line has been parsed.")]
    DefinitionAfterParse(String),
    #[error("The value of parameter '{0}' is not available until the command line has been parsed.")]
    ValueNotAvailable(String),
    #[error("Parsed values have already been applied to this parameter set.")]
    AlreadyParsed,
    #[error("Parsed value for '{name}' does not match its declaration: {reason}")]
    ParsedValueMismatch { name: String, reason: String },

    #[error("Invalid action name '{0}': expected lower-case words separated by dashes, such as 'build-all'.")]
    InvalidActionName(String),
    #[error("An action named '{0}' is already registered.")]
    DuplicateActionName(String),
    #[error("Action '{0}' cannot be added after execution has started.")]
    DefinitionAfterExecution(String),
    #[error("Global parameters cannot be defined after execution has started.")]
    GlobalDefinitionAfterExecution,
    #[error("No action named '{0}' is registered.")]
    ActionNotFound(String),
    #[error("The grammar accepted action '{0}', but no such action is registered.")]
    UnknownSelectedAction(String),
    #[error("The grammar accepted the command line without selecting an action.")]
    MissingActionSelection,
    #[error("This parser has already been executed; create a new parser for each invocation.")]
    AlreadyExecuted,
}

/// A request to stop processing and exit with `exit_code`.
///
/// Carried inside `anyhow::Error` so it can unwind from the grammar or from an action
/// body. A code of 0 is a successful early exit (for example after printing help).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("exit requested with code {exit_code}")]
pub struct ExitSignal {
    pub exit_code: i32,
    pub message: Option<String>,
}

impl ExitSignal {
    /// An early exit that still counts as success.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: Some(message.into()),
        }
    }

    /// A user-facing failure. `message` is written to standard error, if present.
    pub fn failure(exit_code: i32, message: Option<String>) -> Self {
        Self { exit_code, message }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
