// src/core/parser.rs

use crate::{
    cli::console::Console,
    core::{
        action::Action,
        errors::{ExitSignal, UsageError},
        exit_code::ExitCodeCell,
        grammar,
        parameters::ParameterSet,
    },
};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Identity of the tool, used for help text.
#[derive(Debug, Clone)]
pub struct ToolOptions {
    /// The executable name shown in usage lines, e.g. `widget`.
    pub tool_filename: String,
    pub tool_description: String,
}

impl ToolOptions {
    pub fn new(tool_filename: impl Into<String>, tool_description: impl Into<String>) -> Self {
        Self {
            tool_filename: tool_filename.into(),
            tool_description: tool_description.into(),
        }
    }
}

/// Lifecycle of a [`CommandLineParser`]. A parser leaves `Defined` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Defined,
    Parsing,
    Dispatching,
    Running,
    Succeeded,
    Failed,
}

/// Wraps the execution of the selected action, e.g. to add timing or telemetry.
///
/// Implementations must await `action.execute()` themselves.
#[async_trait]
pub trait ExecuteHook: Send + Sync {
    async fn on_execute(&self, action: &dyn Action) -> Result<()>;
}

/// The entry point of a tool: global parameters plus an ordered registry of actions.
///
/// A parser is single-use. Define everything, then call [`CommandLineParser::execute`]
/// (or [`CommandLineParser::execute_without_error_handling`]) once.
pub struct CommandLineParser {
    options: ToolOptions,
    parameters: ParameterSet,
    actions: Vec<Box<dyn Action>>,
    execute_hook: Option<Box<dyn ExecuteHook>>,
    console: Console,
    exit_code: ExitCodeCell,
    state: ParserState,
    selected_action: Option<usize>,
}

impl CommandLineParser {
    pub fn new(options: ToolOptions) -> Self {
        Self {
            options,
            parameters: ParameterSet::new(),
            actions: Vec::new(),
            execute_hook: None,
            console: Console::standard(),
            exit_code: ExitCodeCell::process(),
            state: ParserState::Defined,
            selected_action: None,
        }
    }

    /// Replaces standard output/error, e.g. with capture buffers.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Records failures in `cell` instead of the process-wide exit code.
    pub fn with_exit_code(mut self, cell: ExitCodeCell) -> Self {
        self.exit_code = cell;
        self
    }

    pub fn with_execute_hook(mut self, hook: impl ExecuteHook + 'static) -> Self {
        self.execute_hook = Some(Box::new(hook));
        self
    }

    pub fn options(&self) -> &ToolOptions {
        &self.options
    }

    /// Global parameters, accepted before the action name.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Global parameters for definition. Closed once execution has started.
    pub fn parameters_mut(&mut self) -> Result<&mut ParameterSet, UsageError> {
        if self.state != ParserState::Defined {
            return Err(UsageError::GlobalDefinitionAfterExecution);
        }
        Ok(&mut self.parameters)
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn exit_code(&self) -> &ExitCodeCell {
        &self.exit_code
    }

    /// Registers an action and runs its define hook.
    pub fn add_action(&mut self, mut action: impl Action + 'static) -> Result<(), UsageError> {
        let name = action.name().to_string();
        if self.state != ParserState::Defined {
            return Err(UsageError::DefinitionAfterExecution(name));
        }
        if self.try_get_action(&name).is_some() {
            return Err(UsageError::DuplicateActionName(name));
        }

        action.on_define_parameters()?;
        log::debug!("Registered action '{}'.", name);
        self.actions.push(Box::new(action));
        Ok(())
    }

    /// Registered actions in insertion order.
    pub fn actions(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|action| &**action)
    }

    pub fn try_get_action(&self, name: &str) -> Option<&dyn Action> {
        self.actions().find(|action| action.name() == name)
    }

    pub fn get_action(&self, name: &str) -> Result<&dyn Action, UsageError> {
        self.try_get_action(name)
            .ok_or_else(|| UsageError::ActionNotFound(name.to_string()))
    }

    /// The action chosen by the last execution, if the grammar got that far.
    pub fn selected_action(&self) -> Option<&dyn Action> {
        self.selected_action
            .and_then(|index| self.actions.get(index))
            .map(|action| &**action)
    }

    /// Top-level help, as printed for an empty command line.
    pub fn render_help(&self) -> String {
        let mut command = grammar::build_command(&self.options, &self.parameters, &self.actions);
        grammar::render(&command.render_help(), self.console.colorize())
    }

    /// Runs the tool and reports every failure itself.
    ///
    /// Returns `true` on success. On failure the message goes to standard error, the
    /// exit code is recorded (an earlier non-zero code is kept) and `false` is returned.
    pub async fn execute(&mut self, args: Option<Vec<String>>) -> bool {
        match self.execute_without_error_handling(args).await {
            Ok(()) => true,
            Err(error) => {
                self.report_failure(&error);
                false
            }
        }
    }

    /// Runs the tool and returns failures to the caller.
    ///
    /// `None` means the process arguments without the program name. A help request
    /// (an [`ExitSignal`] with code 0) is printed and treated as success. Any other
    /// [`ExitSignal`], [`UsageError`] or action failure is returned.
    pub async fn execute_without_error_handling(&mut self, args: Option<Vec<String>>) -> Result<()> {
        if self.state != ParserState::Defined {
            return Err(UsageError::AlreadyExecuted.into());
        }

        let outcome = match self.run(args).await {
            Err(error) => {
                let early_exit = error
                    .downcast_ref::<ExitSignal>()
                    .filter(|signal| signal.is_success())
                    .map(|signal| signal.message.clone());
                match early_exit {
                    Some(message) => {
                        if let Some(message) = message {
                            self.console.print(&message);
                        }
                        Ok(())
                    }
                    None => Err(error),
                }
            }
            ok => ok,
        };

        self.state = if outcome.is_ok() {
            ParserState::Succeeded
        } else {
            ParserState::Failed
        };
        log::debug!("Parser finished in state {:?}.", self.state);
        outcome
    }

    async fn run(&mut self, args: Option<Vec<String>>) -> Result<()> {
        self.state = ParserState::Parsing;
        let args = args.unwrap_or_else(|| std::env::args().skip(1).collect());
        log::debug!("Parsing arguments: {:?}", args);

        if args.is_empty() {
            let help = self.render_help();
            self.console.print(&help);
            return Ok(());
        }

        let command = grammar::build_command(&self.options, &self.parameters, &self.actions);
        let matches = grammar::parse(command, &args, self.console.colorize())?;
        self.parameters.apply_matches(&matches)?;

        let (action_name, action_matches) = matches
            .subcommand()
            .ok_or(UsageError::MissingActionSelection)?;
        let (index, action) = self
            .actions
            .iter()
            .enumerate()
            .find(|(_, action)| action.name() == action_name)
            .ok_or_else(|| UsageError::UnknownSelectedAction(action_name.to_string()))?;

        self.state = ParserState::Dispatching;
        self.selected_action = Some(index);
        action.definition().parameters().apply_matches(action_matches)?;

        self.state = ParserState::Running;
        log::debug!("Executing action '{}'.", action_name);
        match &self.execute_hook {
            Some(hook) => hook.on_execute(&**action).await,
            None => action.execute().await,
        }
    }

    fn report_failure(&mut self, error: &anyhow::Error) {
        match error.downcast_ref::<ExitSignal>() {
            Some(signal) => {
                if let Some(message) = &signal.message {
                    self.console.print_error(message);
                }
                self.exit_code.set_if_unset(signal.exit_code);
            }
            None => {
                self.console.print_failure(error);
                self.exit_code.set_if_unset(1);
            }
        }
    }
}

impl fmt::Debug for CommandLineParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action_names: Vec<&str> = self.actions().map(|action| action.name()).collect();
        f.debug_struct("CommandLineParser")
            .field("options", &self.options)
            .field("parameters", &self.parameters)
            .field("actions", &action_names)
            .field("state", &self.state)
            .field("selected_action", &self.selected_action().map(|action| action.name()))
            .finish_non_exhaustive()
    }
}
