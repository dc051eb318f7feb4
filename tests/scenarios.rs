// tests/scenarios.rs

use actionline::{
    Action, ActionDefinition, ActionOptions, CaptureBuffer, CommandLineParser, Console,
    ExitCodeCell, ParameterOptions, ParserState, StringHandle, ToolOptions, UsageError,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

// --- Fixtures ---

struct GreetAction {
    definition: ActionDefinition,
    name: StringHandle,
    observed: Arc<Mutex<Option<String>>>,
}

impl GreetAction {
    fn new(observed: Arc<Mutex<Option<String>>>) -> Self {
        let mut definition = ActionDefinition::new(ActionOptions {
            action_name: "greet".to_string(),
            summary: "Says hello".to_string(),
            documentation: "Says hello to someone.".to_string(),
        })
        .unwrap();
        let name = definition
            .parameters_mut()
            .define_string(ParameterOptions::new("--name", "Who to greet").required(), None)
            .unwrap();
        Self {
            definition,
            name,
            observed,
        }
    }
}

#[async_trait]
impl Action for GreetAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    fn definition_mut(&mut self) -> &mut ActionDefinition {
        &mut self.definition
    }

    async fn execute(&self) -> Result<()> {
        let name = self.name.value()?.clone();
        *self.observed.lock().unwrap() = name;
        Ok(())
    }
}

struct Tool {
    parser: CommandLineParser,
    observed: Arc<Mutex<Option<String>>>,
    out: CaptureBuffer,
    err: CaptureBuffer,
    exit_code: ExitCodeCell,
}

fn tool() -> Tool {
    let observed = Arc::new(Mutex::new(None));
    let out = CaptureBuffer::new();
    let err = CaptureBuffer::new();
    let exit_code = ExitCodeCell::new();

    let mut parser = CommandLineParser::new(ToolOptions::new("hello", "Greets people."))
        .with_console(Console::new(out.clone(), err.clone()))
        .with_exit_code(exit_code.clone());
    parser.add_action(GreetAction::new(Arc::clone(&observed))).unwrap();

    Tool {
        parser,
        observed,
        out,
        err,
        exit_code,
    }
}

fn args(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|v| v.to_string()).collect())
}

// --- Scenarios ---

#[tokio::test]
async fn test_greet_with_required_name() {
    let mut t = tool();

    assert!(t.parser.execute(args(&["greet", "--name", "Ada"])).await);

    assert_eq!(t.observed.lock().unwrap().as_deref(), Some("Ada"));
    assert_eq!(t.parser.selected_action().unwrap().name(), "greet");
    assert_eq!(t.parser.state(), ParserState::Succeeded);
    assert!(!t.exit_code.is_set());
    assert!(t.err.is_empty());
}

#[tokio::test]
async fn test_greet_without_required_name() {
    let mut t = tool();

    assert!(!t.parser.execute(args(&["greet"])).await);

    assert_ne!(t.exit_code.get(), 0);
    assert!(t.err.contents().contains("--name"));
    assert!(t.parser.selected_action().is_none());
    assert!(t.observed.lock().unwrap().is_none());
    assert_eq!(t.parser.state(), ParserState::Failed);
}

#[tokio::test]
async fn test_help_flag() {
    let mut t = tool();

    assert!(t.parser.execute(args(&["-h"])).await);

    let help = t.out.contents();
    assert!(help.contains("Greets people."));
    assert!(help.contains("greet"));
    assert!(help.contains("Says hello"));
    assert!(t.err.is_empty());
    assert!(!t.exit_code.is_set());
    assert!(t.parser.selected_action().is_none());
}

#[tokio::test]
async fn test_unknown_action() {
    let mut t = tool();

    assert!(!t.parser.execute(args(&["unknownAction"])).await);

    assert_ne!(t.exit_code.get(), 0);
    assert!(t.err.contents().contains("unknownAction"));
    assert!(t.parser.selected_action().is_none());
}

#[tokio::test]
async fn test_empty_command_line_prints_help() {
    let mut t = tool();

    assert!(t.parser.execute(args(&[])).await);

    assert!(t.out.contents().contains("hello <action> -h"));
    assert!(t.parser.selected_action().is_none());
    assert!(!t.exit_code.is_set());
}

#[tokio::test]
async fn test_parser_is_single_use() {
    let mut t = tool();
    assert!(!t.parser.execute(args(&["unknownAction"])).await);

    let error = t
        .parser
        .execute_without_error_handling(args(&["greet", "--name", "Ada"]))
        .await
        .unwrap_err();

    assert_eq!(
        error.downcast_ref::<UsageError>(),
        Some(&UsageError::AlreadyExecuted)
    );
    assert!(t.observed.lock().unwrap().is_none());
}

#[test]
fn test_action_lookup() {
    let t = tool();

    assert_eq!(t.parser.get_action("greet").unwrap().name(), "greet");
    assert!(t.parser.try_get_action("wave").is_none());
    assert!(matches!(
        t.parser.get_action("wave"),
        Err(UsageError::ActionNotFound(ref name)) if name == "wave"
    ));
}
