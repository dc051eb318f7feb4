// src/constants.rs

/// Value name of the sub-command selector in the top-level grammar.
pub const ACTION_SELECTOR: &str = "action";

/// Extension tried after the bare program name when spawning commands on Windows.
pub const WINDOWS_SCRIPT_EXTENSION: &str = ".cmd";

/// Exit code reported when a child command is interrupted with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;
