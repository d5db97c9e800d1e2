//! Command parser for the interactive prompt

use crate::domain::TaskFilter;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Simple store
    Add(String),
    Complete(u64),

    // TodoWeb3 store
    Create(String),
    Toggle(u64),
    ClearCompleted,
    Filter(TaskFilter),

    // Session
    Reload,
    List,
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse one line of input
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let input = input.strip_prefix(':').unwrap_or(input);
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim().to_string());

    match cmd.to_lowercase().as_str() {
        // Simple store
        "add" => Command::Add(args.unwrap_or_default()),
        "complete" | "done" => match args.as_deref().and_then(parse_id) {
            Some(id) => Command::Complete(id),
            None => Command::Unknown(input.to_string()),
        },

        // TodoWeb3 store
        "create" | "new" => Command::Create(args.unwrap_or_default()),
        "toggle" => match args.as_deref().and_then(parse_id) {
            Some(id) => Command::Toggle(id),
            None => Command::Unknown(input.to_string()),
        },
        "clear" | "clear-completed" => Command::ClearCompleted,
        "filter" | "f" => {
            match TaskFilter::parse(args.as_deref().unwrap_or("all")) {
                Some(filter) => Command::Filter(filter),
                None => Command::Unknown(input.to_string()),
            }
        }
        "all" | "pending" | "completed" => match TaskFilter::parse(cmd) {
            Some(filter) => Command::Filter(filter),
            None => Command::Unknown(input.to_string()),
        },

        // Session
        "reload" | "refresh" | "r" => Command::Reload,
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

fn parse_id(s: &str) -> Option<u64> {
    s.trim().trim_start_matches('#').parse().ok()
}

pub const HELP: &str = "\
add <text>         add a task to the Simple store
complete <id>      complete a Simple task
create <text>      create a TodoWeb3 task
toggle <id>        flip a TodoWeb3 task's completion
clear              clear completed TodoWeb3 tasks
filter <all|pending|completed>
reload             reload both lists
list               show both lists
quit";
