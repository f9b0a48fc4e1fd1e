use super::ViewRequest;
use crate::view::{ALL, ColorMode, Command, Layout};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid value for {what}: {value}")]
    InvalidValue { what: &'static str, value: String },
}

pub const HELP: &[&str] = &[
    "toggle <id>            expand or collapse a process",
    "expand-all | collapse-all",
    "search <term>          highlight matches and reveal their ancestors",
    "clear                  clear the search",
    "filter provider=a,b status=c,d   (use 'all' to disable a dimension)",
    "select <id> | unselect",
    "layout horizontal|vertical",
    "color status|provider",
    "show | stats | details <id> | load <path>",
    "save [path]            write the current view options to the config file",
    "status | help | q",
];

/// Parses one console line into a request for the view engine.
pub fn parse_request(line: &str) -> Result<ViewRequest, CommandParseError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let verb = verb.to_lowercase();

    let request = match verb.as_str() {
        "" => return Err(CommandParseError::Empty),
        "toggle" | "expand" | "collapse" => {
            ViewRequest::Dispatch(Command::ToggleExpand(required("toggle", rest)?.to_string()))
        }
        "expand-all" => ViewRequest::Dispatch(Command::ExpandAll),
        "collapse-all" => ViewRequest::Dispatch(Command::CollapseAll),
        "search" => ViewRequest::Dispatch(Command::SetSearch(required("search", rest)?.to_string())),
        "clear" => ViewRequest::Dispatch(Command::ClearSearch),
        "filter" => parse_filter(rest)?,
        "select" => ViewRequest::Dispatch(Command::Select(required("select", rest)?.to_string())),
        "unselect" => ViewRequest::Dispatch(Command::ClearSelection),
        "layout" => {
            let layout = required("layout", rest)?
                .parse::<Layout>()
                .map_err(|_| invalid("layout", rest))?;
            ViewRequest::Dispatch(Command::SetLayout(layout))
        }
        "color" => {
            let mode = required("color", rest)?
                .parse::<ColorMode>()
                .map_err(|_| invalid("color mode", rest))?;
            ViewRequest::Dispatch(Command::SetColorMode(mode))
        }
        "show" | "ls" => ViewRequest::Show,
        "stats" => ViewRequest::Stats,
        "details" => ViewRequest::Details(required("details", rest)?.to_string()),
        "load" => ViewRequest::Load(PathBuf::from(required("load", rest)?)),
        "save" => ViewRequest::Save((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "status" | "info" => ViewRequest::Status,
        "help" | "?" => ViewRequest::Help,
        "q" | "quit" | "exit" | "stop" => ViewRequest::Quit,
        _ => return Err(CommandParseError::Unknown(verb)),
    };
    Ok(request)
}

fn required<'a>(what: &'static str, rest: &'a str) -> Result<&'a str, CommandParseError> {
    if rest.is_empty() {
        Err(CommandParseError::MissingArgument(what))
    } else {
        Ok(rest)
    }
}

fn invalid(what: &'static str, value: &str) -> CommandParseError {
    CommandParseError::InvalidValue {
        what,
        value: value.to_string(),
    }
}

// filter provider=crowdstrike,defender status=malicious
fn parse_filter(rest: &str) -> Result<ViewRequest, CommandParseError> {
    let mut providers = vec![ALL.to_string()];
    let mut statuses = vec![ALL.to_string()];

    for part in rest.split_whitespace() {
        let (key, values) = part.split_once('=').ok_or_else(|| invalid("filter", part))?;
        let values: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        match key.to_lowercase().as_str() {
            "provider" | "providers" => providers = values,
            "status" | "statuses" => statuses = values,
            _ => return Err(invalid("filter key", key)),
        }
    }

    Ok(ViewRequest::Dispatch(Command::ApplyFilter {
        providers,
        statuses,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatched(line: &str) -> Command {
        match parse_request(line).unwrap() {
            ViewRequest::Dispatch(command) => command,
            other => panic!("expected a dispatch, got {:?}", other),
        }
    }

    #[test]
    fn view_commands() {
        assert_eq!(dispatched("toggle 4312"), Command::ToggleExpand("4312".into()));
        assert_eq!(dispatched("EXPAND-ALL"), Command::ExpandAll);
        assert_eq!(dispatched("collapse-all"), Command::CollapseAll);
        assert_eq!(
            dispatched("search  Invoke-WebRequest http "),
            Command::SetSearch("Invoke-WebRequest http".into())
        );
        assert_eq!(dispatched("clear"), Command::ClearSearch);
        assert_eq!(dispatched("select 9"), Command::Select("9".into()));
        assert_eq!(dispatched("unselect"), Command::ClearSelection);
        assert_eq!(dispatched("layout v"), Command::SetLayout(Layout::Vertical));
        assert_eq!(dispatched("color provider"), Command::SetColorMode(ColorMode::Provider));
    }

    #[test]
    fn filter_defaults_missing_dimension_to_all() {
        assert_eq!(
            dispatched("filter provider=crowdstrike,defender"),
            Command::ApplyFilter {
                providers: vec!["crowdstrike".into(), "defender".into()],
                statuses: vec!["all".into()],
            }
        );
        assert_eq!(
            dispatched("filter"),
            Command::ApplyFilter {
                providers: vec!["all".into()],
                statuses: vec!["all".into()],
            }
        );
    }

    #[test]
    fn console_requests() {
        assert_eq!(parse_request("show").unwrap(), ViewRequest::Show);
        assert_eq!(parse_request("details 12").unwrap(), ViewRequest::Details("12".into()));
        assert_eq!(
            parse_request("load /tmp/batch.json").unwrap(),
            ViewRequest::Load(PathBuf::from("/tmp/batch.json"))
        );
        assert_eq!(parse_request("save").unwrap(), ViewRequest::Save(None));
        assert_eq!(
            parse_request("save cfg/tree.json").unwrap(),
            ViewRequest::Save(Some(PathBuf::from("cfg/tree.json")))
        );
        assert_eq!(parse_request("Q").unwrap(), ViewRequest::Quit);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_request("   "), Err(CommandParseError::Empty));
        assert_eq!(
            parse_request("explode"),
            Err(CommandParseError::Unknown("explode".into()))
        );
        assert_eq!(
            parse_request("select"),
            Err(CommandParseError::MissingArgument("select"))
        );
        assert!(matches!(
            parse_request("layout diagonal"),
            Err(CommandParseError::InvalidValue { what: "layout", .. })
        ));
        assert!(matches!(
            parse_request("filter host=a"),
            Err(CommandParseError::InvalidValue { what: "filter key", .. })
        ));
    }
}
