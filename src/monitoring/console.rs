use crate::events::{ViewRequest, parse_request};
use crossbeam_channel::Sender;
use std::io::BufRead;

/// Why the console stopped reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The user typed a quit command.
    Quit(String),
    /// Input reached end of file or failed to read.
    Closed,
    /// The view engine hung up.
    EngineGone,
}

/// Forwards parsed console lines to the view engine until the user quits or
/// the input ends. Either way the console should shut down afterwards.
pub fn read_requests<R: BufRead>(input: R, tx: &Sender<ViewRequest>) -> ConsoleExit {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Failed to read console input: {}", e);
                return ConsoleExit::Closed;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_request(&line) {
            Ok(ViewRequest::Quit) => return ConsoleExit::Quit(line.trim().to_string()),
            Ok(request) => {
                if tx.send(request).is_err() {
                    return ConsoleExit::EngineGone;
                }
            }
            Err(e) => log::info!("❓ {} (type 'help' for commands)", e),
        }
    }
    ConsoleExit::Closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn end_of_input_closes_the_console() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let exit = read_requests(Cursor::new("show\nbogus\n\nstats"), &tx);
        assert_eq!(exit, ConsoleExit::Closed);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ViewRequest::Show, ViewRequest::Stats]);
    }

    #[test]
    fn quit_stops_before_later_lines() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let exit = read_requests(Cursor::new("show\n  Quit \nstats\n"), &tx);
        assert_eq!(exit, ConsoleExit::Quit("Quit".into()));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ViewRequest::Show]);
    }

    #[test]
    fn engine_hang_up_stops_reading() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        assert_eq!(read_requests(Cursor::new("show\n"), &tx), ConsoleExit::EngineGone);
    }
}
