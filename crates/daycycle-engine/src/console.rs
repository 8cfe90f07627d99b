//! Operator console on standard input.
//!
//! One command per line. Control commands act on the [`OperatorState`]
//! immediately; administrative commands are queued and applied before the
//! next tick.
//!
//! | Command | Effect |
//! |---|---|
//! | `pause` / `resume` | Halt or continue the tick loop |
//! | `stop` | Clean shutdown |
//! | `speed <ms>` | Set the tick interval |
//! | `check` | Force a schedule re-check |
//! | `reset` | Deactivate every scheduled object |
//! | `reinit` | Rediscover renderer and collider handles |
//! | `dump` | Log a full state snapshot |
//! | `hour <h>` | Jump to the start of an hour |
//! | `fraction <f>` | Set the fraction of day |
//! | `duration <s>` | Set the real seconds per simulated day |
//! | `day` | Start the next day |
//! | `week` | Advance the week counter |

use std::sync::Arc;

use daycycle_core::operator::{AdminCommand, OperatorState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Console input that could not be turned into a command.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command needs an argument.
    #[error("{command} needs an argument")]
    MissingArgument {
        /// Command word.
        command: &'static str,
    },

    /// The argument did not parse.
    #[error("invalid argument for {command}: {value}")]
    InvalidArgument {
        /// Command word.
        command: &'static str,
        /// Rejected text.
        value: String,
    },
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Pause the tick loop.
    Pause,
    /// Resume the tick loop.
    Resume,
    /// Stop the simulation.
    Stop,
    /// Set the tick interval in milliseconds.
    Speed(u64),
    /// Queue an administrative command.
    Admin(AdminCommand),
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let command = match word.to_ascii_lowercase().as_str() {
        "pause" => ConsoleCommand::Pause,
        "resume" => ConsoleCommand::Resume,
        "stop" | "quit" => ConsoleCommand::Stop,
        "speed" => ConsoleCommand::Speed(parse_argument("speed", argument)?),
        "check" => ConsoleCommand::Admin(AdminCommand::ForceCheck),
        "reset" => ConsoleCommand::Admin(AdminCommand::ResetSchedules),
        "reinit" => ConsoleCommand::Admin(AdminCommand::ReinitializeComponents),
        "dump" => ConsoleCommand::Admin(AdminCommand::DumpState),
        "hour" => {
            ConsoleCommand::Admin(AdminCommand::JumpToHour(parse_argument("hour", argument)?))
        }
        "fraction" => {
            ConsoleCommand::Admin(AdminCommand::SetFraction(parse_argument("fraction", argument)?))
        }
        "duration" => ConsoleCommand::Admin(AdminCommand::SetDayDuration(parse_argument(
            "duration", argument,
        )?)),
        "day" => ConsoleCommand::Admin(AdminCommand::AdvanceDay),
        "week" => ConsoleCommand::Admin(AdminCommand::AdvanceWeek),
        other => return Err(ConsoleError::UnknownCommand(other.to_owned())),
    };
    Ok(Some(command))
}

/// Parse the argument of `command`.
fn parse_argument<T: std::str::FromStr>(
    command: &'static str,
    argument: Option<&str>,
) -> Result<T, ConsoleError> {
    let value = argument.ok_or(ConsoleError::MissingArgument { command })?;
    value.parse().ok().ok_or_else(|| ConsoleError::InvalidArgument {
        command,
        value: value.to_owned(),
    })
}

/// Apply a parsed command to the operator state.
pub async fn dispatch(operator: &OperatorState, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Pause => {
            operator.pause();
            info!("Pause requested");
        }
        ConsoleCommand::Resume => {
            operator.resume();
            info!("Resume requested");
        }
        ConsoleCommand::Stop => {
            operator.request_stop();
            info!("Stop requested");
        }
        ConsoleCommand::Speed(ms) => match operator.set_tick_interval_ms(ms) {
            Some(previous) => info!(previous, current = ms, "Tick interval changed"),
            None => warn!(requested = ms, "Tick interval rejected"),
        },
        ConsoleCommand::Admin(admin) => operator.submit_command(admin).await,
    }
}

/// Read commands from standard input until it closes or a stop is
/// requested.
pub async fn run_console(operator: Arc<OperatorState>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(Some(command)) => {
                    let stop = command == ConsoleCommand::Stop;
                    dispatch(&operator, command).await;
                    if stop {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "Console input ignored"),
            },
            Ok(None) => {
                info!("Console input closed");
                break;
            }
            Err(err) => {
                warn!(error = %err, "Console read failed");
                break;
            }
        }
    }
}
