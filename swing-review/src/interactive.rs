//! Interactive review loop.
//!
//! Reads commands line by line and drives a [`ReviewSession`]. Game-list
//! fetches run on their own tasks and report back over a channel, so the
//! loop keeps answering navigation commands while a fetch is in flight and
//! drops results of fetches that a newer one superseded.

use std::io::Write;

use chess::MoveAttempt;
use gateway_client::GameGateway;
use review::{
    FetchError, FetchOutcome, FetchStatus, FetchTicket, MoveOutcome, ReviewSession, SessionCache,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::render;

const HELP: &str = "\
Commands:
  fetch <handle>       load the games of a player
  list                 show the game list
  open <n>             review game n
  moves                show the moves of the open game
  next | prev          step one move
  start | end          go to the first or last position
  jump <ply>           show the position after ply (0 = start)
  move <from> <to> [q] try a move on the board, e.g. move e2 e4
  notable              list the notable swings
  board                show the board again
  help                 this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch(String),
    List,
    Open(usize),
    Moves,
    Next,
    Prev,
    Start,
    End,
    Jump(usize),
    Move(MoveAttempt),
    Notable,
    Board,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error(transparent)]
    Move(#[from] chess::RulesError),
}

fn number(arg: Option<&str>, usage: &'static str) -> Result<usize, CommandError> {
    let arg = arg.ok_or(CommandError::Usage(usage))?;
    arg.parse()
        .map_err(|_| CommandError::NotANumber(arg.to_string()))
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "fetch" => Command::Fetch(
            words
                .next()
                .ok_or(CommandError::Usage("fetch <handle>"))?
                .to_string(),
        ),
        "list" | "ls" => Command::List,
        "open" => {
            let n = number(words.next(), "open <n>")?;
            if n == 0 {
                return Err(CommandError::Usage("open <n>, counting from 1"));
            }
            Command::Open(n)
        }
        "moves" => Command::Moves,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "start" => Command::Start,
        "end" => Command::End,
        "jump" | "j" => Command::Jump(number(words.next(), "jump <ply>")?),
        "move" | "m" => {
            const USAGE: &str = "move <from> <to> [q|r|b|n]";
            let from = words.next().ok_or(CommandError::Usage(USAGE))?;
            let to = words.next().ok_or(CommandError::Usage(USAGE))?;
            let mut attempt = MoveAttempt::parse(from, to)?;
            if let Some(piece) = words.next() {
                let kind = piece
                    .chars()
                    .next()
                    .and_then(chess::PieceKind::from_char)
                    .filter(|k| k.is_promotion_target())
                    .ok_or(CommandError::Usage(USAGE))?;
                attempt = attempt.with_promotion(kind);
            }
            Command::Move(attempt)
        }
        "notable" => Command::Notable,
        "board" | "b" => Command::Board,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

type FetchReport = (FetchTicket, Result<Vec<review::Game>, FetchError>);

/// Run the loop until `quit` or end of input. Outstanding fetches are
/// awaited before returning on end of input.
pub async fn run<C, G, R, W>(
    session: &mut ReviewSession<C>,
    gateway: G,
    input: R,
    out: &mut W,
    color: bool,
) -> anyhow::Result<()>
where
    C: SessionCache,
    G: GameGateway + Clone + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchReport>();
    let mut lines = input.lines();
    let mut in_flight = 0usize;
    let mut input_open = true;

    if let Some(frame) = session.machine().frame() {
        writeln!(out, "Resuming {}", session.machine().game().map(|g| g.title()).unwrap_or_default())?;
        write!(out, "{}", render::frame(&frame, color))?;
    } else if !session.games().is_empty() {
        write!(out, "{}", render::game_list(session.games()))?;
    }

    loop {
        if !input_open && in_flight == 0 {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Fetch(handle))) => {
                        let ticket = session.begin_fetch(&handle);
                        writeln!(out, "Fetching games for '{}'...", ticket.handle())?;
                        in_flight += 1;
                        let gateway = gateway.clone();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let result = gateway
                                .fetch_games(ticket.handle())
                                .await
                                .map_err(FetchError::from);
                            let _ = tx.send((ticket, result));
                        });
                    }
                    Ok(Some(command)) => execute(session, command, out, color)?,
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }

            Some((ticket, result)) = rx.recv(), if in_flight > 0 => {
                in_flight -= 1;
                if session.complete_fetch(&ticket, result) == FetchOutcome::Applied {
                    match session.status() {
                        FetchStatus::Failed(e) => writeln!(out, "{}", e.user_message())?,
                        _ => write!(out, "{}", render::game_list(session.games()))?,
                    }
                }
            }
        }
        out.flush()?;
    }

    tracing::info!("Interactive review finished");
    Ok(())
}

/// Apply a non-fetch command and print its result.
pub fn execute<C: SessionCache, W: Write>(
    session: &mut ReviewSession<C>,
    command: Command,
    out: &mut W,
    color: bool,
) -> std::io::Result<()> {
    let bands = session.machine().config().bands;
    let result = match command {
        Command::List => return write!(out, "{}", render::game_list(session.games())),
        Command::Help => return writeln!(out, "{}", HELP),
        Command::Moves => {
            return match session.machine().game() {
                Some(game) => write!(
                    out,
                    "{}",
                    render::move_list(game, &bands, Some(session.machine().cursor()), color)
                ),
                None => writeln!(out, "{}", review::ReviewError::NoActiveGame),
            };
        }
        Command::Notable => {
            return write!(
                out,
                "{}",
                render::notable_points(session.machine().notable_points(), color)
            );
        }
        Command::Move(attempt) => {
            if session.machine().game().is_none() {
                return writeln!(out, "{}", review::ReviewError::NoActiveGame);
            }
            match session.attempt_move(attempt) {
                MoveOutcome::Accepted => writeln!(out, "{} played", attempt)?,
                MoveOutcome::Snapback => writeln!(out, "{} is not possible here", attempt)?,
            }
            Ok(())
        }
        Command::Open(n) => session.select_game(n - 1),
        Command::Next => session.next(),
        Command::Prev => session.prev(),
        Command::Start => session.go_to_start(),
        Command::End => session.go_to_end(),
        Command::Jump(ply) => session.jump_to(ply),
        Command::Board => Ok(()),
        Command::Fetch(_) | Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        return writeln!(out, "{}", e);
    }
    match session.machine().frame() {
        Some(frame) => write!(out, "{}", render::frame(&frame, color)),
        None => writeln!(out, "No game open. Use 'list' and 'open <n>'."),
    }
}
