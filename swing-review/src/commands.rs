//! One-shot subcommands.

use std::io::Write;

use gateway_client::GameGateway;
use review::{FetchError, FetchStatus, ReviewSession, SessionCache};

use crate::render;
use crate::CliError;

/// Fetch `handle`'s games into the session, waiting for the result.
pub async fn fetch_into<C, G>(
    session: &mut ReviewSession<C>,
    gateway: &G,
    handle: &str,
) -> Result<(), CliError>
where
    C: SessionCache,
    G: GameGateway,
{
    let ticket = session.begin_fetch(handle);
    let result = gateway
        .fetch_games(ticket.handle())
        .await
        .map_err(FetchError::from);
    session.complete_fetch(&ticket, result);
    match session.status() {
        FetchStatus::Failed(e) => Err(CliError::Fetch(e.clone())),
        _ => Ok(()),
    }
}

/// `games <handle>`: list a player's games and cache them.
pub async fn games<C, G, W>(
    session: &mut ReviewSession<C>,
    gateway: &G,
    handle: &str,
    out: &mut W,
) -> Result<(), CliError>
where
    C: SessionCache,
    G: GameGateway,
    W: Write,
{
    fetch_into(session, gateway, handle).await?;
    write!(out, "{}", render::game_list(session.games()))?;
    Ok(())
}

/// `show <n>`: one game move by move, with its notable swings.
pub fn show<C, W>(
    session: &mut ReviewSession<C>,
    number: usize,
    out: &mut W,
    color: bool,
) -> Result<(), CliError>
where
    C: SessionCache,
    W: Write,
{
    if session.games().is_empty() {
        return Err(CliError::NoGames);
    }
    let index = number.checked_sub(1).ok_or(review::ReviewError::GameNotFound(0))?;
    session.select_game(index)?;

    let machine = session.machine();
    let bands = machine.config().bands;
    let Some(game) = machine.game() else {
        return Err(review::ReviewError::NoActiveGame.into());
    };

    writeln!(out, "{}", game.title())?;
    writeln!(out)?;
    write!(out, "{}", render::move_list(game, &bands, None, color))?;
    writeln!(out)?;
    write!(out, "{}", render::summary(&machine.summary()))?;
    writeln!(out)?;
    writeln!(out, "Notable swings:")?;
    write!(
        out,
        "{}",
        render::notable_points(machine.notable_points(), color)
    )?;
    Ok(())
}
