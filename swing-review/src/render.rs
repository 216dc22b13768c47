//! Text output: game lists, annotated move lists and board frames.

use std::fmt::Write as _;

use chess::{DisplayBoard, PieceColor};
use review::{
    classify, BoardFrame, Classification, ClassificationBands, ClassificationSummary, Game,
    NotableSwingPoint,
};

/// Wrap `text` in the category's colours using 24-bit ANSI escapes.
pub fn paint(class: Classification, text: &str, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let style = class.style();
    let (fg, bg) = (style.foreground, style.background);
    format!(
        "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{}\x1b[0m",
        fg.0, fg.1, fg.2, bg.0, bg.1, bg.2, text
    )
}

/// `1.` for White's plies, `1...` for Black's.
fn move_number(ply: usize) -> String {
    let number = (ply + 1) / 2;
    if chess::is_white_ply(ply) {
        format!("{}.", number)
    } else {
        format!("{}...", number)
    }
}

fn label(class: Classification) -> String {
    match class.symbol() {
        Some(symbol) => format!("{} {}", class, symbol),
        None => class.to_string(),
    }
}

pub fn game_list(games: &[Game]) -> String {
    if games.is_empty() {
        return "No games.\n".to_string();
    }
    let mut out = String::new();
    for (i, game) in games.iter().enumerate() {
        let _ = write!(out, "{:>3}. {}", i + 1, game.title());
        if let Some(class) = game.info.time_class.as_deref().filter(|c| !c.is_empty()) {
            let _ = write!(out, "  [{}]", class);
        }
        let _ = writeln!(out, "  {} plies", game.total_plies());
    }
    out
}

/// Every move with its swing and classification; `cursor` is marked.
pub fn move_list(game: &Game, bands: &ClassificationBands, cursor: Option<usize>, color: bool) -> String {
    let mut out = String::new();
    for (i, eval) in game.evaluations.iter().enumerate() {
        let ply = i + 1;
        let class = classify(eval, bands);
        let marker = if cursor == Some(ply) { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:>6} {:<8} {:>+7.2}  {}",
            marker,
            move_number(ply),
            eval.notation,
            eval.swing,
            paint(class, &label(class), color)
        );
    }
    out
}

pub fn notable_points(points: &[NotableSwingPoint], color: bool) -> String {
    if points.is_empty() {
        return "No notable swings.\n".to_string();
    }
    let mut out = String::new();
    for point in points {
        let class = point.classification;
        let _ = writeln!(
            out,
            "  ply {:>3}  {:>6} {:<8} {:>+7.2}  {}",
            point.ply,
            move_number(point.ply),
            point.notation,
            point.swing,
            paint(class, class.as_str(), color)
        );
    }
    out
}

pub fn summary(summary: &ClassificationSummary) -> String {
    let mut out = String::from("              white  black\n");
    for class in Classification::ALL {
        let (white, black) = (summary.white_count(class), summary.black_count(class));
        if white + black > 0 {
            let _ = writeln!(out, "  {:<18} {:>3}    {:>3}", class.as_str(), white, black);
        }
    }
    out
}

/// The board plus a status line describing where the review is.
pub fn frame(frame: &BoardFrame, color: bool) -> String {
    let highlight: Vec<_> = frame
        .last_move
        .map(|mv| vec![mv.from, mv.to])
        .unwrap_or_default();
    let board = DisplayBoard::from_position(&frame.position).render(PieceColor::White, &highlight);

    let mut out = board;
    out.push('\n');
    let _ = write!(out, "ply {}/{}", frame.cursor, frame.total_plies);
    if let (Some(eval), Some(class)) = (&frame.evaluation, frame.classification) {
        let _ = write!(
            out,
            "  {} {} {:+.2} {}",
            move_number(frame.cursor),
            eval.notation,
            eval.swing,
            paint(class, &label(class), color)
        );
    }
    if frame.diverged {
        if let Some(mv) = frame.last_move {
            let _ = write!(out, "  [off the game line after {}; use jump <ply> to return]", mv);
        }
    }
    let _ = write!(out, "\n{} to move\n", frame.position.side_to_move());
    out
}
