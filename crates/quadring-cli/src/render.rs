//! Text rendering for the terminal front end.

use std::fmt::Write;

use quadring::prelude::{GameMatch, Movement, Player, Position, RingType, StartStatus};
use quadring::protocol::Action;

/// "Tigre Veloz (you) vs Onça Ligeira, you move first"
pub fn match_header(start: &StartStatus) -> String {
    let order = if start.local_moves_first() {
        "you move first"
    } else {
        "they move first"
    };
    format!("{} (you) vs {}, {order}", start.local.name, start.remote.name)
}

fn reserve(player: &Player) -> String {
    RingType::ALL
        .iter()
        .map(|&ring| format!("{ring} {:>2}", player.ring_amount(ring)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Board, both reserves, and the status line.
pub fn render_match(game: &GameMatch) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", game.board());
    let _ = writeln!(out);
    let _ = writeln!(out, "you   {}", reserve(game.local_player()));
    let _ = writeln!(out, "them  {}", reserve(game.remote_player()));
    let _ = write!(out, "== {} ==", game.status_message());
    if let Some(line) = game.outcome().and_then(|o| o.winning_line()) {
        let cells: Vec<String> = line.cells.iter().map(Position::to_string).collect();
        let _ = write!(out, "\nline: {}", cells.join(" "));
    }
    out
}

pub fn describe(movement: &Movement) -> String {
    match movement.action() {
        Action::PlaceRing { destination, ring_type } => {
            format!("placed {ring_type} at {destination}")
        }
        Action::MoveCellContent { origin, destination } => {
            format!("moved {origin} to {destination}")
        }
    }
}

pub fn destinations(from: Position, targets: &[Position]) -> String {
    if targets.is_empty() {
        return format!("nothing at {from} can move");
    }
    let list: Vec<String> = targets.iter().map(Position::to_string).collect();
    format!("{from} can slide to {}", list.join(" "))
}
