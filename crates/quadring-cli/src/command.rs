//! Parsing of the commands typed during a match.

use std::str::FromStr;

use quadring::prelude::{Position, RingType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `place <color> <row> <col>`
    Place { ring: RingType, at: Position },
    /// `move <row> <col> <row> <col>`
    Move { from: Position, to: Position },
    /// `moves <row> <col>`: list where a cell's content can slide.
    Moves { from: Position },
    Board,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command, type `help`")]
    Empty,
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown color `{0}` (red, green, blue)")]
    Color(String),
    #[error("`{0}` is not a coordinate")]
    Coordinate(String),
}

pub const HELP: &str = "\
commands:
  place <color> <row> <col>     place a ring from your reserve (color: red|green|blue or r|g|b)
  move <row> <col> <row> <col>  slide a cell's rings along a clear line onto an empty cell
  moves <row> <col>             list where that cell's rings can slide
  board                         show the board again
  help                          show this text
  quit                          leave the match";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        match (verb.to_ascii_lowercase().as_str(), args) {
            ("place" | "p", [color, row, col]) => Ok(Command::Place {
                ring: color
                    .parse()
                    .map_err(|_| CommandError::Color((*color).to_string()))?,
                at: position(row, col)?,
            }),
            ("place" | "p", _) => Err(CommandError::Usage("place <color> <row> <col>")),

            ("move" | "m", [r1, c1, r2, c2]) => Ok(Command::Move {
                from: position(r1, c1)?,
                to: position(r2, c2)?,
            }),
            ("move" | "m", _) => Err(CommandError::Usage("move <row> <col> <row> <col>")),

            ("moves", [row, col]) => Ok(Command::Moves {
                from: position(row, col)?,
            }),
            ("moves", _) => Err(CommandError::Usage("moves <row> <col>")),

            ("board" | "b", []) => Ok(Command::Board),
            ("help" | "h" | "?", _) => Ok(Command::Help),
            ("quit" | "q" | "exit", _) => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }
}

fn coordinate(word: &str) -> Result<u8, CommandError> {
    word.parse()
        .map_err(|_| CommandError::Coordinate(word.to_string()))
}

/// Range is left to the board: `place red 7 0` parses and is refused as
/// an illegal action.
fn position(row: &str, col: &str) -> Result<Position, CommandError> {
    Ok(Position::new(coordinate(row)?, coordinate(col)?))
}
