//! Movements: the record of one completed action.
//!
//! A [`Movement`] is built by the engine after it applies a placement or
//! a slide, gets a [`MatchStatus`] attached by the mover, and is then sent
//! to the opponent, who replays it.
//!
//! On the wire a movement is a *flat* record:
//!
//! ```json
//! {"match_status": "next", "type": 0, "destination": [1, 2],
//!  "origin": null, "ring_type": "red"}
//! ```
//!
//! In Rust it's a tagged union ([`Action`]), so a placement can never be
//! missing its color and a slide can never be missing its origin. The
//! conversion between the two shapes happens in the private
//! `MovementRecord` type, which serde goes through via
//! `#[serde(try_from, into)]`.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{Position, ProtocolError, RingType};

/// The numeric move type on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum MoveKind {
    PlaceRing = 0,
    MoveCellContent = 1,
}

/// Whether the match continues after this movement, as judged by the
/// mover. Advisory: the receiver evaluates the board on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Next,
    Finished,
}

/// What was done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// A ring from the mover's reserve was placed on `destination`.
    PlaceRing {
        destination: Position,
        ring_type: RingType,
    },
    /// The whole content of `origin` slid to `destination`.
    MoveCellContent {
        origin: Position,
        destination: Position,
    },
}

/// One completed action plus the mover's view of the match status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MovementRecord", into = "MovementRecord")]
pub struct Movement {
    action: Action,
    match_status: Option<MatchStatus>,
}

impl Movement {
    /// A ring placement with no status attached yet.
    pub fn place_ring(destination: Position, ring_type: RingType) -> Self {
        Self {
            action: Action::PlaceRing { destination, ring_type },
            match_status: None,
        }
    }

    /// A content slide with no status attached yet.
    pub fn move_cell_content(origin: Position, destination: Position) -> Self {
        Self {
            action: Action::MoveCellContent { origin, destination },
            match_status: None,
        }
    }

    /// Returns this movement with `status` attached. This is the only
    /// change a movement ever sees after it is built.
    #[must_use]
    pub fn with_match_status(mut self, status: MatchStatus) -> Self {
        self.match_status = Some(status);
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn kind(&self) -> MoveKind {
        match self.action {
            Action::PlaceRing { .. } => MoveKind::PlaceRing,
            Action::MoveCellContent { .. } => MoveKind::MoveCellContent,
        }
    }

    pub fn destination(&self) -> Position {
        match self.action {
            Action::PlaceRing { destination, .. }
            | Action::MoveCellContent { destination, .. } => destination,
        }
    }

    /// The slide origin; `None` for placements.
    pub fn origin(&self) -> Option<Position> {
        match self.action {
            Action::MoveCellContent { origin, .. } => Some(origin),
            Action::PlaceRing { .. } => None,
        }
    }

    /// The placed color; `None` for slides.
    pub fn ring_type(&self) -> Option<RingType> {
        match self.action {
            Action::PlaceRing { ring_type, .. } => Some(ring_type),
            Action::MoveCellContent { .. } => None,
        }
    }

    pub fn match_status(&self) -> Option<MatchStatus> {
        self.match_status
    }
}

// ---------------------------------------------------------------------------
// Wire record
// ---------------------------------------------------------------------------

/// The flat shape of a movement on the wire. Private: callers only ever
/// see [`Movement`].
#[derive(Serialize, Deserialize)]
struct MovementRecord {
    #[serde(default)]
    match_status: Option<MatchStatus>,
    #[serde(rename = "type")]
    kind: MoveKind,
    destination: Position,
    #[serde(default)]
    origin: Option<Position>,
    #[serde(default)]
    ring_type: Option<RingType>,
}

impl From<Movement> for MovementRecord {
    fn from(movement: Movement) -> Self {
        Self {
            match_status: movement.match_status,
            kind: movement.kind(),
            destination: movement.destination(),
            origin: movement.origin(),
            ring_type: movement.ring_type(),
        }
    }
}

impl TryFrom<MovementRecord> for Movement {
    type Error = ProtocolError;

    /// Picks the variant from `type`. Fields belonging to the other
    /// variant are ignored; fields the chosen variant needs must be there.
    fn try_from(record: MovementRecord) -> Result<Self, Self::Error> {
        let action = match record.kind {
            MoveKind::PlaceRing => Action::PlaceRing {
                destination: record.destination,
                ring_type: record.ring_type.ok_or_else(|| {
                    ProtocolError::InvalidMessage(
                        "ring placement without ring_type".into(),
                    )
                })?,
            },
            MoveKind::MoveCellContent => Action::MoveCellContent {
                origin: record.origin.ok_or_else(|| {
                    ProtocolError::InvalidMessage(
                        "cell content move without origin".into(),
                    )
                })?,
                destination: record.destination,
            },
        };
        Ok(Self {
            action,
            match_status: record.match_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(m: &Movement) -> serde_json::Value {
        serde_json::to_value(m).unwrap()
    }

    fn unwire(v: serde_json::Value) -> Result<Movement, serde_json::Error> {
        serde_json::from_value(v)
    }

    #[test]
    fn test_place_ring_record_shape() {
        let m = Movement::place_ring(Position::new(1, 2), RingType::Green)
            .with_match_status(MatchStatus::Next);
        assert_eq!(
            wire(&m),
            json!({
                "match_status": "next",
                "type": 0,
                "destination": [1, 2],
                "origin": null,
                "ring_type": "green",
            })
        );
    }

    #[test]
    fn test_move_cell_content_record_shape() {
        let m = Movement::move_cell_content(Position::new(3, 0), Position::new(0, 3))
            .with_match_status(MatchStatus::Finished);
        assert_eq!(
            wire(&m),
            json!({
                "match_status": "finished",
                "type": 1,
                "destination": [0, 3],
                "origin": [3, 0],
                "ring_type": null,
            })
        );
    }

    #[test]
    fn test_roundtrip_preserves_every_field() {
        let samples = [
            Movement::place_ring(Position::new(0, 0), RingType::Red),
            Movement::place_ring(Position::new(3, 3), RingType::Blue)
                .with_match_status(MatchStatus::Finished),
            Movement::move_cell_content(Position::new(1, 1), Position::new(2, 2)),
            Movement::move_cell_content(Position::new(0, 3), Position::new(3, 3))
                .with_match_status(MatchStatus::Next),
        ];
        for m in samples {
            let back = unwire(wire(&m)).unwrap();
            assert_eq!(back, m);
            assert_eq!(back.kind(), m.kind());
            assert_eq!(back.origin(), m.origin());
            assert_eq!(back.ring_type(), m.ring_type());
            assert_eq!(back.match_status(), m.match_status());
        }
    }

    #[test]
    fn test_decode_ignores_other_variants_fields() {
        // A placement carrying a stray origin is still a placement.
        let m = unwire(json!({
            "match_status": null,
            "type": 0,
            "destination": [2, 2],
            "origin": [1, 1],
            "ring_type": "blue",
        }))
        .unwrap();
        assert_eq!(m.kind(), MoveKind::PlaceRing);
        assert_eq!(m.origin(), None);
        assert_eq!(m.ring_type(), Some(RingType::Blue));
    }

    #[test]
    fn test_decode_tolerates_absent_optional_fields() {
        let m = unwire(json!({ "type": 1, "destination": [0, 1], "origin": [0, 0] })).unwrap();
        assert_eq!(m.match_status(), None);
        assert_eq!(m.ring_type(), None);
    }

    #[test]
    fn test_decode_rejects_placement_without_color() {
        let err = unwire(json!({ "type": 0, "destination": [0, 0], "ring_type": null }))
            .unwrap_err();
        assert!(err.to_string().contains("ring_type"));
    }

    #[test]
    fn test_decode_rejects_slide_without_origin() {
        let err = unwire(json!({ "type": 1, "destination": [0, 0] })).unwrap_err();
        assert!(err.to_string().contains("origin"));
    }

    #[test]
    fn test_decode_rejects_unknown_move_type() {
        assert!(unwire(json!({ "type": 2, "destination": [0, 0] })).is_err());
    }

    #[test]
    fn test_with_match_status_touches_nothing_else() {
        let m = Movement::place_ring(Position::new(2, 1), RingType::Red);
        let sealed = m.with_match_status(MatchStatus::Next);
        assert_eq!(sealed.action(), m.action());
        assert_eq!(m.match_status(), None);
        assert_eq!(sealed.match_status(), Some(MatchStatus::Next));
    }
}
