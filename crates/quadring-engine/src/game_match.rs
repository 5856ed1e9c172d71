//! One match between a local and a remote player.
//!
//! The state machine is small:
//!
//! ```text
//!                 evaluate_round() == None
//!   AwaitingLocalMove  ⇄  AwaitingRemoteMove
//!          │                     │
//!          └──────┬──────────────┘
//!                 ▼  line found, or withdrawal
//!               Ended
//! ```
//!
//! Each peer owns one `GameMatch`. An action is applied on the mover's
//! instance through [`GameMatch::place_ring`] / [`GameMatch::move_cell_content`]
//! and on the opponent's through [`GameMatch::receive_move`]. Both then
//! call [`GameMatch::evaluate_round`], so both boards, both reserves, and
//! both verdicts stay in step without sharing memory.

use std::fmt;

use quadring_protocol::{Action, Movement, Position, RingType, StartStatus};

use crate::{Board, EngineError, Line, Player};

/// Who performs an action, from this instance's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

/// Where the match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    AwaitingLocalMove,
    AwaitingRemoteMove,
    Ended,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingLocalMove => write!(f, "AwaitingLocalMove"),
            Self::AwaitingRemoteMove => write!(f, "AwaitingRemoteMove"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A line was formed. `local_won` is true when the local player made
    /// the completing move.
    Line { line: Line, local_won: bool },
    /// The opponent left; there is no winning line.
    Withdrawal,
}

impl MatchOutcome {
    /// The status line a front end shows for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Line { local_won: true, .. } => "Victory",
            Self::Line { local_won: false, .. } => "Defeat",
            Self::Withdrawal => "Adversary Escaped",
        }
    }

    pub fn winning_line(&self) -> Option<&Line> {
        match self {
            Self::Line { line, .. } => Some(line),
            Self::Withdrawal => None,
        }
    }
}

/// One match: the board, both players, and whose turn it is.
#[derive(Debug, Clone)]
pub struct GameMatch {
    local_turn: bool,
    local_player: Player,
    remote_player: Player,
    board: Board,
    outcome: Option<MatchOutcome>,
}

impl GameMatch {
    /// Starts a match on an empty board.
    pub fn new(local_turn: bool, local_player: Player, remote_player: Player) -> Self {
        tracing::info!(
            local = %local_player.id(),
            remote = %remote_player.id(),
            local_turn,
            "match created"
        );
        Self {
            local_turn,
            local_player,
            remote_player,
            board: Board::new(),
            outcome: None,
        }
    }

    /// Builds the match announced by the relay. The local player moves
    /// first when its seat has order 1.
    pub fn from_start(start: &StartStatus) -> Self {
        Self::new(
            start.local_moves_first(),
            Player::from(&start.local),
            Player::from(&start.remote),
        )
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn local_player(&self) -> &Player {
        &self.local_player
    }

    pub fn remote_player(&self) -> &Player {
        &self.remote_player
    }

    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::Local => &self.local_player,
            Side::Remote => &self.remote_player,
        }
    }

    fn player_mut(&mut self, side: Side) -> &mut Player {
        match side {
            Side::Local => &mut self.local_player,
            Side::Remote => &mut self.remote_player,
        }
    }

    /// `true` iff the local player is the one expected to act.
    pub fn is_local_turn(&self) -> bool {
        self.local_turn
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn phase(&self) -> MatchPhase {
        match (&self.outcome, self.local_turn) {
            (Some(_), _) => MatchPhase::Ended,
            (None, true) => MatchPhase::AwaitingLocalMove,
            (None, false) => MatchPhase::AwaitingRemoteMove,
        }
    }

    /// "Your Turn" / "Their Turn" while playing, then the outcome message.
    pub fn status_message(&self) -> &'static str {
        match (&self.outcome, self.local_turn) {
            (Some(outcome), _) => outcome.message(),
            (None, true) => "Your Turn",
            (None, false) => "Their Turn",
        }
    }

    /// Places a ring of `ring` color from `side`'s reserve onto
    /// `destination`.
    ///
    /// Returns `None` without changing anything if the board refuses the
    /// ring (off the grid, or that color is already on the cell) or the
    /// match is over. The reserve count is not checked here: callers only
    /// offer colors the player still has.
    pub fn place_ring(
        &mut self,
        ring: RingType,
        destination: Position,
        side: Side,
    ) -> Option<Movement> {
        if self.is_finished() || !self.board.insert_ring(destination, ring) {
            return None;
        }
        let player = self.player_mut(side);
        player.consume_ring(ring);
        tracing::debug!(
            player = %player.id(),
            %ring,
            %destination,
            left = player.ring_amount(ring),
            "ring placed"
        );
        Some(Movement::place_ring(destination, ring))
    }

    /// Slides the content of `origin` to `destination`.
    ///
    /// Returns `None` without changing anything if the slide is illegal
    /// or the match is over.
    pub fn move_cell_content(
        &mut self,
        origin: Position,
        destination: Position,
    ) -> Option<Movement> {
        if self.is_finished() || !self.board.move_content(origin, destination) {
            return None;
        }
        tracing::debug!(%origin, %destination, "cell content moved");
        Some(Movement::move_cell_content(origin, destination))
    }

    /// Replays a movement made by the remote player.
    ///
    /// The remote peer is trusted to send legal movements, so a failure
    /// here means the two boards have diverged or the transport delivered
    /// garbage.
    ///
    /// # Errors
    /// - [`EngineError::OutOfBounds`] if a coordinate is off the grid
    /// - [`EngineError::Desync`] if the board refuses the movement
    /// - [`EngineError::MatchOver`] if the match already ended
    pub fn receive_move(&mut self, movement: &Movement) -> Result<(), EngineError> {
        if self.is_finished() {
            return Err(EngineError::MatchOver);
        }
        for pos in [Some(movement.destination()), movement.origin()]
            .into_iter()
            .flatten()
        {
            if !Board::contains(pos) {
                return Err(EngineError::OutOfBounds(pos));
            }
        }

        let applied = match movement.action() {
            Action::PlaceRing { destination, ring_type } => {
                self.place_ring(ring_type, destination, Side::Remote)
            }
            Action::MoveCellContent { origin, destination } => {
                self.move_cell_content(origin, destination)
            }
        };

        match applied {
            Some(_) => Ok(()),
            None => {
                tracing::warn!(?movement, "remote movement rejected by local board");
                Err(EngineError::Desync(*movement))
            }
        }
    }

    /// Closes the round that just happened.
    ///
    /// If the board has no line, the turn passes to the other side and
    /// `None` is returned. If it has one, the turn is frozen (so
    /// `is_local_turn` still names the player who completed it), the
    /// outcome is recorded, and the line is returned. After the match
    /// ended this keeps returning the recorded line and never flips.
    pub fn evaluate_round(&mut self) -> Option<Line> {
        match self.outcome {
            Some(MatchOutcome::Line { line, .. }) => return Some(line),
            Some(MatchOutcome::Withdrawal) => return None,
            None => {}
        }

        match self.board.check_end_condition() {
            Some(line) => {
                let outcome = MatchOutcome::Line {
                    line,
                    local_won: self.local_turn,
                };
                tracing::info!(kind = ?line.kind, result = outcome.message(), "match ended");
                self.outcome = Some(outcome);
                Some(line)
            }
            None => {
                self.switch_turn();
                None
            }
        }
    }

    /// Flips the turn and returns the new `is_local_turn`.
    pub fn switch_turn(&mut self) -> bool {
        self.local_turn = !self.local_turn;
        self.local_turn
    }

    /// The opponent left. Ends the match with no winning line, unless it
    /// had already ended.
    pub fn receive_withdrawal(&mut self) -> &MatchOutcome {
        if self.outcome.is_none() {
            tracing::info!(remote = %self.remote_player.id(), "opponent withdrew");
        }
        self.outcome.get_or_insert(MatchOutcome::Withdrawal)
    }
}
