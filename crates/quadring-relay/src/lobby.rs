//! Matchmaking state: who is connected, who is waiting, who plays whom.
//!
//! The lobby is plain synchronous data. The relay keeps it behind one
//! mutex and never holds that lock across an `.await`; messages for a
//! player are pushed into that player's outbox and written to the socket
//! by a separate task.

use std::collections::HashMap;

use quadring_protocol::{PeerMessage, PlayerId, PlayerSeat, StartStatus};
use rand::Rng;
use tokio::sync::mpsc;

use crate::RelayError;

/// Where the lobby drops messages for one player.
pub type Outbox = mpsc::UnboundedSender<PeerMessage>;

struct Entry {
    name: String,
    outbox: Outbox,
    opponent: Option<PlayerId>,
}

/// What [`Lobby::find_match`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    /// Nobody else was waiting; the player is now queued.
    Waiting,
    /// The player was paired. `first` moves first.
    Started { opponent: PlayerId, first: PlayerId },
}

#[derive(Default)]
pub struct Lobby {
    players: HashMap<PlayerId, Entry>,
    waiting: Option<PlayerId>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: PlayerId, name: impl Into<String>, outbox: Outbox) {
        self.players.insert(
            id,
            Entry {
                name: name.into(),
                outbox,
                opponent: None,
            },
        );
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn waiting(&self) -> Option<PlayerId> {
        self.waiting
    }

    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        self.players.get(&id).and_then(|e| e.opponent)
    }

    /// Queues `id`, or pairs it with whoever is already queued.
    ///
    /// On pairing, one of the two is drawn with `rng` to move first and
    /// both receive `MatchStarted` from their own point of view.
    pub fn find_match(
        &mut self,
        id: PlayerId,
        rng: &mut impl Rng,
    ) -> Result<Pairing, RelayError> {
        let entry = self.players.get(&id).ok_or(RelayError::UnknownPlayer(id))?;
        if entry.opponent.is_some() {
            return Err(RelayError::AlreadyInMatch(id));
        }

        let opponent = match self.waiting.take() {
            Some(waiting) if waiting != id && self.players.contains_key(&waiting) => waiting,
            _ => {
                self.waiting = Some(id);
                tracing::debug!(player_id = %id, "queued for a match");
                return Ok(Pairing::Waiting);
            }
        };

        let first = if rng.random_bool(0.5) { id } else { opponent };
        let seat = |lobby: &Self, pid: PlayerId| PlayerSeat {
            name: lobby
                .players
                .get(&pid)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            id: pid,
            order: if pid == first { 1 } else { 2 },
        };
        let start = StartStatus {
            local: seat(self, id),
            remote: seat(self, opponent),
        };

        self.set_opponent(id, Some(opponent));
        self.set_opponent(opponent, Some(id));
        self.deliver(opponent, PeerMessage::MatchStarted { start: start.flipped() });
        self.deliver(id, PeerMessage::MatchStarted { start });

        tracing::info!(a = %id, b = %opponent, %first, "match started");
        Ok(Pairing::Started { opponent, first })
    }

    /// Forwards `message` to the sender's opponent and returns who got it.
    pub fn forward(&self, from: PlayerId, message: PeerMessage) -> Result<PlayerId, RelayError> {
        let to = self.opponent_of(from).ok_or(RelayError::NotInMatch(from))?;
        self.deliver(to, message);
        Ok(to)
    }

    /// Takes `id` out of its match or out of the queue. The opponent, if
    /// any, receives `Withdrawal` and becomes free to look for a new
    /// match. Returns the opponent.
    pub fn leave_match(&mut self, id: PlayerId) -> Option<PlayerId> {
        if self.waiting == Some(id) {
            self.waiting = None;
        }
        let opponent = self.players.get_mut(&id)?.opponent.take()?;
        self.set_opponent(opponent, None);
        self.deliver(opponent, PeerMessage::Withdrawal);
        tracing::info!(player_id = %id, %opponent, "player withdrew from match");
        Some(opponent)
    }

    /// Forgets `id` entirely, withdrawing it from any match first.
    pub fn remove(&mut self, id: PlayerId) -> Option<PlayerId> {
        let opponent = self.leave_match(id);
        self.players.remove(&id);
        opponent
    }

    /// Queues a message for one player. A closed outbox means that
    /// player's connection is already going away; its own cleanup will
    /// remove it from the lobby.
    pub fn deliver(&self, to: PlayerId, message: PeerMessage) {
        if let Some(entry) = self.players.get(&to) {
            if entry.outbox.send(message).is_err() {
                tracing::debug!(player_id = %to, "outbox closed, message dropped");
            }
        }
    }

    fn set_opponent(&mut self, id: PlayerId, opponent: Option<PlayerId>) {
        if let Some(entry) = self.players.get_mut(&id) {
            entry.opponent = opponent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadring_protocol::{Movement, Position, RingType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type Inbox = mpsc::UnboundedReceiver<PeerMessage>;

    fn join(lobby: &mut Lobby, id: u64, name: &str) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        lobby.register(PlayerId(id), name, tx);
        rx
    }

    fn started(inbox: &mut Inbox) -> StartStatus {
        match inbox.try_recv() {
            Ok(PeerMessage::MatchStarted { start }) => start,
            other => panic!("expected MatchStarted, got {other:?}"),
        }
    }

    #[test]
    fn test_first_player_waits_second_is_paired() {
        let mut lobby = Lobby::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = join(&mut lobby, 1, "Gato Veloz");
        let mut b = join(&mut lobby, 2, "Onça Ligeira");

        assert_eq!(lobby.find_match(PlayerId(1), &mut rng).unwrap(), Pairing::Waiting);
        assert_eq!(lobby.waiting(), Some(PlayerId(1)));
        assert!(a.try_recv().is_err());

        let pairing = lobby.find_match(PlayerId(2), &mut rng).unwrap();
        let Pairing::Started { opponent, first } = pairing else {
            panic!("expected a match");
        };
        assert_eq!(opponent, PlayerId(1));
        assert_eq!(lobby.waiting(), None);

        let sa = started(&mut a);
        let sb = started(&mut b);
        assert_eq!(sa, sb.flipped());
        assert_eq!(sa.local.name, "Gato Veloz");
        assert_eq!(sa.remote.name, "Onça Ligeira");
        assert_ne!(sa.local_moves_first(), sb.local_moves_first());
        let first_seat = if sa.local_moves_first() { &sa.local } else { &sa.remote };
        assert_eq!(first_seat.id, first);
    }

    #[test]
    fn test_first_mover_draw_varies() {
        let mut firsts = std::collections::HashSet::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..32 {
            let mut lobby = Lobby::new();
            let _a = join(&mut lobby, 1, "A");
            let _b = join(&mut lobby, 2, "B");
            lobby.find_match(PlayerId(1), &mut rng).unwrap();
            if let Pairing::Started { first, .. } = lobby.find_match(PlayerId(2), &mut rng).unwrap() {
                firsts.insert(first);
            }
        }
        assert_eq!(firsts.len(), 2);
    }

    #[test]
    fn test_find_match_twice_while_waiting_stays_queued() {
        let mut lobby = Lobby::new();
        let mut rng = StdRng::seed_from_u64(1);
        let _a = join(&mut lobby, 1, "A");
        lobby.find_match(PlayerId(1), &mut rng).unwrap();
        assert_eq!(lobby.find_match(PlayerId(1), &mut rng).unwrap(), Pairing::Waiting);
        assert_eq!(lobby.waiting(), Some(PlayerId(1)));
    }

    #[test]
    fn test_find_match_while_playing_is_rejected() {
        let mut lobby = Lobby::new();
        let mut rng = StdRng::seed_from_u64(1);
        let _a = join(&mut lobby, 1, "A");
        let _b = join(&mut lobby, 2, "B");
        lobby.find_match(PlayerId(1), &mut rng).unwrap();
        lobby.find_match(PlayerId(2), &mut rng).unwrap();
        assert!(matches!(
            lobby.find_match(PlayerId(2), &mut rng),
            Err(RelayError::AlreadyInMatch(PlayerId(2)))
        ));
        assert!(matches!(
            lobby.find_match(PlayerId(9), &mut rng),
            Err(RelayError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn test_forward_reaches_opponent_only() {
        let mut lobby = Lobby::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut a = join(&mut lobby, 1, "A");
        let mut b = join(&mut lobby, 2, "B");
        let mut c = join(&mut lobby, 3, "C");

        let movement = Movement::place_ring(Position::new(0, 0), RingType::Green);
        assert!(matches!(
            lobby.forward(PlayerId(1), PeerMessage::Move { movement }),
            Err(RelayError::NotInMatch(_))
        ));

        lobby.find_match(PlayerId(1), &mut rng).unwrap();
        lobby.find_match(PlayerId(2), &mut rng).unwrap();
        started(&mut a);
        started(&mut b);

        let to = lobby.forward(PlayerId(1), PeerMessage::Move { movement }).unwrap();
        assert_eq!(to, PlayerId(2));
        assert_eq!(b.try_recv().unwrap(), PeerMessage::Move { movement });
        assert!(a.try_recv().is_err());
        assert!(c.try_recv().is_err());
    }

    #[test]
    fn test_leave_match_notifies_and_frees_opponent() {
        let mut lobby = Lobby::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut a = join(&mut lobby, 1, "A");
        let mut b = join(&mut lobby, 2, "B");
        lobby.find_match(PlayerId(1), &mut rng).unwrap();
        lobby.find_match(PlayerId(2), &mut rng).unwrap();
        started(&mut a);
        started(&mut b);

        assert_eq!(lobby.leave_match(PlayerId(1)), Some(PlayerId(2)));
        assert_eq!(b.try_recv().unwrap(), PeerMessage::Withdrawal);
        assert!(a.try_recv().is_err());
        assert_eq!(lobby.opponent_of(PlayerId(2)), None);

        // Free to queue again.
        assert_eq!(lobby.find_match(PlayerId(2), &mut rng).unwrap(), Pairing::Waiting);
        assert_eq!(lobby.leave_match(PlayerId(1)), None);
    }

    #[test]
    fn test_remove_clears_queue_and_match() {
        let mut lobby = Lobby::new();
        let mut rng = StdRng::seed_from_u64(9);
        let _a = join(&mut lobby, 1, "A");
        lobby.find_match(PlayerId(1), &mut rng).unwrap();
        lobby.remove(PlayerId(1));
        assert_eq!(lobby.waiting(), None);
        assert_eq!(lobby.player_count(), 0);

        let mut b = join(&mut lobby, 2, "B");
        let mut c = join(&mut lobby, 3, "C");
        lobby.find_match(PlayerId(2), &mut rng).unwrap();
        lobby.find_match(PlayerId(3), &mut rng).unwrap();
        started(&mut b);
        started(&mut c);
        assert_eq!(lobby.remove(PlayerId(3)), Some(PlayerId(2)));
        assert_eq!(b.try_recv().unwrap(), PeerMessage::Withdrawal);
        assert_eq!(lobby.player_count(), 1);
    }
}
