//! Match participants and their ring reserves.

use quadring_protocol::{PlayerId, PlayerSeat, RingType};

/// Rings of each color a player starts with.
pub const INITIAL_RESERVE: u8 = 16;

/// One participant of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    id: PlayerId,
    /// Remaining rings, indexed in [`RingType::ALL`] order.
    reserve: [u8; 3],
}

impl Player {
    pub fn new(name: impl Into<String>, id: PlayerId) -> Self {
        Self {
            name: name.into(),
            id,
            reserve: [INITIAL_RESERVE; 3],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    fn slot(ring: RingType) -> usize {
        match ring {
            RingType::Red => 0,
            RingType::Green => 1,
            RingType::Blue => 2,
        }
    }

    /// Rings of `ring` color left in the reserve.
    pub fn ring_amount(&self, ring: RingType) -> u8 {
        self.reserve[Self::slot(ring)]
    }

    pub fn has_ring(&self, ring: RingType) -> bool {
        self.ring_amount(ring) > 0
    }

    /// Takes one ring of `ring` color out of the reserve. Stays at zero
    /// once exhausted.
    pub fn consume_ring(&mut self, ring: RingType) {
        let slot = &mut self.reserve[Self::slot(ring)];
        *slot = slot.saturating_sub(1);
    }
}

impl From<&PlayerSeat> for Player {
    fn from(seat: &PlayerSeat) -> Self {
        Player::new(seat.name.clone(), seat.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_has_full_reserve() {
        let player = Player::new("Urso Generoso", PlayerId(1));
        for ring in RingType::ALL {
            assert_eq!(player.ring_amount(ring), INITIAL_RESERVE);
        }
        assert_eq!(player.name(), "Urso Generoso");
        assert_eq!(player.id(), PlayerId(1));
    }

    #[test]
    fn test_consume_ring_only_touches_that_color() {
        let mut player = Player::new("Onça Veloz", PlayerId(2));
        player.consume_ring(RingType::Green);
        assert_eq!(player.ring_amount(RingType::Green), 15);
        assert_eq!(player.ring_amount(RingType::Red), 16);
        assert_eq!(player.ring_amount(RingType::Blue), 16);
    }

    #[test]
    fn test_reserve_clamps_at_zero() {
        let mut player = Player::new("Rato Bebê", PlayerId(3));
        for _ in 0..16 {
            player.consume_ring(RingType::Blue);
        }
        assert_eq!(player.ring_amount(RingType::Blue), 0);
        assert!(!player.has_ring(RingType::Blue));

        player.consume_ring(RingType::Blue);
        assert_eq!(player.ring_amount(RingType::Blue), 0);
    }

    #[test]
    fn test_from_seat() {
        let seat = PlayerSeat { name: "Arara Ligeira".into(), id: PlayerId(9), order: 2 };
        let player = Player::from(&seat);
        assert_eq!(player.name(), "Arara Ligeira");
        assert_eq!(player.id(), PlayerId(9));
    }
}
