//! # Quadring
//!
//! A two-player strategy game on a 4×4 grid. Players place colored rings
//! from their reserves and slide cell contents along clear lines; whoever
//! completes a row, column or diagonal of four identical cells wins.
//!
//! Each peer runs its own engine. Peers meet at a relay, which pairs them
//! and forwards every movement; each side replays the other's movements,
//! so both boards stay identical without shared state.
//!
//! This crate ties the layers together: transport → protocol → engine,
//! plus the relay and the peer session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quadring::prelude::*;
//!
//! # async fn play() -> Result<(), QuadringError> {
//! let config = ClientConfig::default().with_server_url("ws://127.0.0.1:9000");
//! let client = PeerClient::connect(&config).await?;
//! let mut session = client.find_match().await?;
//!
//! if session.game().is_local_turn() {
//!     session.place_ring(RingType::Red, Position::new(0, 0)).await?;
//! }
//! match session.next_event().await? {
//!     SessionEvent::RemoteMoved(movement) => println!("{movement:?}"),
//!     SessionEvent::OpponentEscaped => println!("{}", session.game().status_message()),
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod names;
mod session;

pub use error::{QuadringError, SessionError};
pub use session::{ClientConfig, MatchSession, PeerClient, SessionEvent};

pub use quadring_engine as engine;
pub use quadring_protocol as protocol;
pub use quadring_relay as relay;
pub use quadring_transport as transport;

/// Everything a front end usually needs.
pub mod prelude {
    pub use crate::names::random_player_name;
    pub use crate::{ClientConfig, MatchSession, PeerClient, QuadringError, SessionError, SessionEvent};
    pub use quadring_engine::{
        BOARD_SIZE, Board, GameMatch, Line, LineKind, MatchOutcome, MatchPhase, Player, Side,
    };
    pub use quadring_protocol::{Movement, PlayerId, Position, RingType, StartStatus};
    pub use quadring_relay::{RelayConfig, RelayServer};
}
