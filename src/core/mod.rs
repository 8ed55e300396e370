//! Shop monitor core: stations, waiting room, state machine and protocol.

pub mod error;
pub mod events;
pub mod protocol;
pub mod shop;
pub mod station;
pub mod stats;
pub mod waiting_room;
pub(crate) mod state;

pub use error::{AppResult, ShopError};
pub use events::{Actor, EventSink, InMemoryEventSink, ShopEvent, ShopEventKind};
pub use protocol::{Arrival, ShopProtocol};
pub use shop::Shop;
pub use station::{Station, StationPhase};
pub use stats::ShopStats;
pub use waiting_room::WaitingRoom;
