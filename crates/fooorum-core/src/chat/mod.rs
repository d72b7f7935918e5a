//! Live chat room client.
//!
//! [`transport::ChatTransport`] is mounted once per chat view. It seeds a
//! [`feed::MessageFeed`] from the history endpoint, keeps a supervised socket
//! connection alive, and prunes the feed on a fixed cadence. The socket and
//! history endpoint are reached through the traits in [`ports`].

pub mod draft;
pub mod events;
pub mod feed;
pub mod ports;
pub mod seen;
pub mod transport;

pub use draft::Draft;
pub use events::{ChatEvent, ChatEventBus};
pub use feed::MessageFeed;
pub use transport::{ChatTransport, TransportSettings};
