//! Process wiring: logging, state construction, the HTTP server and shutdown.

mod bootstrap;
mod cors;
mod health;
mod server;
mod shutdown;

pub use bootstrap::*;
pub use cors::*;
pub use health::*;
pub use server::*;
pub use shutdown::*;
