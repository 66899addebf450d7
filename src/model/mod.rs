//! Domain models shared between the monitor, the services and the Discord layer.
//!
//! Models here carry no Discord or subprocess types; conversion to serenity builders
//! happens in the `bot` module.

pub mod command;
pub mod membership;
pub mod server_state;
pub mod status;
