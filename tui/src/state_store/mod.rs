pub use self::message_pane::Scroll;
pub use self::state::{ConnectionStatus, RequestError, State};
pub use self::state_store::{StateStore, StoreConfig};

pub mod action;
mod backend;
mod invite_drop_down;
mod message_pane;
mod request_coalescer;
mod state;
#[allow(clippy::module_inception)]
mod state_store;
