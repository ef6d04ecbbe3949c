/// Form commands the client POSTs (or GETs) to change server state
pub mod command;
/// Endpoint paths shared by the client and the server
pub mod endpoint;
/// Errors produced while loading the room page or talking to the server
pub mod error;
/// Server-rendered HTML fragments, the 200/304 change contract and a small reader for them
pub mod fragment;
/// Implementation of fragment polling and command submission over HTTP.
/// Requires the 'client' feature, which brings in reqwest.
pub mod transport;

pub use error::Error;
