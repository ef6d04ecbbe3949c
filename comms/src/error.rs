/// Errors that can occur while talking to the chat server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or its body could not be read.
    #[cfg(feature = "client")]
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server replied with a status code that is neither a success nor "not modified".
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    /// The room page did not carry a field the client needs.
    #[error("the room page has no `{0}` field")]
    MissingField(&'static str),
}
