/// HTTP client for a single chat server: page loading, fragment polling and form submission
#[cfg(feature = "client")]
pub mod client;
