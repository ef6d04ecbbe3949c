pub use self::chat_page::{message_pane_size, ChatPage};

#[allow(clippy::module_inception)]
mod chat_page;
mod components;
mod section;
