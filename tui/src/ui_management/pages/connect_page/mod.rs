pub use self::connect_page::ConnectPage;

#[allow(clippy::module_inception)]
mod connect_page;
