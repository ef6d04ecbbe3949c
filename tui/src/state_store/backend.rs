use async_trait::async_trait;
use comms::{
    command::{DisplayCommand, InvitationAnswer, MainPageCommand},
    fragment::{FragmentKind, FragmentUpdate, PageContext, RoomLink},
    transport::client::HttpClient,
    Error,
};

/// The requests the state store makes against a chat server
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn load_page(&self, room: &str) -> Result<PageContext, Error>;

    async fn fetch_fragment(&self, room: &str, kind: FragmentKind)
        -> Result<FragmentUpdate, Error>;

    async fn send_command(
        &self,
        room: &str,
        form_password: &str,
        command: DisplayCommand,
    ) -> Result<(), Error>;

    async fn answer_invitation(&self, answer: &InvitationAnswer) -> Result<(), Error>;

    async fn load_rooms(&self) -> Result<Vec<RoomLink>, Error>;

    async fn send_main_page_command(
        &self,
        form_password: &str,
        command: MainPageCommand,
    ) -> Result<(), Error>;
}

#[async_trait]
impl ChatBackend for HttpClient {
    async fn load_page(&self, room: &str) -> Result<PageContext, Error> {
        HttpClient::load_page(self, room).await
    }

    async fn fetch_fragment(
        &self,
        room: &str,
        kind: FragmentKind,
    ) -> Result<FragmentUpdate, Error> {
        HttpClient::fetch_fragment(self, room, kind).await
    }

    async fn send_command(
        &self,
        room: &str,
        form_password: &str,
        command: DisplayCommand,
    ) -> Result<(), Error> {
        HttpClient::send_command(self, room, form_password, command).await
    }

    async fn answer_invitation(&self, answer: &InvitationAnswer) -> Result<(), Error> {
        HttpClient::answer_invitation(self, answer).await
    }

    async fn load_rooms(&self) -> Result<Vec<RoomLink>, Error> {
        HttpClient::load_rooms(self).await
    }

    async fn send_main_page_command(
        &self,
        form_password: &str,
        command: MainPageCommand,
    ) -> Result<(), Error> {
        HttpClient::send_main_page_command(self, form_password, command).await
    }
}
