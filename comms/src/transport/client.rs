use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use tracing::debug;

use crate::{
    command::{DisplayCommand, InvitationAnswer, MainPageCommand},
    endpoint::{self, DISPLAY_PATH, MAIN_PAGE_PATH},
    fragment::{self, FragmentKind, FragmentUpdate, PageContext, RoomLink, StatusClass},
    Error,
};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [HttpClient] talks to one chat server over HTTP.
///
/// Every request carries `Cache-Control: no-cache` and `Pragma: no-cache`.
/// The server answers an unchanged fragment with 304, and a cache answering
/// a poll with a stored 200 would repaint stale content.
///
/// Redirects are not followed: the main page answers a POST with a wrong form
/// password by redirecting to itself, which has to surface as an error.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Loads the full room page and reads the [PageContext] from it.
    pub async fn load_page(&self, room: &str) -> Result<PageContext, Error> {
        let url = endpoint::url(&self.base_url, DISPLAY_PATH);
        debug!(%url, room, "loading room page");

        let response = self.http.get(&url).query(&[("room", room)]).send().await?;
        let body = success_body(response, url).await?;

        PageContext::from_page(&fragment::parse(&body))
    }

    /// Polls a single fragment.
    ///
    /// # Returns
    ///
    /// - [FragmentUpdate::Changed] with the fragment html on a 200
    /// - [FragmentUpdate::Unchanged] on a 304 or any other success
    /// - [Error::Status] for every other status
    pub async fn fetch_fragment(
        &self,
        room: &str,
        kind: FragmentKind,
    ) -> Result<FragmentUpdate, Error> {
        let url = endpoint::url(&self.base_url, kind.path());
        let response = self.http.get(&url).query(&kind.query(room)).send().await?;
        let status = response.status().as_u16();
        debug!(%kind, status, "polled fragment");

        match StatusClass::of(status) {
            StatusClass::Repaint => Ok(FragmentUpdate::Changed(response.text().await?)),
            StatusClass::Keep => Ok(FragmentUpdate::Unchanged),
            StatusClass::Failed => Err(Error::Status { status, url }),
        }
    }

    /// POSTs a [DisplayCommand] for the room.
    pub async fn send_command(
        &self,
        room: &str,
        form_password: &str,
        command: DisplayCommand,
    ) -> Result<(), Error> {
        let url = endpoint::url(&self.base_url, DISPLAY_PATH);
        let form = command.into_form(room, form_password);

        let response = self.http.post(&url).form(&form).send().await?;
        success_body(response, url).await?;

        Ok(())
    }

    /// Loads the main page and reads the rooms of the local node from it.
    pub async fn load_rooms(&self) -> Result<Vec<RoomLink>, Error> {
        let url = endpoint::url(&self.base_url, MAIN_PAGE_PATH);
        debug!(%url, "loading room listing");

        let response = self.http.get(&url).send().await?;
        let body = success_body(response, url).await?;

        Ok(fragment::parse(&body).room_listing())
    }

    /// POSTs a [MainPageCommand], leaving or creating a room.
    pub async fn send_main_page_command(
        &self,
        form_password: &str,
        command: MainPageCommand,
    ) -> Result<(), Error> {
        let url = endpoint::url(&self.base_url, MAIN_PAGE_PATH);
        let form = command.into_form(form_password);

        let response = self.http.post(&url).form(&form).send().await?;
        success_body(response, url).await?;

        Ok(())
    }

    /// Accepts or rejects a pending invitation.
    pub async fn answer_invitation(&self, answer: &InvitationAnswer) -> Result<(), Error> {
        let url = endpoint::url(&self.base_url, MAIN_PAGE_PATH);

        let response = self.http.get(&url).query(&answer.query()).send().await?;
        success_body(response, url).await?;

        Ok(())
    }
}

async fn success_body(response: reqwest::Response, url: String) -> Result<String, Error> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            url,
        });
    }

    Ok(response.text().await?)
}
