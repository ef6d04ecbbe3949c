use serde::{Deserialize, Serialize};

use crate::endpoint::{self, ONLY};

/// A lenient reader for the HTML the server renders
pub mod html;
/// Typed views on top of parsed fragments
pub mod view;

pub use html::{parse, Element, Node};
pub use view::{Invitation, InviteOption, PageContext, RoomLink};

/// A region of the page the server renders on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    MessagesPane,
    ParticipantsList,
    InviteDropDown,
    InvitationTable,
}

impl FragmentKind {
    /// Every fragment the client keeps up to date
    pub const ALL: [FragmentKind; 4] = [
        FragmentKind::MessagesPane,
        FragmentKind::ParticipantsList,
        FragmentKind::InviteDropDown,
        FragmentKind::InvitationTable,
    ];

    /// Name of the query parameter that selects this fragment.
    pub fn selector(&self) -> &'static str {
        match self {
            FragmentKind::MessagesPane => "messagesPane",
            FragmentKind::ParticipantsList => "participantsList",
            FragmentKind::InviteDropDown => "inviteDropDown",
            FragmentKind::InvitationTable => "invitationTable",
        }
    }

    /// Endpoint serving this fragment.
    pub fn path(&self) -> &'static str {
        match self {
            FragmentKind::InvitationTable => endpoint::MAIN_PAGE_PATH,
            _ => endpoint::DISPLAY_PATH,
        }
    }

    /// Id of the element wrapping this fragment on the full page.
    pub fn container_id(&self) -> &'static str {
        match self {
            FragmentKind::MessagesPane => "messages-pane",
            FragmentKind::ParticipantsList => "participants-list",
            FragmentKind::InviteDropDown => "invite-container",
            FragmentKind::InvitationTable => "invitationContainer",
        }
    }

    /// Query pairs for polling this fragment. The invitation table is not bound to a room.
    pub fn query<'a>(&self, room: &'a str) -> Vec<(&'static str, &'a str)> {
        match self {
            FragmentKind::InvitationTable => vec![(self.selector(), ONLY)],
            _ => vec![("room", room), (self.selector(), ONLY)],
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.selector())
    }
}

/// Outcome of polling a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentUpdate {
    /// The server sent new content for the region
    Changed(String),
    /// Nothing changed since the last poll
    Unchanged,
}

/// How the client treats a response status for a fragment poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200: content changed, repaint
    Repaint,
    /// 304 and other successes: leave the region alone
    Keep,
    /// anything else
    Failed,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200 => StatusClass::Repaint,
            304 | 201..=299 => StatusClass::Keep,
            _ => StatusClass::Failed,
        }
    }
}

/// Query string of a GET on the room page, as the server sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayQuery {
    pub room: Option<String>,
    #[serde(rename = "messagesPane")]
    pub messages_pane: Option<String>,
    #[serde(rename = "participantsList")]
    pub participants_list: Option<String>,
    #[serde(rename = "inviteDropDown")]
    pub invite_drop_down: Option<String>,
}

impl DisplayQuery {
    /// The fragment asked for, or `None` when the full page is wanted.
    pub fn fragment(&self) -> Option<FragmentKind> {
        if self.messages_pane.is_some() {
            Some(FragmentKind::MessagesPane)
        } else if self.participants_list.is_some() {
            Some(FragmentKind::ParticipantsList)
        } else if self.invite_drop_down.is_some() {
            Some(FragmentKind::InviteDropDown)
        } else {
            None
        }
    }
}

/// Query string of a GET on the main page, as the server sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainPageQuery {
    pub accept: Option<String>,
    pub reject: Option<String>,
    #[serde(rename = "invitationTable")]
    pub invitation_table: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_fragment_query() {
        assert_eq!(
            FragmentKind::MessagesPane.query("12"),
            vec![("room", "12"), ("messagesPane", "only")]
        );
        assert_eq!(
            FragmentKind::InviteDropDown.query("12"),
            vec![("room", "12"), ("inviteDropDown", "only")]
        );
        assert_eq!(FragmentKind::ParticipantsList.path(), endpoint::DISPLAY_PATH);
    }

    #[test]
    fn test_invitation_table_query_has_no_room() {
        assert_eq!(
            FragmentKind::InvitationTable.query("12"),
            vec![("invitationTable", "only")]
        );
        assert_eq!(FragmentKind::InvitationTable.path(), endpoint::MAIN_PAGE_PATH);
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(StatusClass::of(200), StatusClass::Repaint);
        assert_eq!(StatusClass::of(304), StatusClass::Keep);
        assert_eq!(StatusClass::of(204), StatusClass::Keep);
        assert_eq!(StatusClass::of(500), StatusClass::Failed);
        assert_eq!(StatusClass::of(403), StatusClass::Failed);
    }

    #[test]
    fn test_display_query_selects_fragment() {
        let query: DisplayQuery =
            serde_urlencoded::from_str("room=3&participantsList=only").unwrap();
        assert_eq!(query.room.as_deref(), Some("3"));
        assert_eq!(query.fragment(), Some(FragmentKind::ParticipantsList));

        let query: DisplayQuery = serde_urlencoded::from_str("room=3").unwrap();
        assert_eq!(query.fragment(), None);
    }

    #[test]
    fn test_main_page_query() {
        let query: MainPageQuery = serde_urlencoded::from_str("accept=99").unwrap();
        assert_eq!(query.accept.as_deref(), Some("99"));
        assert!(query.invitation_table.is_none());
    }
}
