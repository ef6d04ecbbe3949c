use serde::{Deserialize, Serialize};

/// A command that changes the state of a room.
/// Sent as a form POST to [crate::endpoint::DISPLAY_PATH] together with the room and the form password.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    /// Post a chat message to the room.
    SendMessage { content: String },
    /// Invite the peer with the given key, or retract the invitation if one was already sent.
    Invite { peer: String },
}

impl DisplayCommand {
    /// Builds the form body for this command.
    pub fn into_form(self, room: &str, form_password: &str) -> DisplayForm {
        let (message, invite) = match self {
            DisplayCommand::SendMessage { content } => (Some(content), None),
            DisplayCommand::Invite { peer } => (None, Some(peer)),
        };

        DisplayForm {
            room: room.to_string(),
            message,
            invite,
            form_password: form_password.to_string(),
        }
    }
}

/// Body of a POST to the room page.
///
/// Every field is optional on the wire, the server decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayForm {
    #[serde(default)]
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<String>,
    #[serde(rename = "formPassword", default)]
    pub form_password: String,
}

impl DisplayForm {
    /// The command carried by the form. A non-empty message wins over an invite.
    pub fn command(&self) -> Option<DisplayCommand> {
        let non_empty = |value: &Option<String>| value.as_ref().filter(|v| !v.is_empty()).cloned();

        if let Some(content) = non_empty(&self.message) {
            Some(DisplayCommand::SendMessage { content })
        } else {
            non_empty(&self.invite).map(|peer| DisplayCommand::Invite { peer })
        }
    }
}

/// Answer to an invitation received from a peer.
/// Sent as a GET to [crate::endpoint::MAIN_PAGE_PATH].
#[derive(Debug, Clone, PartialEq)]
pub enum InvitationAnswer {
    Accept { room: String },
    Reject { room: String },
}

impl InvitationAnswer {
    pub fn room(&self) -> &str {
        match self {
            InvitationAnswer::Accept { room } | InvitationAnswer::Reject { room } => room,
        }
    }

    /// Query pairs selecting this answer on the main page.
    pub fn query(&self) -> [(&'static str, &str); 1] {
        match self {
            InvitationAnswer::Accept { room } => [("accept", room.as_str())],
            InvitationAnswer::Reject { room } => [("reject", room.as_str())],
        }
    }
}

/// Longest room name the main page accepts, in characters.
pub const ROOM_NAME_MAX_LEN: usize = 255;

/// A command that changes the rooms of the local node.
/// Sent as a form POST to [crate::endpoint::MAIN_PAGE_PATH] together with the form password.
#[derive(Debug, Clone, PartialEq)]
pub enum MainPageCommand {
    /// Leave the room and forget about it
    Disconnect { room: String },
    /// Create a new room with the local user as its only participant
    CreateRoom { name: String },
}

impl MainPageCommand {
    pub fn into_form(self, form_password: &str) -> MainPageForm {
        let mut form = MainPageForm {
            form_password: form_password.to_string(),
            ..Default::default()
        };

        match self {
            MainPageCommand::Disconnect { room } => {
                form.disconnect = Some(String::from("Disconnect"));
                form.global_identifier = Some(room);
            }
            MainPageCommand::CreateRoom { name } => form.new_room_name = Some(name),
        }

        form
    }
}

/// Body of a POST to the main page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainPageForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<String>,
    #[serde(
        rename = "globalIdentifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub global_identifier: Option<String>,
    #[serde(
        rename = "new-room-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub new_room_name: Option<String>,
    #[serde(rename = "formPassword", default)]
    pub form_password: String,
}

impl MainPageForm {
    /// The command carried by the form. A disconnect needs the identifier of the room,
    /// a room is only created for a non-empty name.
    pub fn command(&self) -> Option<MainPageCommand> {
        if self.disconnect.is_some() {
            return self
                .global_identifier
                .clone()
                .map(|room| MainPageCommand::Disconnect { room });
        }

        self.new_room_name
            .as_ref()
            .filter(|name| !name.is_empty())
            .map(|name| MainPageCommand::CreateRoom { name: name.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_form_encoding() {
        let form = DisplayCommand::SendMessage {
            content: "hello there".into(),
        }
        .into_form("42", "secret");

        assert_eq!(
            serde_urlencoded::to_string(&form).unwrap(),
            "room=42&message=hello+there&formPassword=secret"
        );
    }

    #[test]
    fn test_invite_form_encoding() {
        let form = DisplayCommand::Invite {
            peer: "a+b/c==".into(),
        }
        .into_form("42", "secret");

        assert_eq!(
            serde_urlencoded::to_string(&form).unwrap(),
            "room=42&invite=a%2Bb%2Fc%3D%3D&formPassword=secret"
        );
    }

    #[test]
    fn test_form_command_prefers_message() {
        let form: DisplayForm =
            serde_urlencoded::from_str("room=1&message=hi&invite=peer&formPassword=x").unwrap();

        assert_eq!(
            form.command(),
            Some(DisplayCommand::SendMessage {
                content: "hi".into()
            })
        );
    }

    #[test]
    fn test_form_command_ignores_empty_values() {
        let form: DisplayForm =
            serde_urlencoded::from_str("room=1&message=&invite=peer").unwrap();
        assert_eq!(
            form.command(),
            Some(DisplayCommand::Invite {
                peer: "peer".into()
            })
        );
        assert_eq!(form.form_password, "");

        let form: DisplayForm = serde_urlencoded::from_str("room=1&message=").unwrap();
        assert_eq!(form.command(), None);
    }

    #[test]
    fn test_invitation_answer_query() {
        let accept = InvitationAnswer::Accept { room: "7".into() };
        let reject = InvitationAnswer::Reject { room: "8".into() };

        assert_eq!(accept.query(), [("accept", "7")]);
        assert_eq!(reject.query(), [("reject", "8")]);
        assert_eq!(reject.room(), "8");
    }

    #[test]
    fn test_main_page_form_encoding() {
        let leave = MainPageCommand::Disconnect { room: "3".into() }.into_form("pw");
        assert_eq!(
            serde_urlencoded::to_string(&leave).unwrap(),
            "disconnect=Disconnect&globalIdentifier=3&formPassword=pw"
        );

        let create = MainPageCommand::CreateRoom {
            name: "rust talk".into(),
        }
        .into_form("pw");
        assert_eq!(
            serde_urlencoded::to_string(&create).unwrap(),
            "new-room-name=rust+talk&formPassword=pw"
        );
    }

    #[test]
    fn test_main_page_form_command() {
        let form: MainPageForm =
            serde_urlencoded::from_str("disconnect=x&formPassword=pw").unwrap();
        assert_eq!(form.command(), None);

        let form: MainPageForm = serde_urlencoded::from_str("new-room-name=&formPassword=pw").unwrap();
        assert_eq!(form.command(), None);

        let form: MainPageForm = serde_urlencoded::from_str("new-room-name=lobby").unwrap();
        assert_eq!(
            form.command(),
            Some(MainPageCommand::CreateRoom {
                name: "lobby".into()
            })
        );
        assert_eq!(form.form_password, "");
    }
}
