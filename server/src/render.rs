//! HTML for the room page, the main page and every fragment they are made of.

use comms::{
    endpoint::{self, DISPLAY_PATH, MAIN_PAGE_PATH},
    fragment::{html::escape, view::ROOM_LISTING_CLASS, FragmentKind},
};

use crate::room::{ChatRoom, LogLine, PendingInvitation, Peer, RoomManager};

pub fn messages_pane(room: &ChatRoom) -> String {
    let mut html = String::from(r#"<ul style="overflow:scroll;list-style-type:none;">"#);

    for line in room.log() {
        match line {
            LogLine::DayChange(day) => {
                html.push_str(&format!("<li>{}</li>", escape(day)));
            }
            LogLine::Message {
                received,
                author,
                content,
            } => {
                html.push_str(&format!(
                    r#"<li title="received {0}">[ {0} ] <div style="display:inline;">{1}: </div>{2}</li>"#,
                    escape(received),
                    escape(author),
                    escape(content)
                ));
            }
            LogLine::Notice { name, text } => {
                html.push_str(&format!(
                    r#"<li><div style="display:inline;">{}</div> {}</li>"#,
                    escape(name),
                    escape(text)
                ));
            }
        }
    }

    html.push_str("</ul>");
    html
}

pub fn participants_list(room: &ChatRoom) -> String {
    let items: String = room
        .participant_listing()
        .iter()
        .map(|line| format!("<li>{}</li>", escape(line)))
        .collect();

    format!(r#"<ul style="overflow:scroll;list-style-type:none;">{items}</ul>"#)
}

/// The bare options of the invite drop-down, as served to a poll.
pub fn invite_options(peers: &[&Peer]) -> String {
    peers
        .iter()
        .map(|peer| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape(&peer.key),
                escape(&peer.name)
            )
        })
        .collect()
}

pub fn invitation_table(invitations: &[PendingInvitation]) -> String {
    let mut html = String::from(
        "<table><tr><th>Room name</th><th>Username</th><th>Invited by</th><th>Accept</th><th>Reject</th></tr>",
    );

    for invitation in invitations {
        let accept = escape(&endpoint::link(MAIN_PAGE_PATH, &[("accept", invitation.room.as_str())]));
        let reject = escape(&endpoint::link(MAIN_PAGE_PATH, &[("reject", invitation.room.as_str())]));
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><a href="{accept}">Accept</a></td><td><a href="{reject}">Reject</a></td></tr>"#,
            escape(&invitation.room_name),
            escape(&invitation.username),
            escape(&invitation.invited_by),
        ));
    }

    html.push_str("</table>");
    html
}

/// The full room page with hidden `room` and `formPassword` fields in each form.
pub fn room_page(room: &ChatRoom, peers: &[&Peer], form_password: &str) -> String {
    let id = escape(&room.metadata().id);
    let password = escape(form_password);
    let hidden_fields = format!(
        r#"<input type="hidden" name="formPassword" value="{password}"><input type="hidden" name="room" value="{id}">"#
    );

    format!(
        r#"<!DOCTYPE html>
<html><head><title>{title}</title></head><body>
<div id="{messages}">{messages_pane}</div>
<div id="{participants}">{participants_list}</div>
<div id="{invites}"><div id="invite-form"><form action="{DISPLAY_PATH}" method="post">{hidden_fields}<select name="invite">{options}</select><input type="submit" name="send-invite" value="(un)invite"></form></div></div>
<div id="message-form"><form action="{DISPLAY_PATH}" method="post">{hidden_fields}<input type="text" name="message"></form></div>
</body></html>"#,
        title = escape(&room.metadata().name),
        messages = FragmentKind::MessagesPane.container_id(),
        messages_pane = messages_pane(room),
        participants = FragmentKind::ParticipantsList.container_id(),
        participants_list = participants_list(room),
        invites = FragmentKind::InviteDropDown.container_id(),
        options = invite_options(peers),
    )
}

/// The main page: the rooms of the node with a form to leave each of them,
/// a form to create a room, and the pending invitations.
pub fn main_page(manager: &RoomManager, form_password: &str) -> String {
    let password = format!(
        r#"<input type="hidden" name="formPassword" value="{}">"#,
        escape(form_password)
    );

    let rooms: String = manager
        .rooms()
        .map(|room| {
            let id = &room.metadata().id;
            format!(
                r#"<li><a href="{href}">{name}</a><form action="{MAIN_PAGE_PATH}" method="post">{password}<input type="hidden" name="globalIdentifier" value="{id}"><input type="submit" name="disconnect" value="Disconnect"></form></li>"#,
                href = escape(&endpoint::link(DISPLAY_PATH, &[("room", id.as_str())])),
                name = escape(&room.metadata().name),
                id = escape(id),
            )
        })
        .collect();

    let welcome = if manager.rooms().next().is_none() {
        "<p>You are not in any room yet. Create one, or accept an invitation from a peer.</p>"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html><head><title>N2N Chat</title></head><body>
<p>Chatting as {username}</p>
{welcome}
<ul class="{ROOM_LISTING_CLASS}" style="list-style-type:none;">{rooms}<form action="{MAIN_PAGE_PATH}" method="post">{password}<input type="text" name="new-room-name" value="New room"><input type="submit" name="create-chat" value="Create"></form></ul>
<div id="{container}">{table}</div>
</body></html>"#,
        username = escape(manager.username()),
        container = FragmentKind::InvitationTable.container_id(),
        table = invitation_table(manager.invitations()),
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{0}</title></head><body><h1>{0}</h1><p>{1}</p></body></html>",
        escape(title),
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use comms::fragment::{parse, PageContext};

    use super::*;
    use crate::room::{ChatRoomMetadata, RoomManagerBuilder};

    #[test]
    fn test_room_page_is_readable_by_the_client() {
        let mut manager = RoomManagerBuilder::new("me")
            .create_room(ChatRoomMetadata::new("5", "general"))
            .build();
        manager.send_message("5", "a <b> & c").unwrap();

        let room = manager.room("5").unwrap();
        let bob = Peer {
            name: "bob".into(),
            key: "k/b+==".into(),
        };
        let page = room_page(room, &[&bob], "pw\"1");
        let context = PageContext::from_page(&parse(&page)).unwrap();

        assert_eq!(context.room, "5");
        assert_eq!(context.form_password, "pw\"1");
        assert_eq!(context.messages.len(), 2);
        assert!(context.messages[1].ends_with("me: a <b> & c"));
        assert_eq!(context.participants, vec!["1 participants present", "me (you)"]);
        assert_eq!(context.invite_options[0].value, "k/b+==");
    }

    #[test]
    fn test_invitation_table_links() {
        let table = invitation_table(&[PendingInvitation {
            room: "77".into(),
            room_name: "rust-talk".into(),
            username: "me".into(),
            invited_by: "dave".into(),
        }]);
        let invitations = parse(&table).invitations();

        assert_eq!(invitations.len(), 1);
        assert_eq!(invitations[0].room, "77");
        assert_eq!(invitations[0].invited_by, "dave");
    }

    #[test]
    fn test_main_page_lists_rooms_for_the_client() {
        let mut manager = RoomManagerBuilder::new("me")
            .create_room(ChatRoomMetadata::new("1", "general"))
            .create_room(ChatRoomMetadata::new("a&b", "odd <id>"))
            .build();

        let page = parse(&main_page(&manager, "pw"));
        let rooms = page.room_listing();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room, "1");
        assert_eq!(rooms[1].room, "a&b");
        assert_eq!(rooms[1].name, "odd <id>");
        assert_eq!(page.input_value("formPassword").as_deref(), Some("pw"));

        manager.leave_room("1").unwrap();
        manager.leave_room("a&b").unwrap();
        let page = main_page(&manager, "pw");
        assert!(page.contains("You are not in any room yet"));
        assert!(parse(&page).room_listing().is_empty());
    }
}
