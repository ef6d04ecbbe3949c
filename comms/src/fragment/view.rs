use crate::Error;

use super::{html::Element, FragmentKind};

/// Class of the list of rooms on the main page
pub const ROOM_LISTING_CLASS: &str = "room-listing";

/// One entry of the invite drop-down
#[derive(Debug, Clone, PartialEq)]
pub struct InviteOption {
    /// The peer key sent back with an invite
    pub value: String,
    /// The peer name shown to the user
    pub label: String,
}

/// A pending invitation to join someone else's room
#[derive(Debug, Clone, PartialEq)]
pub struct Invitation {
    pub room_name: String,
    pub username: String,
    pub invited_by: String,
    /// Identifier of the room the invitation is for, used to accept or reject it
    pub room: String,
}

/// A room of the local node, as linked from the main page
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLink {
    /// Identifier to load the room page with
    pub room: String,
    pub name: String,
}

impl Element {
    /// Text of every list item, used for the message pane and the participant list.
    pub fn list_items(&self) -> Vec<String> {
        self.find_all("li").map(Element::text).collect()
    }

    /// Every option of the invite drop-down.
    /// Works on the bare list of options the server polls with as well as on a full `select`.
    pub fn invite_options(&self) -> Vec<InviteOption> {
        self.find_all("option")
            .map(|option| {
                let label = option.text();
                InviteOption {
                    value: option
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| label.clone()),
                    label,
                }
            })
            .collect()
    }

    /// Rows of the invitation table. The header row and rows without an accept or reject link are skipped.
    pub fn invitations(&self) -> Vec<Invitation> {
        self.find_all("tr")
            .filter_map(|row| {
                let cells: Vec<&Element> = row.find_all("td").collect();
                if cells.len() < 3 {
                    return None;
                }

                let room = row
                    .find_all("a")
                    .filter_map(|link| link.attr("href"))
                    .find_map(|href| {
                        query_value(href, "accept").or_else(|| query_value(href, "reject"))
                    })?;

                Some(Invitation {
                    room_name: cells[0].text(),
                    username: cells[1].text(),
                    invited_by: cells[2].text(),
                    room,
                })
            })
            .collect()
    }

    /// Rooms of the main page listing. Entries without a link to a room page are skipped.
    pub fn room_listing(&self) -> Vec<RoomLink> {
        self.find_all("ul")
            .filter(|list| {
                list.attr("class").is_some_and(|class| {
                    class.split_whitespace().any(|class| class == ROOM_LISTING_CLASS)
                })
            })
            .flat_map(|list| list.find_all("li"))
            .filter_map(|item| {
                let link = item.find_all("a").next()?;
                let room = query_value(link.attr("href")?, "room")?;

                Some(RoomLink {
                    room,
                    name: link.text(),
                })
            })
            .collect()
    }

    /// Value of the `input` with the given name attribute.
    pub fn input_value(&self, name: &str) -> Option<String> {
        self.find_all("input")
            .find(|input| input.attr("name") == Some(name))
            .and_then(|input| input.attr("value"))
            .map(str::to_string)
    }
}

/// Percent-decoded value of `key` in the query string of `href`.
fn query_value(href: &str, key: &str) -> Option<String> {
    let (_, query) = href.split_once('?')?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// What the client reads from the room page once, before it starts polling.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub room: String,
    pub form_password: String,
    pub messages: Vec<String>,
    pub participants: Vec<String>,
    pub invite_options: Vec<InviteOption>,
}

impl PageContext {
    /// Reads the hidden `room` and `formPassword` fields and the initial content of each room region.
    pub fn from_page(page: &Element) -> Result<Self, Error> {
        let room = page.input_value("room").ok_or(Error::MissingField("room"))?;
        let form_password = page
            .input_value("formPassword")
            .ok_or(Error::MissingField("formPassword"))?;

        let region = |kind: FragmentKind| page.find_by_id(kind.container_id());

        Ok(PageContext {
            room,
            form_password,
            messages: region(FragmentKind::MessagesPane)
                .map(Element::list_items)
                .unwrap_or_default(),
            participants: region(FragmentKind::ParticipantsList)
                .map(Element::list_items)
                .unwrap_or_default(),
            invite_options: region(FragmentKind::InviteDropDown)
                .map(Element::invite_options)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::parse;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>rust-talk</title><script type="text/javascript" src="/js/display.js"></script></head>
<body>
<div id="messages-pane"><ul style="overflow:scroll;"><li>Monday, 19 October 2026</li><li title="received 10:00"><div style="display:inline;">alice: </div>hello &amp; welcome</li></ul></div>
<div id="participants-list"><ul><li>2 participants present</li><li>alice</li><li>me (you)</li></ul></div>
<div id="invite-container"><div id="invite-form"><form action="/n2n-chat/display/" method="post">
<input type="hidden" name="formPassword" value="s3cr3t">
<input type="hidden" name="room" value="4711">
<select name="invite"><option value="a2V5LWJvYg==">bob</option><option value="a2V5LWNhcm9s">carol</option></select>
<input type="submit" name="send-invite" value="(un)invite"></form></div></div>
</body></html>"#;

    #[test]
    fn test_page_context_reads_hidden_fields_and_regions() {
        let context = PageContext::from_page(&parse(PAGE)).unwrap();

        assert_eq!(context.room, "4711");
        assert_eq!(context.form_password, "s3cr3t");
        assert_eq!(
            context.messages,
            vec!["Monday, 19 October 2026", "alice: hello & welcome"]
        );
        assert_eq!(
            context.participants,
            vec!["2 participants present", "alice", "me (you)"]
        );
        assert_eq!(
            context.invite_options,
            vec![
                InviteOption {
                    value: "a2V5LWJvYg==".into(),
                    label: "bob".into()
                },
                InviteOption {
                    value: "a2V5LWNhcm9s".into(),
                    label: "carol".into()
                },
            ]
        );
    }

    #[test]
    fn test_page_context_requires_form_password() {
        let page = parse(r#"<input type="hidden" name="room" value="1">"#);

        assert!(matches!(
            PageContext::from_page(&page),
            Err(Error::MissingField("formPassword"))
        ));
    }

    #[test]
    fn test_bare_option_fragment() {
        let fragment = parse(r#"<option value="k1">dave</option><option>erin</option>"#);

        assert_eq!(
            fragment.invite_options(),
            vec![
                InviteOption {
                    value: "k1".into(),
                    label: "dave".into()
                },
                InviteOption {
                    value: "erin".into(),
                    label: "erin".into()
                },
            ]
        );
    }

    #[test]
    fn test_invitation_table() {
        let fragment = parse(
            r#"<table><tr><th>Room name</th><th>Username</th><th>Invited by</th><th>Accept</th><th>Reject</th></tr>
<tr><td>rust-talk</td><td>me</td><td>dave</td><td><a href="/n2n-chat/main-page/?accept=99">Accept</a></td><td><a href="/n2n-chat/main-page/?reject=99">Reject</a></td></tr>
<tr><td>broken</td><td>me</td><td>x</td><td></td><td></td></tr></table>"#,
        );

        assert_eq!(
            fragment.invitations(),
            vec![Invitation {
                room_name: "rust-talk".into(),
                username: "me".into(),
                invited_by: "dave".into(),
                room: "99".into(),
            }]
        );
    }

    #[test]
    fn test_query_value() {
        assert_eq!(query_value("/p/?a=1&reject=5", "reject"), Some("5".into()));
        assert_eq!(query_value("/p/?accept=", "accept"), None);
        assert_eq!(query_value("/p/", "accept"), None);
        assert_eq!(
            query_value("/p/?accept=room%2F1+b", "accept"),
            Some("room/1 b".into())
        );
    }

    #[test]
    fn test_invitation_ids_are_decoded() {
        let fragment = parse(
            r#"<table><tr><td>x</td><td>me</td><td>dave</td><td><a href="/n2n-chat/main-page/?accept=a%26b&amp;z=1">Accept</a></td></tr></table>"#,
        );

        assert_eq!(fragment.invitations()[0].room, "a&b");
    }

    #[test]
    fn test_room_listing() {
        let page = parse(
            r#"<ul><li><a href="/elsewhere/">not a room</a></li></ul>
<ul class="room-listing" style="list-style-type:none;">
<li><a href="/n2n-chat/display/?room=1">general</a><form action="/n2n-chat/main-page/" method="post"><input type="hidden" name="globalIdentifier" value="1"><input type="submit" name="disconnect" value="Disconnect"></form></li>
<li><a href="/n2n-chat/display/?room=x%3Fy">what &amp; why</a></li>
<form action="/n2n-chat/main-page/" method="post"><input type="text" name="new-room-name" value="New room"></form>
</ul>"#,
        );

        assert_eq!(
            page.room_listing(),
            vec![
                RoomLink {
                    room: "1".into(),
                    name: "general".into()
                },
                RoomLink {
                    room: "x?y".into(),
                    name: "what & why".into()
                },
            ]
        );
    }
}
