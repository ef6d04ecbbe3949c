use comms::fragment::{self, FragmentKind, Invitation, PageContext, RoomLink};

use super::{invite_drop_down::InviteDropDown, message_pane::MessagePane};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Uninitialized,
    /// The room page is being loaded
    Loading,
    Connected,
    Errored { err: String },
}

/// The most recent failed request, shown in the status line
#[derive(Debug, Clone, PartialEq)]
pub struct RequestError {
    /// Value of the timer when the request failed
    pub at: usize,
    pub message: String,
}

/// State holds the state of the application
#[derive(Debug, Clone)]
pub struct State {
    pub connection_status: ConnectionStatus,
    /// Base URL of the chat server
    pub server: String,
    /// Room identifier, taken from the room page once it is loaded
    pub room: String,
    /// Rooms of the local node, from the main page
    pub rooms: Vec<RoomLink>,
    pub message_pane: MessagePane,
    pub participants: Vec<String>,
    pub invite_drop_down: InviteDropDown,
    pub invitations: Vec<Invitation>,
    /// How many messages the server accepted so far
    pub delivered_messages: usize,
    pub last_error: Option<RequestError>,
    /// Seconds since the room page was loaded
    pub timer: usize,
}

impl State {
    pub fn new(server: &str, room: &str) -> Self {
        State {
            connection_status: ConnectionStatus::Uninitialized,
            server: String::from(server),
            room: String::from(room),
            rooms: Vec::new(),
            message_pane: MessagePane::default(),
            participants: Vec::new(),
            invite_drop_down: InviteDropDown::default(),
            invitations: Vec::new(),
            delivered_messages: 0,
            last_error: None,
            timer: 0,
        }
    }

    pub fn mark_page_load_start(&mut self) {
        self.connection_status = ConnectionStatus::Loading;
    }

    /// Forgets everything about the current room and starts loading another one.
    /// The invitation table and the room listing are not bound to a room and stay.
    pub fn switch_room(&mut self, room: &str) {
        self.room = String::from(room);
        self.message_pane.replace_lines(Vec::new());
        self.participants.clear();
        self.invite_drop_down.replace_options(Vec::new());
        self.mark_page_load_start();
    }

    /// Name of the current room when the listing knows it
    pub fn room_name(&self) -> Option<&str> {
        self.rooms
            .iter()
            .find(|link| link.room == self.room)
            .map(|link| link.name.as_str())
    }

    /// Processes the result of loading the room page to change the state of the application
    pub fn process_page_load_result(&mut self, result: anyhow::Result<PageContext>) {
        match result {
            Ok(context) => {
                self.room = context.room;
                self.message_pane.replace_lines(context.messages);
                self.participants = context.participants;
                self.invite_drop_down.replace_options(context.invite_options);
                self.timer = 0;
                self.connection_status = ConnectionStatus::Connected;
            }
            Err(err) => {
                self.connection_status = ConnectionStatus::Errored {
                    err: format!("{err:#}"),
                };
            }
        }
    }

    /// Replaces the region the fragment belongs to with the fragment's content
    pub fn apply_fragment(&mut self, kind: FragmentKind, html: &str) {
        let fragment = fragment::parse(html);

        match kind {
            FragmentKind::MessagesPane => self.message_pane.replace_lines(fragment.list_items()),
            FragmentKind::ParticipantsList => self.participants = fragment.list_items(),
            FragmentKind::InviteDropDown => self
                .invite_drop_down
                .replace_options(fragment.invite_options()),
            FragmentKind::InvitationTable => self.invitations = fragment.invitations(),
        }
    }

    pub fn record_error(&mut self, message: String) {
        self.last_error = Some(RequestError {
            at: self.timer,
            message,
        });
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }

    pub fn tick_timer(&mut self) {
        self.timer += 1;
    }
}

#[cfg(test)]
mod tests {
    use comms::fragment::InviteOption;

    use super::*;

    fn visible(state: &State) -> Vec<&str> {
        state
            .message_pane
            .visible_rows()
            .iter()
            .map(|row| row.text.as_str())
            .collect()
    }

    fn connected_state() -> State {
        let mut state = State::new("http://localhost:8888", "1");
        state.message_pane.set_viewport(80, 2);
        state.process_page_load_result(Ok(PageContext {
            room: String::from("1"),
            form_password: String::from("secret"),
            messages: vec!["a".into(), "b".into(), "c".into()],
            participants: vec!["1 participants present".into(), "me (you)".into()],
            invite_options: vec![InviteOption {
                value: "k1".into(),
                label: "alice".into(),
            }],
        }));
        state
    }

    #[test]
    fn test_page_load_fills_every_region() {
        let state = connected_state();

        assert!(state.is_connected());
        assert_eq!(visible(&state), ["b", "c"]);
        assert_eq!(state.participants.len(), 2);
        assert_eq!(state.invite_drop_down.selected().unwrap().label, "alice");
    }

    #[test]
    fn test_page_load_failure_is_kept() {
        let mut state = State::new("http://localhost:8888", "1");
        state.mark_page_load_start();
        state.process_page_load_result(Err(anyhow::anyhow!("connection refused")));

        assert_eq!(
            state.connection_status,
            ConnectionStatus::Errored {
                err: String::from("connection refused")
            }
        );
    }

    #[test]
    fn test_fragments_replace_their_region() {
        let mut state = connected_state();

        state.apply_fragment(
            FragmentKind::MessagesPane,
            "<ul><li>a</li><li>b</li><li>c</li><li>d</li></ul>",
        );
        assert_eq!(visible(&state), ["c", "d"]);

        state.apply_fragment(
            FragmentKind::ParticipantsList,
            "<ul><li>2 participants present</li><li>bob</li><li>me (you)</li></ul>",
        );
        assert_eq!(state.participants[1], "bob");

        state.apply_fragment(
            FragmentKind::InviteDropDown,
            r#"<option value="k2">bob</option><option value="k1">alice</option>"#,
        );
        assert_eq!(state.invite_drop_down.selected().unwrap().label, "alice");

        state.apply_fragment(
            FragmentKind::InvitationTable,
            r#"<table><tr><th>Room name</th></tr><tr><td>rust-talk</td><td>me</td><td>dave</td><td><a href="/n2n-chat/main-page/?accept=9">Accept</a></td></tr></table>"#,
        );
        assert_eq!(state.invitations.len(), 1);
        assert_eq!(state.invitations[0].room, "9");
    }

    #[test]
    fn test_switching_rooms_clears_the_room_regions() {
        let mut state = connected_state();
        state.rooms = vec![RoomLink {
            room: String::from("2"),
            name: String::from("rust-talk"),
        }];
        state.apply_fragment(
            FragmentKind::InvitationTable,
            r#"<table><tr><td>x</td><td>me</td><td>dave</td><td><a href="/n2n-chat/main-page/?accept=9">Accept</a></td></tr></table>"#,
        );
        assert_eq!(state.room_name(), None);

        state.switch_room("2");

        assert_eq!(state.connection_status, ConnectionStatus::Loading);
        assert_eq!(state.room_name(), Some("rust-talk"));
        assert!(state.message_pane.lines().is_empty());
        assert!(state.participants.is_empty());
        assert_eq!(state.invite_drop_down.selected(), None);
        assert_eq!(state.invitations.len(), 1);
    }
}
