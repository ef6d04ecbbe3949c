use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    state_store::{action::Action, RequestError, State},
    ui_management::components::{dispatch, Component, ComponentRender},
};

use super::{
    components::{
        invitation_list::{self, InvitationList},
        invitee_picker::{self, InviteePicker},
        message_input_box::{self, MessageInputBox},
        message_view::{self, MessageView},
        room_list::{self, RoomList},
    },
    section::{
        usage::{widget_usage_to_text, HasUsageInfo, UsageInfo, UsageInfoLine},
        Section, SectionActivation,
    },
};

struct Props {
    room: String,
    server: String,
    /// Seconds since the room page was loaded
    timer: usize,
    participants: Vec<String>,
    last_error: Option<RequestError>,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            room: match state.room_name() {
                Some(name) => format!("{name} ({})", state.room),
                None => state.room.clone(),
            },
            server: state.server.clone(),
            timer: state.timer,
            participants: state.participants.clone(),
            last_error: state.last_error.clone(),
        }
    }
}

const DEFAULT_HOVERED_SECTION: Section = Section::MessageInput;

/// ChatPage handles the UI and the state of the room
pub struct ChatPage {
    /// Action sender
    pub action_tx: UnboundedSender<Action>,
    /// State Mapped ChatPage Props
    props: Props,
    // Internal State
    /// Currently active section, handling input
    pub active_section: Option<Section>,
    /// Section that is currently hovered
    pub last_hovered_section: Section,
    // Child Components
    pub message_input_box: MessageInputBox,
    pub message_view: MessageView,
    pub invitee_picker: InviteePicker,
    pub invitation_list: InvitationList,
    pub room_list: RoomList,
}

impl ChatPage {
    fn get_component_for_section(&self, section: Section) -> &dyn Component {
        match section {
            Section::MessageInput => &self.message_input_box,
            Section::Messages => &self.message_view,
            Section::Invitees => &self.invitee_picker,
            Section::Invitations => &self.invitation_list,
            Section::Rooms => &self.room_list,
        }
    }

    fn get_component_for_section_mut(&mut self, section: Section) -> &mut dyn Component {
        match section {
            Section::MessageInput => &mut self.message_input_box,
            Section::Messages => &mut self.message_view,
            Section::Invitees => &mut self.invitee_picker,
            Section::Invitations => &mut self.invitation_list,
            Section::Rooms => &mut self.room_list,
        }
    }

    fn get_section_activation_for_section(
        &mut self,
        section: Section,
    ) -> &mut dyn SectionActivation {
        match section {
            Section::MessageInput => &mut self.message_input_box,
            Section::Messages => &mut self.message_view,
            Section::Invitees => &mut self.invitee_picker,
            Section::Invitations => &mut self.invitation_list,
            Section::Rooms => &mut self.room_list,
        }
    }

    fn calculate_border_color(&self, section: Section) -> Color {
        match (self.active_section, self.last_hovered_section) {
            (Some(active_section), _) if active_section == section => Color::Yellow,
            (_, last_hovered_section) if last_hovered_section == section => Color::Blue,
            _ => Color::Reset,
        }
    }

    fn activate_section(&mut self, section: Section) {
        self.active_section = Some(section);
        self.get_section_activation_for_section(section).activate();
    }

    fn disable_section(&mut self, section: Section) {
        self.get_section_activation_for_section(section)
            .deactivate();

        self.active_section = None;
    }
}

impl Component for ChatPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        ChatPage {
            action_tx: action_tx.clone(),
            // set the props
            props: Props::from(state),
            // internal component state
            active_section: None,
            last_hovered_section: DEFAULT_HOVERED_SECTION,
            // child components
            message_input_box: MessageInputBox::new(state, action_tx.clone()),
            message_view: MessageView::new(state, action_tx.clone()),
            invitee_picker: InviteePicker::new(state, action_tx.clone()),
            invitation_list: InvitationList::new(state, action_tx.clone()),
            room_list: RoomList::new(state, action_tx),
        }
        .move_with_state(state)
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        ChatPage {
            props: Props::from(state),
            // propogate the update to the child components
            message_input_box: self.message_input_box.move_with_state(state),
            message_view: self.message_view.move_with_state(state),
            invitee_picker: self.invitee_picker.move_with_state(state),
            invitation_list: self.invitation_list.move_with_state(state),
            room_list: self.room_list.move_with_state(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Chat Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.active_section {
            None => match key.code {
                KeyCode::Char('e') | KeyCode::Enter => {
                    self.activate_section(self.last_hovered_section)
                }
                KeyCode::Left => self.last_hovered_section = self.last_hovered_section.previous(),
                KeyCode::Right | KeyCode::Tab => {
                    self.last_hovered_section = self.last_hovered_section.next()
                }
                KeyCode::Char('q') => dispatch(&self.action_tx, Action::Exit),
                _ => {}
            },
            Some(section) if key.code == KeyCode::Esc => self.disable_section(section),
            Some(section) => self
                .get_component_for_section_mut(section)
                .handle_key_event(key),
        }
    }
}

/// Areas of the chat page for the given terminal size
struct ChatLayout {
    status: Rect,
    rooms: Rect,
    participants: Rect,
    invitees: Rect,
    messages: Rect,
    input: Rect,
    invitations: Rect,
    usage: Rect,
}

fn chat_layout(area: Rect) -> ChatLayout {
    let [left, middle, right] = *Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(22),
                Constraint::Percentage(56),
                Constraint::Percentage(22),
            ]
            .as_ref(),
        )
        .split(area)
    else {
        panic!("The main layout should have 3 chunks")
    };

    let [status, rooms, participants, invitees] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6),
                Constraint::Percentage(40),
                Constraint::Min(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(left)
    else {
        panic!("The left layout should have 4 chunks")
    };

    let [messages, input] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(middle)
    else {
        panic!("The middle layout should have 2 chunks")
    };

    let [invitations, usage] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(10)].as_ref())
        .split(right)
    else {
        panic!("The right layout should have 2 chunks")
    };

    ChatLayout {
        status,
        rooms,
        participants,
        invitees,
        messages,
        input,
        invitations,
        usage,
    }
}

/// Columns and rows of message text that fit on a terminal of the given size
pub fn message_pane_size(area: Rect) -> (usize, usize) {
    let messages = chat_layout(area).messages;

    // minus the borders
    (
        messages.width.saturating_sub(2) as usize,
        messages.height.saturating_sub(2) as usize,
    )
}

impl ComponentRender<()> for ChatPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let layout = chat_layout(frame.size());

        let mut status_lines = vec![
            Line::from(vec!["Room: ".into(), Span::from(self.props.room.clone()).bold()]),
            Line::from(format!("Server: {}", self.props.server)),
            Line::from(format!("Chatting for: {} secs", self.props.timer)),
        ];
        status_lines.push(match self.props.last_error.as_ref() {
            Some(err) => Line::from(Span::styled(
                format!("Error at {}s: {}", err.at, err.message),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::from("No errors").italic()),
        });
        let status = Paragraph::new(Text::from(status_lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(status, layout.status);

        // the first line is the head count, the rest are names
        let (title, names) = match self.props.participants.split_first() {
            Some((head_count, names)) => (head_count.clone(), names),
            None => (String::from("Participants"), &[][..]),
        };
        let participants: Vec<ListItem> = names
            .iter()
            .map(|name| ListItem::new(Line::from(Span::raw(name.clone()))))
            .collect();
        let participants =
            List::new(participants).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(participants, layout.participants);

        self.room_list.render(
            frame,
            room_list::RenderProps {
                border_color: self.calculate_border_color(Section::Rooms),
                area: layout.rooms,
                show_cursor: self.active_section == Some(Section::Rooms)
                    && self.room_list.is_naming_a_room(),
            },
        );

        self.invitee_picker.render(
            frame,
            invitee_picker::RenderProps {
                border_color: self.calculate_border_color(Section::Invitees),
                area: layout.invitees,
            },
        );

        self.message_view.render(
            frame,
            message_view::RenderProps {
                border_color: self.calculate_border_color(Section::Messages),
                area: layout.messages,
            },
        );

        self.message_input_box.render(
            frame,
            message_input_box::RenderProps {
                border_color: self.calculate_border_color(Section::MessageInput),
                area: layout.input,
                show_cursor: self.active_section == Some(Section::MessageInput),
            },
        );

        self.invitation_list.render(
            frame,
            invitation_list::RenderProps {
                border_color: self.calculate_border_color(Section::Invitations),
                area: layout.invitations,
            },
        );

        let mut usage_text: Text = widget_usage_to_text(self.usage_info());
        usage_text.patch_style(Style::default());
        let usage = Paragraph::new(usage_text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Usage"));
        frame.render_widget(usage, layout.usage);
    }
}

impl HasUsageInfo for ChatPage {
    fn usage_info(&self) -> UsageInfo {
        if let Some(section) = self.active_section {
            let handler: &dyn HasUsageInfo = match section {
                Section::MessageInput => &self.message_input_box,
                Section::Messages => &self.message_view,
                Section::Invitees => &self.invitee_picker,
                Section::Invitations => &self.invitation_list,
                Section::Rooms => &self.room_list,
            };

            handler.usage_info()
        } else {
            UsageInfo {
                description: Some("Select a widget".into()),
                lines: vec![
                    UsageInfoLine::new(&["q"], "to exit"),
                    UsageInfoLine::new(&["←", "→"], "to hover widgets"),
                    UsageInfoLine::new(
                        &["e", "Enter"],
                        &format!(
                            "to activate {}",
                            self.get_component_for_section(self.last_hovered_section)
                                .name()
                        ),
                    ),
                ],
            }
        }
    }
}
