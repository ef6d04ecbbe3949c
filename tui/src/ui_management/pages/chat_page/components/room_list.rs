use comms::fragment::RoomLink;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use super::super::section::{
    usage::{HasUsageInfo, UsageInfo, UsageInfoLine},
    SectionActivation,
};
use crate::{
    state_store::{action::Action, State},
    ui_management::components::{
        dispatch,
        input_box::{self, InputBox},
        Component, ComponentRender,
    },
};

struct Props {
    /// Rooms of the local node, in the order of the main page
    rooms: Vec<RoomLink>,
    /// Room the chat page shows
    active_room: String,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Self {
            rooms: state.rooms.clone(),
            active_room: state.room.clone(),
        }
    }
}

pub struct RoomList {
    /// Sending actions to the state store
    action_tx: UnboundedSender<Action>,
    /// State Mapped RoomList Props
    props: Props,
    // Internal Component State
    /// List with optional selection and current offset
    pub list_state: ListState,
    /// Name of the room to create
    pub new_room_name: InputBox,
    naming: bool,
}

impl RoomList {
    fn next(&mut self) {
        let len = self.props.rooms.len();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        let len = self.props.rooms.len();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        };
        self.list_state.select(Some(i));
    }

    fn selected_room(&self) -> Option<&RoomLink> {
        self.list_state
            .selected()
            .and_then(|idx| self.props.rooms.get(idx))
    }

    fn get_room_idx(&self, room: &str) -> Option<usize> {
        self.props.rooms.iter().position(|link| link.room == room)
    }

    pub fn is_naming_a_room(&self) -> bool {
        self.naming
    }

    fn start_naming(&mut self) {
        self.new_room_name.reset();
        self.naming = true;
    }

    fn handle_naming_key_event(&mut self, key: KeyEvent) {
        if key.code != KeyCode::Enter {
            self.new_room_name.handle_key_event(key);
            return;
        }

        let name = self.new_room_name.text().trim();
        if !name.is_empty() {
            dispatch(
                &self.action_tx,
                Action::CreateRoom {
                    name: String::from(name),
                },
            );
        }
        self.naming = false;
    }
}

impl Component for RoomList {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            //
            list_state: ListState::default(),
            new_room_name: InputBox::new(state, action_tx),
            naming: false,
        }
    }

    fn move_with_state(mut self, state: &State) -> Self
    where
        Self: Sized,
    {
        let props = Props::from(state);

        // a left room shrinks the listing, keep the selection on a row
        if let Some(selected) = self.list_state.selected() {
            self.list_state.select(match props.rooms.len() {
                0 => None,
                len => Some(selected.min(len - 1)),
            });
        }

        Self { props, ..self }
    }

    fn name(&self) -> &str {
        "Room List"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.is_naming_a_room() {
            self.handle_naming_key_event(key);
            return;
        }

        match key.code {
            KeyCode::Up => self.previous(),
            KeyCode::Down => self.next(),
            KeyCode::Enter => {
                if let Some(link) = self.selected_room() {
                    dispatch(
                        &self.action_tx,
                        Action::OpenRoom {
                            room: link.room.clone(),
                        },
                    );
                }
            }
            KeyCode::Char('d') => {
                if let Some(link) = self.selected_room() {
                    dispatch(
                        &self.action_tx,
                        Action::LeaveRoom {
                            room: link.room.clone(),
                        },
                    );
                }
            }
            KeyCode::Char('n') => self.start_naming(),
            KeyCode::Char('r') => dispatch(&self.action_tx, Action::RefreshRooms),
            _ => (),
        }
    }
}

impl SectionActivation for RoomList {
    fn activate(&mut self) {
        let idx = self.get_room_idx(&self.props.active_room).unwrap_or(0);

        *self.list_state.offset_mut() = 0;
        self.list_state
            .select((!self.props.rooms.is_empty()).then_some(idx));
        dispatch(&self.action_tx, Action::RefreshRooms);
    }

    fn deactivate(&mut self) {
        *self.list_state.offset_mut() = 0;
        self.list_state.select(None);
        self.naming = false;
    }
}

pub struct RenderProps {
    pub border_color: Color,
    pub area: Rect,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps> for RoomList {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let (list_area, input_area) = if self.naming {
            let [list_area, input_area] = *Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
                .split(props.area)
            else {
                panic!("The room list layout should have 2 chunks")
            };
            (list_area, Some(input_area))
        } else {
            (props.area, None)
        };

        let room_list: Vec<ListItem> = self
            .props
            .rooms
            .iter()
            .map(|link| {
                let content = Line::from(Span::raw(format!("#{}", link.name)));

                let style = if self.list_state.selected().is_none()
                    && link.room == self.props.active_room
                {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(content).style(style.bg(Color::Reset))
            })
            .collect();

        let room_list = List::new(room_list)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::new().fg(props.border_color))
                    .title(format!("Rooms ({})", self.props.rooms.len())),
            )
            .highlight_style(
                Style::default()
                    // yellow that would work for both dark / light modes
                    .bg(Color::Rgb(255, 223, 102))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">");

        let mut app_room_list_state = self.list_state.clone();
        frame.render_stateful_widget(room_list, list_area, &mut app_room_list_state);

        if let Some(input_area) = input_area {
            self.new_room_name.render(
                frame,
                input_box::RenderProps {
                    title: "New room".into(),
                    area: input_area,
                    border_color: props.border_color,
                    show_cursor: props.show_cursor,
                },
            );
        }
    }
}

impl HasUsageInfo for RoomList {
    fn usage_info(&self) -> UsageInfo {
        if self.is_naming_a_room() {
            return UsageInfo {
                description: Some("Name the new room".into()),
                lines: vec![
                    UsageInfoLine::new(&["Enter"], "to create it"),
                    UsageInfoLine::new(&["Esc"], "to cancel"),
                ],
            };
        }

        UsageInfo {
            description: Some("Select the room to talk in".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to cancel"),
                UsageInfoLine::new(&["↑", "↓"], "to navigate"),
                UsageInfoLine::new(&["Enter"], "to open the room"),
                UsageInfoLine::new(&["d"], "to leave the room"),
                UsageInfoLine::new(&["n"], "to create a room"),
                UsageInfoLine::new(&["r"], "to refresh"),
            ],
        }
    }
}
