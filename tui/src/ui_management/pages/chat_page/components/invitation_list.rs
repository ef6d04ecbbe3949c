use comms::fragment::Invitation;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
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
    ui_management::components::{dispatch, Component, ComponentRender},
};

struct Props {
    invitations: Vec<Invitation>,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Self {
            invitations: state.invitations.clone(),
        }
    }
}

/// Invitations to other rooms waiting for an answer
pub struct InvitationList {
    /// Sending actions to the state store
    action_tx: UnboundedSender<Action>,
    /// State Mapped InvitationList Props
    props: Props,
    // Internal Component State
    /// List with optional selection and current offset
    pub list_state: ListState,
}

impl InvitationList {
    fn next(&mut self) {
        let len = self.props.invitations.len();
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
        let len = self.props.invitations.len();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        };
        self.list_state.select(Some(i));
    }

    fn answer_selected(&self, accept: bool) {
        let Some(invitation) = self
            .list_state
            .selected()
            .and_then(|idx| self.props.invitations.get(idx))
        else {
            return;
        };

        dispatch(
            &self.action_tx,
            Action::AnswerInvitation {
                room: invitation.room.clone(),
                accept,
            },
        );
    }
}

impl Component for InvitationList {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx,
            props: Props::from(state),
            //
            list_state: ListState::default(),
        }
    }

    fn move_with_state(mut self, state: &State) -> Self
    where
        Self: Sized,
    {
        let props = Props::from(state);

        // the table shrinks after an answer, keep the selection on a row
        if let Some(selected) = self.list_state.selected() {
            self.list_state.select(match props.invitations.len() {
                0 => None,
                len => Some(selected.min(len - 1)),
            });
        }

        Self { props, ..self }
    }

    fn name(&self) -> &str {
        "Invitations"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Up => self.previous(),
            KeyCode::Down => self.next(),
            KeyCode::Char('a') => self.answer_selected(true),
            KeyCode::Char('r') => self.answer_selected(false),
            _ => (),
        }
    }
}

impl SectionActivation for InvitationList {
    fn activate(&mut self) {
        *self.list_state.offset_mut() = 0;
        self.list_state
            .select((!self.props.invitations.is_empty()).then_some(0));
    }

    fn deactivate(&mut self) {
        *self.list_state.offset_mut() = 0;
        self.list_state.select(None);
    }
}

pub struct RenderProps {
    pub border_color: Color,
    pub area: Rect,
}

impl ComponentRender<RenderProps> for InvitationList {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let items: Vec<ListItem> = self
            .props
            .invitations
            .iter()
            .map(|invitation| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        invitation.room_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(" from {}", invitation.invited_by)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::new().fg(props.border_color))
                    .title(format!("Invitations ({})", self.props.invitations.len())),
            )
            .highlight_style(
                Style::default()
                    // yellow that would work for both dark / light modes
                    .bg(Color::Rgb(255, 223, 102))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">");

        let mut list_state = self.list_state.clone();
        frame.render_stateful_widget(list, props.area, &mut list_state);
    }
}

impl HasUsageInfo for InvitationList {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Answer an invitation to another room".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to cancel"),
                UsageInfoLine::new(&["↑", "↓"], "to navigate"),
                UsageInfoLine::new(&["a"], "to accept"),
                UsageInfoLine::new(&["r"], "to reject"),
            ],
        }
    }
}
