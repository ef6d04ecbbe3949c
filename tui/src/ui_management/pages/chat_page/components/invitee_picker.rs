use comms::fragment::InviteOption;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
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
    options: Vec<InviteOption>,
    selected: Option<usize>,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            options: state.invite_drop_down.options().to_vec(),
            selected: state.invite_drop_down.selected_index(),
        }
    }
}

/// The invite drop-down: one peer at a time, cycled with the arrow keys
pub struct InviteePicker {
    action_tx: UnboundedSender<Action>,
    props: Props,
}

impl Component for InviteePicker {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        InviteePicker {
            action_tx,
            props: Props::from(state),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        InviteePicker {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Invite"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let action = match key.code {
            KeyCode::Up => Action::SelectPreviousInvitee,
            KeyCode::Down => Action::SelectNextInvitee,
            KeyCode::Enter => Action::SendInvite,
            _ => return,
        };

        dispatch(&self.action_tx, action);
    }
}

impl SectionActivation for InviteePicker {
    fn activate(&mut self) {}

    fn deactivate(&mut self) {}
}

pub struct RenderProps {
    pub border_color: Color,
    pub area: Rect,
}

impl ComponentRender<RenderProps> for InviteePicker {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let line = match self
            .props
            .selected
            .and_then(|idx| self.props.options.get(idx).map(|option| (idx, option)))
        {
            Some((idx, option)) => Line::from(vec![
                Span::from(option.label.clone()).bold(),
                Span::from(format!(" ({}/{})", idx + 1, self.props.options.len())),
            ]),
            None => Line::from(Span::from("nobody to invite").italic()),
        };

        let picker = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::new().fg(props.border_color))
                .title("Invite"),
        );
        frame.render_widget(picker, props.area);
    }
}

impl HasUsageInfo for InviteePicker {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Invite a peer, or take back a pending invite".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to cancel"),
                UsageInfoLine::new(&["↑", "↓"], "to pick a peer"),
                UsageInfoLine::new(&["Enter"], "to (un)invite"),
            ],
        }
    }
}
