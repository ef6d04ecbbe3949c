use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    state_store::{action::Action, ConnectionStatus, State},
    ui_management::components::{dispatch, Component, ComponentRender},
};

struct Props {
    server: String,
    room: String,
    connection_status: ConnectionStatus,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            server: state.server.clone(),
            room: state.room.clone(),
            connection_status: state.connection_status.clone(),
        }
    }
}

/// ConnectPage is shown until the room page is loaded
pub struct ConnectPage {
    /// Action sender
    pub action_tx: UnboundedSender<Action>,
    props: Props,
}

impl Component for ConnectPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            action_tx,
            props: Props::from(state),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Connect Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Enter => dispatch(&self.action_tx, Action::Connect),
            KeyCode::Char('q') => dispatch(&self.action_tx, Action::Exit),
            _ => {}
        }
    }
}

impl ComponentRender<()> for ConnectPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [_, vertical_centered, _] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Ratio(1, 3),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 3),
                ]
                .as_ref(),
            )
            .split(frame.size())
        else {
            panic!("The main layout should have 3 chunks")
        };

        let [_, both_centered, _] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Ratio(1, 4),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 4),
                ]
                .as_ref(),
            )
            .split(vertical_centered)
        else {
            panic!("The horizontal layout should have 3 chunks")
        };

        let [container_target, container_status] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)].as_ref())
            .split(both_centered)
        else {
            panic!("The centered layout should have 2 chunks")
        };

        let target = Paragraph::new(Text::from(vec![
            Line::from(format!("Server: {}", self.props.server)),
            Line::from(format!("Room: {}", self.props.room)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Room Page"));
        frame.render_widget(target, container_target);

        let status_lines = match &self.props.connection_status {
            ConnectionStatus::Uninitialized => vec![Line::from(vec![
                "Press ".into(),
                "<Enter>".bold(),
                " to load the room.".into(),
            ])],
            ConnectionStatus::Loading | ConnectionStatus::Connected => {
                vec![Line::from("Loading the room page...")]
            }
            ConnectionStatus::Errored { err } => vec![
                Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))),
                Line::from(vec![
                    "Press ".into(),
                    "<Enter>".bold(),
                    " to retry or ".into(),
                    "<q>".bold(),
                    " to quit.".into(),
                ]),
            ],
        };
        let status = Paragraph::new(Text::from(status_lines)).wrap(Wrap { trim: true });
        frame.render_widget(status, container_status);
    }
}
