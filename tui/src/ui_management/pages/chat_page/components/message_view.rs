use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use super::super::section::{
    usage::{HasUsageInfo, UsageInfo, UsageInfoLine},
    SectionActivation,
};
use crate::{
    state_store::{action::Action, Scroll, State},
    ui_management::components::{dispatch, Component, ComponentRender},
};

struct Props {
    /// The wrapped rows inside the viewport, styled after the message they belong to
    visible_rows: Vec<(String, Style)>,
    total_lines: usize,
    viewport_height: usize,
    at_bottom: bool,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        let pane = &state.message_pane;

        Props {
            visible_rows: pane
                .visible_rows()
                .iter()
                .map(|row| (row.text.clone(), line_style(&pane.lines()[row.line])))
                .collect(),
            total_lines: pane.lines().len(),
            viewport_height: pane.viewport_height(),
            at_bottom: pane.is_at_bottom(),
        }
    }
}

/// The message history of the room. Scrolling happens in the state store, so a refresh can tell
/// whether the user was following the conversation.
pub struct MessageView {
    action_tx: UnboundedSender<Action>,
    props: Props,
}

impl MessageView {
    fn scroll(&self, scroll: Scroll) {
        dispatch(&self.action_tx, Action::ScrollMessages(scroll));
    }
}

impl Component for MessageView {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        MessageView {
            action_tx,
            props: Props::from(state),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        MessageView {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Messages"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let page = self.props.viewport_height.max(1);

        match key.code {
            KeyCode::Up => self.scroll(Scroll::Up(1)),
            KeyCode::Down => self.scroll(Scroll::Down(1)),
            KeyCode::PageUp => self.scroll(Scroll::Up(page)),
            KeyCode::PageDown => self.scroll(Scroll::Down(page)),
            KeyCode::Home => self.scroll(Scroll::Top),
            KeyCode::End => self.scroll(Scroll::Bottom),
            _ => (),
        }
    }
}

impl SectionActivation for MessageView {
    fn activate(&mut self) {}

    fn deactivate(&mut self) {}
}

pub struct RenderProps {
    pub border_color: Color,
    pub area: Rect,
}

/// Day changes and notices have no author, they are set apart from messages
fn line_style(line: &str) -> Style {
    if line.starts_with('[') {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::ITALIC)
    }
}

impl ComponentRender<RenderProps> for MessageView {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let items: Vec<ListItem> = self
            .props
            .visible_rows
            .iter()
            .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.clone(), *style))))
            .collect();

        let title = if self.props.at_bottom {
            format!("Messages ({})", self.props.total_lines)
        } else {
            format!("Messages ({}, scrolled up)", self.props.total_lines)
        };

        let messages = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::new().fg(props.border_color))
                .title(title),
        );
        frame.render_widget(messages, props.area);
    }
}

impl HasUsageInfo for MessageView {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Scroll the messages. New ones follow only at the bottom.".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to stop scrolling"),
                UsageInfoLine::new(&["↑", "↓"], "by a line"),
                UsageInfoLine::new(&["PgUp", "PgDn"], "by a page"),
                UsageInfoLine::new(&["Home", "End"], "to the first or last message"),
            ],
        }
    }
}
