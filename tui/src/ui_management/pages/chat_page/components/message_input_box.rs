use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::Color,
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
    /// Messages the server accepted so far. The input is cleared when this goes up.
    delivered_messages: usize,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Self {
            delivered_messages: state.delivered_messages,
        }
    }
}

pub struct MessageInputBox {
    action_tx: UnboundedSender<Action>,
    /// State Mapped MessageInputBox Props
    props: Props,
    // Internal State for the Component
    pub input_box: InputBox,
}

impl MessageInputBox {
    /// The text stays until the server confirms the message, a failed POST keeps it for another try
    fn submit_message(&mut self) {
        if self.input_box.is_empty() {
            return;
        }

        dispatch(
            &self.action_tx,
            Action::SendMessage {
                content: String::from(self.input_box.text()),
            },
        );
    }
}

impl Component for MessageInputBox {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            //
            input_box: InputBox::new(state, action_tx),
        }
    }

    fn move_with_state(mut self, state: &State) -> Self
    where
        Self: Sized,
    {
        let props = Props::from(state);
        if props.delivered_messages != self.props.delivered_messages {
            self.input_box.reset();
        }

        Self { props, ..self }
    }

    fn name(&self) -> &str {
        "Message Input"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Enter {
            self.submit_message();
        } else {
            self.input_box.handle_key_event(key);
        }
    }
}

impl SectionActivation for MessageInputBox {
    fn activate(&mut self) {}

    fn deactivate(&mut self) {}
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps> for MessageInputBox {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        self.input_box.render(
            frame,
            input_box::RenderProps {
                title: "Message".into(),
                area: props.area,
                border_color: props.border_color,
                show_cursor: props.show_cursor,
            },
        )
    }
}

impl HasUsageInfo for MessageInputBox {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Type a message for the room".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to stop typing"),
                UsageInfoLine::new(&["Enter"], "to send, the text clears once delivered"),
            ],
        }
    }
}
