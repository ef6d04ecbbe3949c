use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, ConnectionStatus, State};

use self::{chat_page::ChatPage, connect_page::ConnectPage};

use super::components::{dispatch, Component, ComponentRender};

pub use self::chat_page::message_pane_size;

mod chat_page;
mod connect_page;

enum ActivePage {
    ChatPage,
    ConnectPage,
}

struct Props {
    active_page: ActivePage,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            active_page: match state.connection_status {
                ConnectionStatus::Connected => ActivePage::ChatPage,
                _ => ActivePage::ConnectPage,
            },
        }
    }
}

/// Shows the connect page until the room page is loaded, then the chat page
pub struct AppRouter {
    action_tx: UnboundedSender<Action>,
    props: Props,
    //
    chat_page: ChatPage,
    connect_page: ConnectPage,
}

impl AppRouter {
    fn get_active_page_component_mut(&mut self) -> &mut dyn Component {
        match self.props.active_page {
            ActivePage::ChatPage => &mut self.chat_page,
            ActivePage::ConnectPage => &mut self.connect_page,
        }
    }

    pub fn is_chatting(&self) -> bool {
        matches!(self.props.active_page, ActivePage::ChatPage)
    }
}

impl Component for AppRouter {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        AppRouter {
            props: Props::from(state),
            //
            chat_page: ChatPage::new(state, action_tx.clone()),
            connect_page: ConnectPage::new(state, action_tx.clone()),
            action_tx,
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        AppRouter {
            props: Props::from(state),
            //
            chat_page: self.chat_page.move_with_state(state),
            connect_page: self.connect_page.move_with_state(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "App Router"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl+C quits from anywhere, even while typing
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            dispatch(&self.action_tx, Action::Exit);
            return;
        }

        self.get_active_page_component_mut().handle_key_event(key)
    }
}

impl ComponentRender<()> for AppRouter {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: ()) {
        match self.props.active_page {
            ActivePage::ChatPage => self.chat_page.render(frame, props),
            ActivePage::ConnectPage => self.connect_page.render(frame, props),
        }
    }
}
