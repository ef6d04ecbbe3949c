use crossterm::event::KeyEvent;
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};

pub mod input_box;

/// A piece of the UI. It keeps the props it maps out of every new [State]
/// and turns key presses into [Action]s for the state store.
pub trait Component {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized;
    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized;

    fn name(&self) -> &str;

    fn handle_key_event(&mut self, key: KeyEvent);
}

pub trait ComponentRender<Props> {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: Props);
}

/// Hands the action to the state store. The store only goes away on shutdown, so a failed send is logged and dropped.
pub fn dispatch(action_tx: &UnboundedSender<Action>, action: Action) {
    if let Err(err) = action_tx.send(action) {
        tracing::debug!(action = ?err.0, "state store is gone, action dropped");
    }
}
