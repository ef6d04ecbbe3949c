use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};

use super::{Component, ComponentRender};

/// Single line text editor. The cursor counts characters, not bytes.
pub struct InputBox {
    text: String,
    /// Number of characters left of the cursor
    cursor_position: usize,
}

impl InputBox {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reset(&mut self) {
        self.cursor_position = 0;
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Byte index of the character at the given position
    fn byte_index(&self, position: usize) -> usize {
        self.text
            .char_indices()
            .nth(position)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.char_count());
    }

    fn enter_char(&mut self, new_char: char) {
        let idx = self.byte_index(self.cursor_position);
        self.text.insert(idx, new_char);

        self.move_cursor_right();
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor_position == 0 {
            return;
        }

        let idx = self.byte_index(self.cursor_position - 1);
        self.text.remove(idx);
        self.move_cursor_left();
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor_position < self.char_count() {
            let idx = self.byte_index(self.cursor_position);
            self.text.remove(idx);
        }
    }
}

impl Component for InputBox {
    fn new(_state: &State, _action_tx: UnboundedSender<Action>) -> Self {
        Self {
            text: String::new(),
            cursor_position: 0,
        }
    }

    fn move_with_state(self, _state: &State) -> Self
    where
        Self: Sized,
    {
        self
    }

    fn name(&self) -> &str {
        "Input Box"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char(to_insert) => self.enter_char(to_insert),
            KeyCode::Backspace => self.delete_char_before_cursor(),
            KeyCode::Delete => self.delete_char_at_cursor(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.char_count(),
            _ => {}
        }
    }
}

pub struct RenderProps {
    pub title: String,
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps> for InputBox {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        // keep the cursor inside the box by scrolling long text to the left
        let inner_width = props.area.width.saturating_sub(2) as usize;
        let scroll = (self.cursor_position + 1).saturating_sub(inner_width);

        let input = Paragraph::new(self.text.as_str())
            .style(Style::default().fg(Color::Yellow))
            .scroll((0, scroll as u16))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .fg(props.border_color)
                    .title(props.title),
            );
        frame.render_widget(input, props.area);

        if props.show_cursor {
            frame.set_cursor(
                props.area.x + (self.cursor_position - scroll) as u16 + 1,
                // one line down, from the border to the input line
                props.area.y + 1,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use tokio::sync::mpsc;

    use super::*;

    fn input_box() -> InputBox {
        let (action_tx, _action_rx) = mpsc::unbounded_channel();

        InputBox::new(&State::new("http://localhost", "1"), action_tx)
    }

    fn press(input_box: &mut InputBox, code: KeyCode) {
        input_box.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(input_box: &mut InputBox, text: &str) {
        for c in text.chars() {
            press(input_box, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_editing_multibyte_text() {
        let mut input_box = input_box();
        type_text(&mut input_box, "héllo");

        press(&mut input_box, KeyCode::Left);
        press(&mut input_box, KeyCode::Left);
        press(&mut input_box, KeyCode::Left);
        press(&mut input_box, KeyCode::Backspace);
        assert_eq!(input_box.text(), "hllo");

        type_text(&mut input_box, "ü");
        assert_eq!(input_box.text(), "hüllo");

        press(&mut input_box, KeyCode::Delete);
        assert_eq!(input_box.text(), "hülo");
    }

    #[test]
    fn test_home_end_and_reset() {
        let mut input_box = input_box();
        type_text(&mut input_box, "bc");

        press(&mut input_box, KeyCode::Home);
        type_text(&mut input_box, "a");
        press(&mut input_box, KeyCode::End);
        type_text(&mut input_box, "d");
        assert_eq!(input_box.text(), "abcd");

        input_box.reset();
        assert!(input_box.is_empty());
        press(&mut input_box, KeyCode::Backspace);
        assert!(input_box.is_empty());
    }
}
