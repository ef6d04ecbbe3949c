use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Lines of the message history and the part of them that is on screen.
///
/// Lines are wrapped to the width of the pane. `scroll_offset` is counted in
/// wrapped rows from the top of the content, so a pane showing its last row
/// has an offset of `content - viewport`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePane {
    lines: Vec<String>,
    rows: Vec<Row>,
    /// Columns available to a row, 0 until the pane is laid out
    width: usize,
    viewport_height: usize,
    scroll_offset: usize,
}

/// One screen row of a wrapped line
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub text: String,
    /// Index of the line this row belongs to
    pub line: usize,
}

/// A scroll request coming from the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scroll {
    Up(usize),
    Down(usize),
    Top,
    Bottom,
}

/// Splits the line into rows of at most `width` columns, breaking between words
/// where it can and inside a word that is wider than a row.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::from(line)];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;

    for word in line.split(' ') {
        let gap = usize::from(!row.is_empty());
        let word_width = word.width();

        if row_width + gap + word_width <= width {
            if gap > 0 {
                row.push(' ');
            }
            row.push_str(word);
            row_width += gap + word_width;
            continue;
        }

        if !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }

        for c in word.chars() {
            let char_width = c.width().unwrap_or(0);
            if row_width + char_width > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(c);
            row_width += char_width;
        }
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }

    rows
}

impl MessagePane {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    fn max_offset(&self) -> usize {
        self.rows.len().saturating_sub(self.viewport_height)
    }

    fn rewrap(&mut self) {
        self.rows = self
            .lines
            .iter()
            .enumerate()
            .flat_map(|(line, text)| {
                wrap(text, self.width)
                    .into_iter()
                    .map(move |text| Row { text, line })
            })
            .collect();
    }

    /// `content - viewport - offset <= 0`
    pub fn is_at_bottom(&self) -> bool {
        self.rows.len() as i64 - self.viewport_height as i64 - self.scroll_offset as i64 <= 0
    }

    /// Replaces the content. A pane that showed its last row keeps showing the last row,
    /// any other pane keeps its offset.
    pub fn replace_lines(&mut self, lines: Vec<String>) {
        let was_at_bottom = self.is_at_bottom();

        self.lines = lines;
        self.rewrap();

        if was_at_bottom {
            self.scroll_offset = self.max_offset();
        }
    }

    /// Lays the pane out for a new size. A different width wraps every line again.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        let was_at_bottom = self.is_at_bottom();

        if width != self.width {
            self.width = width;
            self.rewrap();
        }
        self.viewport_height = height;

        self.scroll_offset = if was_at_bottom {
            self.max_offset()
        } else {
            self.scroll_offset.min(self.max_offset())
        };
    }

    pub fn scroll(&mut self, scroll: Scroll) {
        let offset = self.scroll_offset.min(self.max_offset());

        self.scroll_offset = match scroll {
            Scroll::Up(rows) => offset.saturating_sub(rows),
            Scroll::Down(rows) => offset.saturating_add(rows).min(self.max_offset()),
            Scroll::Top => 0,
            Scroll::Bottom => self.max_offset(),
        };
    }

    /// The rows that fit in the viewport at the current offset
    pub fn visible_rows(&self) -> &[Row] {
        let start = self.scroll_offset.min(self.max_offset());
        let end = (start + self.viewport_height).min(self.rows.len());

        &self.rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|idx| format!("line {idx}")).collect()
    }

    fn pane(count: usize, viewport: usize) -> MessagePane {
        let mut pane = MessagePane::default();
        pane.set_viewport(80, viewport);
        pane.replace_lines(lines(count));
        pane
    }

    fn visible(pane: &MessagePane) -> Vec<&str> {
        pane.visible_rows()
            .iter()
            .map(|row| row.text.as_str())
            .collect()
    }

    #[test]
    fn test_starts_at_the_bottom() {
        let pane = pane(30, 10);

        assert!(pane.is_at_bottom());
        assert_eq!(pane.scroll_offset(), 20);
        assert_eq!(visible(&pane).last(), Some(&"line 29"));
    }

    #[test]
    fn test_refresh_at_bottom_follows_new_content() {
        let mut pane = pane(30, 10);

        pane.replace_lines(lines(35));

        assert!(pane.is_at_bottom());
        assert_eq!(pane.scroll_offset(), 25);
        assert_eq!(visible(&pane).last(), Some(&"line 34"));
    }

    #[test]
    fn test_refresh_scrolled_up_keeps_offset() {
        let mut pane = pane(30, 10);
        pane.scroll(Scroll::Up(7));
        assert_eq!(pane.scroll_offset(), 13);

        pane.replace_lines(lines(40));

        assert_eq!(pane.scroll_offset(), 13);
        assert!(!pane.is_at_bottom());
        assert_eq!(visible(&pane).first(), Some(&"line 13"));
    }

    #[test]
    fn test_short_content_is_always_at_bottom() {
        let mut pane = pane(3, 10);
        assert_eq!(pane.scroll_offset(), 0);
        assert!(pane.is_at_bottom());

        pane.replace_lines(lines(12));
        assert_eq!(pane.scroll_offset(), 2);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut pane = pane(30, 10);

        pane.scroll(Scroll::Down(100));
        assert_eq!(pane.scroll_offset(), 20);

        pane.scroll(Scroll::Up(100));
        assert_eq!(pane.scroll_offset(), 0);

        pane.scroll(Scroll::Bottom);
        assert!(pane.is_at_bottom());

        pane.scroll(Scroll::Top);
        assert_eq!(visible(&pane).first(), Some(&"line 0"));
    }

    #[test]
    fn test_resize_keeps_the_bottom_pinned() {
        let mut pane = pane(30, 10);

        pane.set_viewport(80, 5);
        assert_eq!(pane.scroll_offset(), 25);

        pane.scroll(Scroll::Top);
        pane.set_viewport(80, 20);
        assert_eq!(pane.scroll_offset(), 0);
    }

    #[test]
    fn test_wrap_breaks_between_words_and_inside_long_ones() {
        assert_eq!(wrap("alice: hello there", 12), vec!["alice: hello", "there"]);
        assert_eq!(wrap("abcdefghij kl", 4), vec!["abcd", "efgh", "ij", "kl"]);
        assert_eq!(wrap("", 4), vec![""]);
        assert_eq!(wrap("no width", 0), vec!["no width"]);
        // wide characters take two columns
        assert_eq!(wrap("日本語です", 4), vec!["日本", "語で", "す"]);
    }

    #[test]
    fn test_long_message_is_readable_to_its_end() {
        let mut pane = MessagePane::default();
        pane.set_viewport(38, 3);

        let long = format!("[ 10:00 ] alice: {} THE-END", "word ".repeat(30).trim_end());
        pane.replace_lines(vec![String::from("bob: hi"), long]);

        assert!(pane.is_at_bottom());
        assert!(pane.row_count() > 3);
        assert!(pane.visible_rows().iter().all(|row| row.text.width() <= 38));
        let last = pane.visible_rows().last().unwrap();
        assert!(last.text.ends_with("THE-END"));
        assert_eq!(last.line, 1);

        pane.scroll(Scroll::Top);
        assert_eq!(visible(&pane)[0], "bob: hi");
        assert!(visible(&pane)[1].starts_with("[ 10:00 ] alice:"));
    }

    #[test]
    fn test_narrower_pane_rewraps_and_stays_at_the_bottom() {
        let mut pane = MessagePane::default();
        pane.set_viewport(40, 2);
        pane.replace_lines(vec![String::from("one two three four five six")]);
        assert_eq!(pane.row_count(), 1);

        pane.set_viewport(10, 2);
        assert_eq!(pane.row_count(), 3);
        assert!(pane.is_at_bottom());
        assert_eq!(visible(&pane), vec!["three four", "five six"]);
    }
}
