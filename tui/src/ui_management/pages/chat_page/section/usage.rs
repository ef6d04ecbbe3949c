use ratatui::{
    style::Stylize,
    text::{Line, Span, Text},
};

/// A key binding and what it does, e.g. `(Enter) to send`
#[derive(Debug, Clone)]
pub struct UsageInfoLine {
    pub keys: Vec<String>,
    pub description: String,
}

impl UsageInfoLine {
    pub fn new(keys: &[&str], description: &str) -> Self {
        UsageInfoLine {
            keys: keys.iter().map(|key| String::from(*key)).collect(),
            description: String::from(description),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsageInfo {
    pub description: Option<String>,
    pub lines: Vec<UsageInfoLine>,
}

pub trait HasUsageInfo {
    fn usage_info(&self) -> UsageInfo;
}

fn key_to_span<'a>(key: &str) -> Span<'a> {
    Span::from(format!("({key})")).bold()
}

/// Lists the keys as `(a)`, `(a) or (b)`, or `(a), (b), or (c)`
fn key_bindings<'a>(keys: &[String]) -> Vec<Span<'a>> {
    let mut spans = Vec::with_capacity(keys.len() * 2);

    for (idx, key) in keys.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::from(match (keys.len(), idx == keys.len() - 1) {
                (2, _) => " or ",
                (_, true) => ", or ",
                _ => ", ",
            }));
        }
        spans.push(key_to_span(key));
    }

    spans
}

pub fn widget_usage_to_text<'a>(usage: UsageInfo) -> Text<'a> {
    let mut lines: Vec<Line> = usage.description.into_iter().map(Line::from).collect();

    for usage_line in usage.lines {
        let mut spans = key_bindings(&usage_line.keys);
        spans.push(Span::from(format!(" {}", usage_line.description)));

        lines.push(Line::from(spans));
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }

    #[test]
    fn test_usage_lines() {
        let text = widget_usage_to_text(UsageInfo {
            description: Some(String::from("Scroll the messages")),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to cancel"),
                UsageInfoLine::new(&["↑", "↓"], "to scroll"),
                UsageInfoLine::new(&["PgUp", "PgDn", "Home"], "to jump"),
            ],
        });

        let lines: Vec<String> = text.lines.iter().map(plain).collect();
        assert_eq!(
            lines,
            vec![
                "Scroll the messages",
                "(Esc) to cancel",
                "(↑) or (↓) to scroll",
                "(PgUp), (PgDn), or (Home) to jump",
            ]
        );
    }
}
