//! Reads the HTML the server renders for pages and fragments.
//!
//! This is not a conforming HTML parser. It understands what the chat pages are
//! made of: nested elements, quoted and bare attributes, void elements, comments,
//! raw text in `script`/`style`, character entities, and list/table/option
//! elements whose closing tag is left out.

const ROOT: &str = "#fragment";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A parsed piece of HTML
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its lower-cased name, attributes in document order, and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Element {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Text content with runs of whitespace collapsed to single spaces and the ends trimmed.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);

        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Direct children that are elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Every element below this one, in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for element in self.child_elements() {
            out.push(element);
            element.collect_descendants(out);
        }
    }

    /// Descendants with the given element name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants()
            .into_iter()
            .filter(move |element| element.name == name)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|element| element.id() == Some(id))
    }
}

/// Parses an HTML document or fragment.
/// The returned element is a synthetic root holding the top-level nodes.
pub fn parse(html: &str) -> Element {
    let mut builder = TreeBuilder::new();
    let mut cursor = Cursor::new(html);

    while !cursor.is_done() {
        if cursor.eat("<!--") {
            cursor.skip_past("-->");
        } else if cursor.eat("</") {
            let name = cursor
                .take_while(|c| !c.is_whitespace() && c != '>')
                .to_ascii_lowercase();
            cursor.skip_past(">");
            builder.close(&name);
        } else if cursor.starts_with("<!") || cursor.starts_with("<?") {
            cursor.skip_past(">");
        } else if cursor.at_start_tag() {
            cursor.bump();
            let (name, attributes, self_closing) = read_start_tag(&mut cursor);

            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                let raw = cursor.take_until(&format!("</{name}"));
                builder.open(name.clone(), attributes);
                builder.text(raw.to_string());
                builder.close(&name);
            } else {
                let is_void = self_closing || VOID_ELEMENTS.contains(&name.as_str());
                builder.open(name.clone(), attributes);
                if is_void {
                    builder.close(&name);
                }
            }
        } else {
            // a '<' that does not start a tag is plain text
            let start = cursor.pos;
            cursor.bump();
            cursor.take_while(|c| c != '<');
            builder.text(decode_entities(&html[start..cursor.pos]));
        }
    }

    builder.finish()
}

fn read_start_tag(cursor: &mut Cursor<'_>) -> (String, Vec<(String, String)>, bool) {
    let name = cursor
        .take_while(|c| !c.is_whitespace() && c != '>' && c != '/')
        .to_ascii_lowercase();
    let mut attributes = Vec::new();

    loop {
        cursor.skip_whitespace();

        if cursor.eat("/>") {
            return (name, attributes, true);
        }
        if cursor.is_done() || cursor.eat(">") {
            return (name, attributes, false);
        }
        if cursor.eat("/") {
            continue;
        }

        let key = cursor
            .take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'))
            .to_ascii_lowercase();
        if key.is_empty() {
            cursor.bump();
            continue;
        }

        cursor.skip_whitespace();
        let value = if cursor.eat("=") {
            cursor.skip_whitespace();
            read_attribute_value(cursor)
        } else {
            String::new()
        };

        attributes.push((key, value));
    }
}

fn read_attribute_value(cursor: &mut Cursor<'_>) -> String {
    match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            cursor.bump();
            let value = cursor.take_while(|c| c != quote);
            cursor.bump();
            decode_entities(value)
        }
        _ => decode_entities(cursor.take_while(|c| !c.is_whitespace() && c != '>')),
    }
}

struct TreeBuilder {
    /// open elements, the synthetic root at the bottom
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            stack: vec![Element::new(ROOT.to_string(), Vec::new())],
        }
    }

    fn current_name(&self) -> &str {
        self.stack
            .last()
            .map(|element| element.name.as_str())
            .unwrap_or(ROOT)
    }

    fn open(&mut self, name: String, attributes: Vec<(String, String)>) {
        // list items, options and table cells close an open sibling of their own kind
        let closes: &[&str] = match name.as_str() {
            "li" => &["li"],
            "option" => &["option"],
            "tr" => &["tr", "td", "th"],
            "td" | "th" => &["td", "th"],
            "p" => &["p"],
            _ => &[],
        };
        while self.stack.len() > 1 && closes.contains(&self.current_name()) {
            self.pop_into_parent();
        }

        self.stack.push(Element::new(name, attributes));
    }

    fn close(&mut self, name: &str) {
        // stray closing tags are dropped
        let Some(position) = self.stack.iter().rposition(|element| element.name == name) else {
            return;
        };
        if position == 0 {
            return;
        }

        while self.stack.len() > position {
            self.pop_into_parent();
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(current) = self.stack.last_mut() {
            current.children.push(Node::Text(text));
        }
    }

    fn pop_into_parent(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(element) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(Node::Element(element));
            }
        }
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            self.pop_into_parent();
        }

        self.stack
            .pop()
            .unwrap_or_else(|| Element::new(ROOT.to_string(), Vec::new()))
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn at_start_tag(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Returns everything up to `needle` and leaves the cursor on it.
    fn take_until(&mut self, needle: &str) -> &'a str {
        let start = self.pos;
        self.pos = match self.rest().find(needle) {
            Some(offset) => self.pos + offset,
            None => self.src.len(),
        };
        &self.src[start..self.pos]
    }

    fn skip_past(&mut self, needle: &str) {
        self.take_until(needle);
        self.eat(needle);
    }
}

/// Replaces the character entities the server emits with the characters they stand for.
/// Unknown entities are kept as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(|c| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
