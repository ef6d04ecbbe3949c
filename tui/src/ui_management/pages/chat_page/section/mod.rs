pub mod usage;

/// The parts of the chat page that take keyboard input, in hover order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section {
    MessageInput,
    Messages,
    Invitations,
    Rooms,
    Invitees,
}

impl Section {
    const ORDER: [Section; 5] = [
        Section::MessageInput,
        Section::Messages,
        Section::Invitations,
        Section::Rooms,
        Section::Invitees,
    ];

    fn position(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|section| section == self)
            .unwrap_or(0)
    }

    pub fn next(&self) -> Section {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(&self) -> Section {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

pub trait SectionActivation {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_order_wraps() {
        assert_eq!(Section::MessageInput.next(), Section::Messages);
        assert_eq!(Section::Invitations.next(), Section::Rooms);
        assert_eq!(Section::Invitees.next(), Section::MessageInput);
        assert_eq!(Section::MessageInput.previous(), Section::Invitees);
    }
}
