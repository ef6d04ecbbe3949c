use comms::fragment::InviteOption;

/// The peers that can be invited to the room and the one currently selected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InviteDropDown {
    options: Vec<InviteOption>,
    selected: usize,
}

impl InviteDropDown {
    pub fn options(&self) -> &[InviteOption] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.options.is_empty()).then_some(self.selected)
    }

    pub fn selected(&self) -> Option<&InviteOption> {
        self.options.get(self.selected)
    }

    /// Replaces the options. The selected peer stays selected if it is still offered,
    /// otherwise the first option is.
    pub fn replace_options(&mut self, options: Vec<InviteOption>) {
        let selected_value = self.selected().map(|option| option.value.clone());

        self.selected = selected_value
            .and_then(|value| options.iter().position(|option| option.value == value))
            .unwrap_or(0);
        self.options = options;
    }

    /// Moves the selection down by one, wrapping from the last option to the first.
    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }

        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }

        self.selected = match self.selected {
            0 => self.options.len() - 1,
            idx => idx - 1,
        };
    }
}
