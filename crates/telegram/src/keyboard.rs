use courtside_core::presentation::ControlLayout;

use crate::api::{InlineKeyboardButton, InlineKeyboardMarkup};

pub struct KeyboardBuilder {
    rows: Vec<Vec<InlineKeyboardButton>>,
}

impl KeyboardBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn row<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut RowBuilder),
    {
        let mut builder = RowBuilder::default();
        build(&mut builder);
        let buttons = builder.build();
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    pub fn build(self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup { inline_keyboard: self.rows }
    }
}

impl Default for KeyboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct RowBuilder {
    buttons: Vec<InlineKeyboardButton>,
}

impl RowBuilder {
    pub fn button(
        &mut self,
        text: impl Into<String>,
        callback_data: impl Into<String>,
    ) -> &mut Self {
        self.buttons
            .push(InlineKeyboardButton { text: text.into(), callback_data: callback_data.into() });
        self
    }

    fn build(self) -> Vec<InlineKeyboardButton> {
        self.buttons
    }
}

/// Maps the platform-neutral control layout onto an inline keyboard, row for row.
pub fn inline_keyboard(layout: &ControlLayout) -> InlineKeyboardMarkup {
    layout
        .rows
        .iter()
        .fold(KeyboardBuilder::new(), |keyboard, row| {
            keyboard.row(|buttons| {
                for control in row {
                    buttons.button(&control.label, &control.selector);
                }
            })
        })
        .build()
}
