use std::rc::Rc;

use log::warn;

use crate::unit::{Control, ControlValue};

use super::view::{LabelView, Sensitive, TextView};
use super::ControlUi;

#[derive(Clone)]
pub enum StringCompanion {
    /// Opens a save dialog; the entry itself is read-only.
    FileChooser(Rc<dyn Sensitive>),
    /// Submits the edited text.
    SetButton(Rc<dyn Sensitive>),
}

#[derive(Clone)]
pub struct StringControl {
    label: Rc<dyn LabelView>,
    entry: Rc<dyn TextView>,
    companion: StringCompanion,
}

impl StringControl {
    pub fn new(
        label: Rc<dyn LabelView>,
        entry: Rc<dyn TextView>,
        companion: StringCompanion,
    ) -> Self {
        StringControl {
            label,
            entry,
            companion,
        }
    }

    pub fn is_filename(&self) -> bool {
        matches!(self.companion, StringCompanion::FileChooser(_))
    }

    pub fn entry(&self) -> &Rc<dyn TextView> {
        &self.entry
    }
}

impl ControlUi for StringControl {
    fn apply_sensitivity(&self, control: &Control) {
        self.entry.set_interactive(control.enabled);
        self.label.set_interactive(control.enabled);

        match &self.companion {
            StringCompanion::FileChooser(button) | StringCompanion::SetButton(button) => {
                button.set_interactive(control.enabled)
            }
        }
    }

    fn pull_value(&self, value: &ControlValue) {
        match value {
            ControlValue::String(text) => self.entry.set_entry_text(text),
            other => warn!("Text entry cannot show a {} value", other.type_name()),
        }
    }

    fn widget_value(&self) -> Option<ControlValue> {
        Some(ControlValue::String(self.entry.entry_text()))
    }
}
