use std::rc::Rc;

use log::warn;

use crate::unit::{Control, ControlKind, ControlValue};

use super::view::{ChoiceView, LabelView};
use super::ControlUi;

#[derive(Clone)]
pub struct MenuControl {
    label: Rc<dyn LabelView>,
    combo: Rc<dyn ChoiceView>,
}

impl MenuControl {
    pub fn new(label: Rc<dyn LabelView>, combo: Rc<dyn ChoiceView>) -> Self {
        MenuControl { label, combo }
    }
}

impl ControlUi for MenuControl {
    fn apply_sensitivity(&self, control: &Control) {
        self.combo.set_interactive(control.enabled);
        self.label.set_interactive(control.enabled);

        if let ControlKind::Enumeration { entries } = &control.kind {
            let enabled: Vec<bool> = entries.iter().map(|e| e.enabled).collect();
            self.combo.set_entries_enabled(&enabled);
        }
    }

    fn pull_value(&self, value: &ControlValue) {
        match value {
            ControlValue::Enumeration(index) => {
                if self.combo.selected_index() != Some(*index) {
                    self.combo.select_index(Some(*index));
                }
            }
            other => warn!("Menu cannot show a {} value", other.type_name()),
        }
    }

    fn widget_value(&self) -> Option<ControlValue> {
        self.combo.selected_index().map(ControlValue::Enumeration)
    }
}
