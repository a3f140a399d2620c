use std::cell::Cell;
use std::path::Path;

use log::{debug, warn};

use crate::unit::{ControlValue, Unit};

use super::view::WidgetEvent;
use super::{BoundControl, ControlBinding};

/// Keeps widgets and unit controls in agreement.
///
/// Widget signals fired while a [`Suppression`] is alive are the echo of a
/// programmatic update and must not be pushed back to the unit.
#[derive(Default)]
pub struct SyncController {
    suppressed: Cell<bool>,
}

/// Restores the previous suppression state when dropped.
#[must_use]
pub struct Suppression<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl Drop for Suppression<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl SyncController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suppress(&self) -> Suppression<'_> {
        Suppression {
            previous: self.suppressed.replace(true),
            flag: &self.suppressed,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    /// Shows `value` without letting the widget's signals reach the unit.
    pub fn pull(&self, binding: &ControlBinding, value: &ControlValue) {
        let _guard = self.suppress();
        binding.pull_value(value);
    }

    /// Re-reads the control's enabled state and value from the unit.
    pub fn refresh_state(&self, unit: &dyn Unit, binding: &ControlBinding) {
        let _guard = self.suppress();

        if let Some(control) = unit.control(binding.id()) {
            binding.apply_sensitivity(&control);
        }
        match unit.control_value(binding.id()) {
            Some(value) => binding.pull_value(&value),
            None => binding.refresh_display(),
        }
    }

    /// Forwards a user interaction to the unit.
    pub fn push(&self, unit: &dyn Unit, binding: &ControlBinding, event: &WidgetEvent) {
        if self.is_suppressed() {
            return;
        }

        match event {
            WidgetEvent::Pressed => self.fire_one_shot(unit, binding),
            WidgetEvent::Commit => self.commit_text(unit, binding),
            WidgetEvent::Cancel => self.cancel_text(unit, binding),
            WidgetEvent::FileChosen(path) => self.choose_file(unit, binding, path),
            WidgetEvent::ValueChanged => self.push_value(unit, binding),
        }
    }

    fn fire_one_shot(&self, unit: &dyn Unit, binding: &ControlBinding) {
        if let Err(e) = unit.try_set_control(binding.id(), ControlValue::Boolean(true)) {
            debug!("{} [{}] not triggered: {}", unit.id(), binding.name(), e);
        }
    }

    fn commit_text(&self, unit: &dyn Unit, binding: &ControlBinding) {
        let BoundControl::String(string_control) = binding.bound() else {
            return;
        };

        let text = string_control.entry().entry_text();
        if let Err(e) = unit.try_set_control(binding.id(), ControlValue::String(text)) {
            debug!("{} [{}] kept its text: {}", unit.id(), binding.name(), e);
        }

        self.restore_from_unit(unit, binding);
        string_control.entry().cursor_to_end();
    }

    fn cancel_text(&self, unit: &dyn Unit, binding: &ControlBinding) {
        self.restore_from_unit(unit, binding);

        if let BoundControl::String(string_control) = binding.bound() {
            string_control.entry().cursor_to_end();
        }
    }

    fn restore_from_unit(&self, unit: &dyn Unit, binding: &ControlBinding) {
        if let Some(value) = unit.control_value(binding.id()) {
            self.pull(binding, &value);
        }
    }

    fn choose_file(&self, unit: &dyn Unit, binding: &ControlBinding, path: &Path) {
        let chosen = ControlValue::String(path.to_string_lossy().into_owned());

        if unit.control_value(binding.id()).as_ref() != Some(&chosen) {
            if let Err(e) = unit.try_set_control(binding.id(), chosen) {
                debug!("{} [{}] refused {}: {}", unit.id(), binding.name(), path.display(), e);
            }
        }

        self.restore_from_unit(unit, binding);
    }

    fn push_value(&self, unit: &dyn Unit, binding: &ControlBinding) {
        let Some(requested) = binding.widget_value() else {
            return;
        };

        let Some(current) = unit.control_value(binding.id()) else {
            warn!("{} has no control [{}]", unit.id(), binding.name());
            return;
        };

        if current == requested {
            binding.refresh_display();
            return;
        }

        if let Err(e) = unit.try_set_control(binding.id(), requested.clone()) {
            debug!("{} [{}] rejected {}: {}", unit.id(), binding.name(), requested, e);
        }

        match unit.control_value(binding.id()) {
            Some(actual) if actual != requested => {
                debug!("{} [{}] rolled back to {}", unit.id(), binding.name(), actual);
                self.pull(binding, &actual);
            }
            _ => binding.refresh_display(),
        }
    }
}
