use std::cell::{Cell, RefCell};

use log::debug;

use super::{
    Control, ControlId, ControlKind, ControlValue, OutputFormat, UiHints, Unit, UnitError,
    UnitEvent, UnitSignals, UnitStatus,
};

struct SimulatedControl {
    control: Control,
    value: ControlValue,
    rejecting: bool,
}

/// A unit living entirely in memory.
///
/// Behaves like a cooperative device: integers are clamped and snapped to
/// their step, floats are clamped, disabled enumeration entries are refused
/// and one-shot booleans fall back to `false` right after firing. Every write
/// attempt and stream lifecycle call is recorded.
pub struct SimulatedUnit {
    id: String,
    name: String,
    controls: RefCell<Vec<SimulatedControl>>,
    status: Cell<UnitStatus>,
    formats: RefCell<Vec<OutputFormat>>,
    current_format: RefCell<Option<OutputFormat>>,
    preferred_format: RefCell<Option<OutputFormat>>,
    writes: RefCell<Vec<(ControlId, ControlValue)>>,
    stream_calls: RefCell<Vec<String>>,
    failing_call: RefCell<Option<String>>,
    signals: UnitSignals,
}

impl SimulatedUnit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        SimulatedUnit {
            id: id.into(),
            name: name.into(),
            controls: RefCell::new(vec![]),
            status: Cell::new(UnitStatus::Idle),
            formats: RefCell::new(vec![]),
            current_format: RefCell::new(None),
            preferred_format: RefCell::new(None),
            writes: RefCell::new(vec![]),
            stream_calls: RefCell::new(vec![]),
            failing_call: RefCell::new(None),
            signals: UnitSignals::new(),
        }
    }

    pub fn with_control(self, control: Control, value: ControlValue) -> Self {
        self.controls.borrow_mut().push(SimulatedControl {
            control,
            value,
            rejecting: false,
        });
        self
    }

    /// The first format becomes the current one.
    pub fn with_output_formats(self, formats: Vec<OutputFormat>) -> Self {
        *self.current_format.borrow_mut() = formats.first().cloned();
        *self.formats.borrow_mut() = formats;
        self
    }

    pub fn with_status(self, status: UnitStatus) -> Self {
        self.status.set(status);
        self
    }

    /// Makes every later write to `id` fail without changing the value.
    pub fn set_rejecting(&self, id: ControlId, rejecting: bool) {
        if let Some(entry) = self.controls.borrow_mut().iter_mut().find(|c| c.control.id == id) {
            entry.rejecting = rejecting;
        }
    }

    /// Makes the named stream call fail. Names are the ones recorded in
    /// [`SimulatedUnit::stream_calls`].
    pub fn fail_stream_call(&self, call: &str) {
        *self.failing_call.borrow_mut() = Some(call.to_string());
    }

    /// Changes a value the way the device itself would, bypassing validation.
    pub fn set_external_value(&self, id: ControlId, value: ControlValue) {
        let changed = {
            let mut controls = self.controls.borrow_mut();
            match controls.iter_mut().find(|c| c.control.id == id) {
                Some(entry) if entry.value != value => {
                    entry.value = value.clone();
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.signals.emit(&UnitEvent::ControlValueChanged { id, value });
        }
    }

    pub fn set_enabled(&self, id: ControlId, enabled: bool) {
        let changed = {
            let mut controls = self.controls.borrow_mut();
            match controls.iter_mut().find(|c| c.control.id == id) {
                Some(entry) if entry.control.enabled != enabled => {
                    entry.control.enabled = enabled;
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.signals.emit(&UnitEvent::ControlParametersChanged { id });
        }
    }

    pub fn set_entry_enabled(&self, id: ControlId, index: usize, enabled: bool) {
        let changed = {
            let mut controls = self.controls.borrow_mut();
            let entry = controls.iter_mut().find(|c| c.control.id == id);
            match entry.map(|e| &mut e.control.kind) {
                Some(ControlKind::Enumeration { entries }) => match entries.get_mut(index) {
                    Some(item) if item.enabled != enabled => {
                        item.enabled = enabled;
                        true
                    }
                    _ => false,
                },
                _ => false,
            }
        };

        if changed {
            self.signals.emit(&UnitEvent::ControlParametersChanged { id });
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn writes(&self) -> Vec<(ControlId, ControlValue)> {
        self.writes.borrow().clone()
    }

    pub fn stream_calls(&self) -> Vec<String> {
        self.stream_calls.borrow().clone()
    }

    fn record_stream_call(&self, call: &str) -> Result<(), UnitError> {
        self.stream_calls.borrow_mut().push(call.to_string());

        if self.failing_call.borrow().as_deref() == Some(call) {
            return Err(UnitError::Rejected {
                id: 0,
                reason: format!("{} failed on {}", call, self.id),
            });
        }
        Ok(())
    }

    fn change_status(&self, status: UnitStatus) {
        let old = self.status.replace(status);
        if old != status {
            debug!("{}: {} -> {}", self.id, old, status);
            self.signals.emit(&UnitEvent::StatusChanged { old });
        }
    }
}

/// The value a cooperative device would end up holding after a write.
fn accepted_value(control: &Control, value: ControlValue) -> Result<ControlValue, UnitError> {
    let id = control.id;

    match (&control.kind, value) {
        (ControlKind::Integer { min, max, step }, ControlValue::Integer(v)) => {
            let clamped = v.max(*min).min(*max);
            let snapped = if *step > 0 {
                min + (clamped - min + step / 2) / step * step
            } else {
                clamped
            };
            Ok(ControlValue::Integer(snapped.min(*max)))
        }
        (ControlKind::Float { min, max, .. }, ControlValue::Float(v)) => {
            Ok(ControlValue::Float(v.max(*min).min(*max)))
        }
        (ControlKind::Boolean, ControlValue::Boolean(_))
            if control.hints.contains(UiHints::ONE_SHOT) =>
        {
            Ok(ControlValue::Boolean(false))
        }
        (ControlKind::Boolean, ControlValue::Boolean(v)) => Ok(ControlValue::Boolean(v)),
        (ControlKind::Enumeration { entries }, ControlValue::Enumeration(index)) => {
            match entries.get(index as usize) {
                Some(entry) if entry.enabled => Ok(ControlValue::Enumeration(index)),
                Some(entry) => Err(UnitError::Rejected {
                    id,
                    reason: format!("entry '{}' is disabled", entry.label),
                }),
                None => Err(UnitError::Rejected {
                    id,
                    reason: format!("entry {} out of range", index),
                }),
            }
        }
        (ControlKind::String, ControlValue::String(v)) => Ok(ControlValue::String(v)),
        (kind, value) => Err(UnitError::TypeMismatch {
            id,
            expected: kind.type_name().to_string(),
            actual: value.type_name(),
        }),
    }
}

impl Unit for SimulatedUnit {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn controls(&self) -> Vec<Control> {
        self.controls
            .borrow()
            .iter()
            .map(|c| c.control.clone())
            .collect()
    }

    fn control(&self, id: ControlId) -> Option<Control> {
        self.controls
            .borrow()
            .iter()
            .find(|c| c.control.id == id)
            .map(|c| c.control.clone())
    }

    fn control_value(&self, id: ControlId) -> Option<ControlValue> {
        self.controls
            .borrow()
            .iter()
            .find(|c| c.control.id == id)
            .map(|c| c.value.clone())
    }

    fn try_set_control(&self, id: ControlId, value: ControlValue) -> Result<(), UnitError> {
        self.writes.borrow_mut().push((id, value.clone()));

        let changed = {
            let mut controls = self.controls.borrow_mut();
            let entry = controls
                .iter_mut()
                .find(|c| c.control.id == id)
                .ok_or(UnitError::UnknownControl(id))?;

            if entry.rejecting {
                return Err(UnitError::Rejected {
                    id,
                    reason: "device refuses writes".to_string(),
                });
            }

            let accepted = accepted_value(&entry.control, value)?;
            if entry.value == accepted {
                None
            } else {
                entry.value = accepted.clone();
                Some(accepted)
            }
        };

        if let Some(value) = changed {
            self.signals.emit(&UnitEvent::ControlValueChanged { id, value });
        }
        Ok(())
    }

    fn status(&self) -> UnitStatus {
        self.status.get()
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.formats.borrow().clone()
    }

    fn output_format(&self) -> Option<OutputFormat> {
        self.current_format.borrow().clone()
    }

    fn stream_set_preferred_format(&self, format: &OutputFormat) -> Result<(), UnitError> {
        self.record_stream_call("set_preferred_format")?;

        if !self.formats.borrow().contains(format) {
            return Err(UnitError::Unsupported(format!(
                "{} does not offer format {}",
                self.id, format.name
            )));
        }
        *self.preferred_format.borrow_mut() = Some(format.clone());
        Ok(())
    }

    fn stream_shutdown(&self) -> Result<(), UnitError> {
        self.record_stream_call("shutdown")?;
        self.change_status(UnitStatus::Idle);
        Ok(())
    }

    fn stream_init_any_format(&self) -> Result<(), UnitError> {
        self.record_stream_call("init")?;

        let next = self
            .preferred_format
            .borrow()
            .clone()
            .or_else(|| self.current_format.borrow().clone())
            .or_else(|| self.formats.borrow().first().cloned());

        let format_changed = *self.current_format.borrow() != next;
        if format_changed {
            *self.current_format.borrow_mut() = next;
        }

        self.change_status(UnitStatus::Ready);
        if format_changed {
            self.signals.emit(&UnitEvent::OutputFormatsChanged);
        }
        Ok(())
    }

    fn stream_on(&self) -> Result<(), UnitError> {
        self.record_stream_call("stream_on")?;

        if self.status.get() == UnitStatus::Idle {
            return Err(UnitError::Unsupported(
                "stream must be initialized before streaming".to_string(),
            ));
        }
        self.change_status(UnitStatus::Streaming);
        Ok(())
    }

    fn signals(&self) -> &UnitSignals {
        &self.signals
    }
}
