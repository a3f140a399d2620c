use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use log::{debug, warn};
use v4l::control::{Description, Flags, Type, Value};
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::{
    Control, ControlId, ControlKind, ControlValue, EnumEntry, OutputFormat, UiHints, Unit,
    UnitError, UnitEvent, UnitSignals, UnitStatus,
};

struct DeviceControl {
    control: Control,
    /// V4L2 menu item ids, in entry order.
    menu_ids: Vec<u32>,
    button: bool,
}

/// A unit backed by a V4L2 capture device.
pub struct V4l2Unit {
    path: String,
    name: String,
    device: Device,
    controls: RefCell<Vec<DeviceControl>>,
    values: RefCell<HashMap<ControlId, ControlValue>>,
    status: Cell<UnitStatus>,
    preferred_format: RefCell<Option<OutputFormat>>,
    signals: UnitSignals,
}

impl V4l2Unit {
    pub fn open(path: &str) -> Result<Self, UnitError> {
        let device = Device::with_path(path)?;

        let name = match device.query_caps() {
            Ok(caps) => caps.card,
            Err(e) => {
                warn!("Error querying capabilities of {}: {}", path, e);
                path.to_string()
            }
        };

        let unit = V4l2Unit {
            path: path.to_string(),
            name,
            device,
            controls: RefCell::new(vec![]),
            values: RefCell::new(HashMap::new()),
            status: Cell::new(UnitStatus::Ready),
            preferred_format: RefCell::new(None),
            signals: UnitSignals::new(),
        };

        let controls = unit.query_controls()?;
        let values = controls
            .iter()
            .filter_map(|c| unit.read_value(c).map(|v| (c.control.id, v)))
            .collect();

        *unit.controls.borrow_mut() = controls;
        *unit.values.borrow_mut() = values;

        debug!("Opened {} ({})", unit.path, unit.name);
        Ok(unit)
    }

    /// Re-reads every control from the device and announces what changed
    /// since the last read.
    pub fn refresh(&self) -> Result<(), UnitError> {
        let fresh = self.query_controls()?;

        let parameter_changes: Vec<ControlId> = {
            let known = self.controls.borrow();
            fresh
                .iter()
                .filter(|f| {
                    known
                        .iter()
                        .find(|k| k.control.id == f.control.id)
                        .is_some_and(|k| k.control != f.control)
                })
                .map(|f| f.control.id)
                .collect()
        };

        let mut value_changes = vec![];
        {
            let mut values = self.values.borrow_mut();
            for ctrl in &fresh {
                let Some(value) = self.read_value(ctrl) else {
                    continue;
                };
                if values.get(&ctrl.control.id) != Some(&value) {
                    values.insert(ctrl.control.id, value.clone());
                    value_changes.push((ctrl.control.id, value));
                }
            }
        }

        *self.controls.borrow_mut() = fresh;

        for id in parameter_changes {
            self.signals.emit(&UnitEvent::ControlParametersChanged { id });
        }
        for (id, value) in value_changes {
            self.signals.emit(&UnitEvent::ControlValueChanged { id, value });
        }
        Ok(())
    }

    fn query_controls(&self) -> Result<Vec<DeviceControl>, UnitError> {
        let descriptions = self.device.query_controls()?;
        Ok(descriptions.iter().filter_map(map_description).collect())
    }

    fn read_value(&self, ctrl: &DeviceControl) -> Option<ControlValue> {
        // Buttons are write-only
        if ctrl.button {
            return Some(ControlValue::Boolean(false));
        }
        if let ControlKind::Unsupported { .. } = ctrl.control.kind {
            return None;
        }

        let value = match self.device.control(ctrl.control.id) {
            Ok(c) => c.value,
            Err(e) => {
                warn!("Error reading control {}: {}", ctrl.control.name, e);
                return None;
            }
        };

        match (&ctrl.control.kind, value) {
            (ControlKind::Integer { .. }, Value::Integer(v)) => Some(ControlValue::Integer(v)),
            (ControlKind::Boolean, Value::Boolean(v)) => Some(ControlValue::Boolean(v)),
            (ControlKind::Boolean, Value::Integer(v)) => Some(ControlValue::Boolean(v != 0)),
            (ControlKind::Enumeration { .. }, Value::Integer(v)) => {
                menu_index(&ctrl.menu_ids, v).map(ControlValue::Enumeration)
            }
            (ControlKind::String, Value::String(v)) => Some(ControlValue::String(v)),
            _ => {
                warn!("Unexpected value type for control {}", ctrl.control.name);
                None
            }
        }
    }

    fn change_status(&self, status: UnitStatus) {
        let old = self.status.replace(status);
        if old != status {
            self.signals.emit(&UnitEvent::StatusChanged { old });
        }
    }
}

fn map_description(desc: &Description) -> Option<DeviceControl> {
    if desc.flags.contains(Flags::DISABLED) {
        debug!("Ignoring disabled control {}", desc.name);
        return None;
    }

    let mut hints = UiHints::empty();
    let mut menu_ids = vec![];
    let mut button = false;

    let kind = match desc.typ {
        // Class headers carry no value
        Type::CtrlClass => return None,

        Type::Integer | Type::Integer64 | Type::U8 | Type::U16 | Type::U32 => {
            ControlKind::Integer {
                min: desc.minimum as i64,
                max: desc.maximum as i64,
                step: desc.step as i64,
            }
        }

        Type::Boolean => ControlKind::Boolean,

        Type::Button => {
            hints |= UiHints::ONE_SHOT;
            button = true;
            ControlKind::Boolean
        }

        Type::Menu | Type::IntegerMenu => {
            let items = desc.items.as_deref().unwrap_or_default();
            menu_ids = items.iter().map(|item| item.0).collect();
            ControlKind::Enumeration {
                entries: items
                    .iter()
                    .map(|item| EnumEntry::new(item.1.to_string()))
                    .collect(),
            }
        }

        Type::String => ControlKind::String,

        other => ControlKind::Unsupported {
            type_name: format!("{:?}", other),
        },
    };

    let readonly = desc.flags.contains(Flags::READ_ONLY);
    let inactive = desc.flags.contains(Flags::INACTIVE);

    let control = Control::new(desc.id, desc.name.clone(), kind)
        .with_hints(hints)
        .with_enabled(!readonly && !inactive);

    Some(DeviceControl {
        control,
        menu_ids,
        button,
    })
}

fn to_device_value(ctrl: &DeviceControl, value: ControlValue) -> Result<Value, UnitError> {
    let id = ctrl.control.id;

    match (&ctrl.control.kind, value) {
        // The value of a button is ignored by the driver
        (ControlKind::Boolean, ControlValue::Boolean(_)) if ctrl.button => Ok(Value::Integer(0)),
        (ControlKind::Integer { .. }, ControlValue::Integer(v)) => Ok(Value::Integer(v)),
        (ControlKind::Boolean, ControlValue::Boolean(v)) => Ok(Value::Boolean(v)),
        (ControlKind::Enumeration { .. }, ControlValue::Enumeration(index)) => {
            match ctrl.menu_ids.get(index as usize) {
                Some(menu_id) => Ok(Value::Integer(*menu_id as i64)),
                None => Err(UnitError::Rejected {
                    id,
                    reason: format!("menu entry {} out of range", index),
                }),
            }
        }
        (ControlKind::String, ControlValue::String(v)) => Ok(Value::String(v)),
        (kind, value) => Err(UnitError::TypeMismatch {
            id,
            expected: kind.type_name().to_string(),
            actual: value.type_name(),
        }),
    }
}

fn menu_index(menu_ids: &[u32], value: i64) -> Option<u32> {
    menu_ids
        .iter()
        .position(|id| *id as i64 == value)
        .map(|pos| pos as u32)
}

fn fourcc_of(code: &str) -> Option<FourCC> {
    let repr: [u8; 4] = code.as_bytes().try_into().ok()?;
    Some(FourCC::new(&repr))
}

impl Unit for V4l2Unit {
    fn id(&self) -> &str {
        &self.path
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
        let controls = self.controls.borrow();
        let ctrl = controls.iter().find(|c| c.control.id == id)?;
        let value = self.read_value(ctrl)?;

        self.values.borrow_mut().insert(id, value.clone());
        Some(value)
    }

    fn try_set_control(&self, id: ControlId, value: ControlValue) -> Result<(), UnitError> {
        let device_value = {
            let controls = self.controls.borrow();
            let ctrl = controls
                .iter()
                .find(|c| c.control.id == id)
                .ok_or(UnitError::UnknownControl(id))?;

            if !ctrl.control.enabled {
                return Err(UnitError::Rejected {
                    id,
                    reason: "control is read-only or inactive".to_string(),
                });
            }
            to_device_value(ctrl, value)?
        };

        let result = self.device.set_control(v4l::control::Control {
            id,
            value: device_value,
        });

        // A write may flip flags or values of dependent controls
        if let Err(e) = self.refresh() {
            warn!("Error re-reading controls of {}: {}", self.path, e);
        }

        result.map_err(UnitError::from)
    }

    fn status(&self) -> UnitStatus {
        self.status.get()
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        match self.device.enum_formats() {
            Ok(descriptions) => descriptions
                .into_iter()
                .map(|d| OutputFormat::new(d.description, d.fourcc.to_string()))
                .collect(),
            Err(e) => {
                warn!("Error querying formats of {}: {}", self.path, e);
                vec![]
            }
        }
    }

    fn output_format(&self) -> Option<OutputFormat> {
        let current = match self.device.format() {
            Ok(f) => f.fourcc.to_string(),
            Err(e) => {
                warn!("Error querying format of {}: {}", self.path, e);
                return None;
            }
        };

        self.output_formats()
            .into_iter()
            .find(|f| f.pixel_format == current)
    }

    fn stream_set_preferred_format(&self, format: &OutputFormat) -> Result<(), UnitError> {
        if fourcc_of(&format.pixel_format).is_none() {
            return Err(UnitError::Unsupported(format!(
                "'{}' is not a FourCC",
                format.pixel_format
            )));
        }
        *self.preferred_format.borrow_mut() = Some(format.clone());
        Ok(())
    }

    fn stream_shutdown(&self) -> Result<(), UnitError> {
        self.change_status(UnitStatus::Idle);
        Ok(())
    }

    fn stream_init_any_format(&self) -> Result<(), UnitError> {
        let preferred = self.preferred_format.borrow().clone();

        if let Some(fourcc) = preferred.and_then(|f| fourcc_of(&f.pixel_format)) {
            let mut format = self.device.format()?;
            if format.fourcc != fourcc {
                format.fourcc = fourcc;
                let applied = self.device.set_format(&format)?;
                debug!("{} now delivers {}", self.path, applied.fourcc);
                self.signals.emit(&UnitEvent::OutputFormatsChanged);
            }
        }

        self.change_status(UnitStatus::Ready);
        Ok(())
    }

    fn stream_on(&self) -> Result<(), UnitError> {
        Err(UnitError::Unsupported(format!(
            "streaming from {} is not supported",
            self.path
        )))
    }

    fn signals(&self) -> &UnitSignals {
        &self.signals
    }
}
