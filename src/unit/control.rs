use std::fmt::{Display, Formatter};

use bitflags::bitflags;

pub type ControlId = u32;

bitflags! {
    /// Presentation hints a unit attaches to a control.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UiHints: u32 {
        /// Boolean that represents a momentary action, not a state.
        const ONE_SHOT = 1 << 0;
        const TOGGLE_BUTTON = 1 << 1;
        const SPIN_BUTTON = 1 << 2;
        /// String holding a filesystem path picked by the user.
        const FILENAME = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub label: String,
    pub enabled: bool,
}

impl EnumEntry {
    pub fn new(label: impl Into<String>) -> Self {
        EnumEntry {
            label: label.into(),
            enabled: true,
        }
    }

    pub fn disabled(label: impl Into<String>) -> Self {
        EnumEntry {
            label: label.into(),
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Integer {
        min: i64,
        max: i64,
        step: i64,
    },
    Float {
        min: f64,
        max: f64,
        step: f64,
        display_width: usize,
        display_precision: usize,
    },
    Boolean,
    Enumeration {
        entries: Vec<EnumEntry>,
    },
    String,
    /// A control type the unit exposes but the panel has no widget for.
    Unsupported {
        type_name: String,
    },
}

impl ControlKind {
    pub fn type_name(&self) -> &str {
        match self {
            ControlKind::Integer { .. } => "integer",
            ControlKind::Float { .. } => "float",
            ControlKind::Boolean => "boolean",
            ControlKind::Enumeration { .. } => "enumeration",
            ControlKind::String => "string",
            ControlKind::Unsupported { type_name } => type_name,
        }
    }
}

/// Description of a control as currently reported by its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: ControlId,
    pub name: String,
    pub kind: ControlKind,
    pub hints: UiHints,
    pub enabled: bool,
}

impl Control {
    pub fn new(id: ControlId, name: impl Into<String>, kind: ControlKind) -> Self {
        Control {
            id,
            name: name.into(),
            kind,
            hints: UiHints::empty(),
            enabled: true,
        }
    }

    pub fn with_hints(mut self, hints: UiHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Index into the control's entry list.
    Enumeration(u32),
    String(String),
}

impl ControlValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ControlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ControlValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ControlValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<u32> {
        match self {
            ControlValue::Enumeration(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ControlValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ControlValue::Integer(_) => "integer",
            ControlValue::Float(_) => "float",
            ControlValue::Boolean(_) => "boolean",
            ControlValue::Enumeration(_) => "enumeration",
            ControlValue::String(_) => "string",
        }
    }
}

impl Display for ControlValue {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            ControlValue::Integer(v) => write!(f, "{}", v),
            ControlValue::Float(v) => write!(f, "{}", v),
            ControlValue::Boolean(v) => write!(f, "{}", v),
            ControlValue::Enumeration(v) => write!(f, "#{}", v),
            ControlValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}
