//! The processing-unit model the control panel binds to.
//!
//! A unit owns a list of typed controls and a set of output formats, and
//! notifies interested parties through [`UnitSignals`] when any of them
//! change. Writes through [`Unit::try_set_control`] may silently not take
//! effect; callers re-read the value to learn what the unit accepted.

use std::fmt::{Display, Formatter};

mod control;
pub use self::control::{Control, ControlId, ControlKind, ControlValue, EnumEntry, UiHints};

mod error;
pub use self::error::UnitError;

mod signals;
pub use self::signals::{HandlerId, UnitEvent, UnitSignal, UnitSignals};

mod simulated;
pub use self::simulated::SimulatedUnit;

mod v4l2;
pub use self::v4l2::V4l2Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Idle,
    Ready,
    Streaming,
}

impl Display for UnitStatus {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        let label = match self {
            UnitStatus::Idle => "IDLE",
            UnitStatus::Ready => "READY",
            UnitStatus::Streaming => "STREAMING",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    pub name: String,
    /// Pixel format code, e.g. a V4L2 FourCC such as `YUYV`.
    pub pixel_format: String,
}

impl OutputFormat {
    pub fn new(name: impl Into<String>, pixel_format: impl Into<String>) -> Self {
        OutputFormat {
            name: name.into(),
            pixel_format: pixel_format.into(),
        }
    }
}

pub trait Unit {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// Snapshot of the unit's controls in presentation order.
    fn controls(&self) -> Vec<Control>;
    fn control(&self, id: ControlId) -> Option<Control>;
    fn control_value(&self, id: ControlId) -> Option<ControlValue>;

    /// Attempts to change a control. `Ok` does not guarantee the value was
    /// taken verbatim; units may clamp or ignore it.
    fn try_set_control(&self, id: ControlId, value: ControlValue) -> Result<(), UnitError>;

    fn status(&self) -> UnitStatus;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn output_format(&self) -> Option<OutputFormat>;
    fn stream_set_preferred_format(&self, format: &OutputFormat) -> Result<(), UnitError>;
    fn stream_shutdown(&self) -> Result<(), UnitError>;
    fn stream_init_any_format(&self) -> Result<(), UnitError>;
    fn stream_on(&self) -> Result<(), UnitError>;

    fn signals(&self) -> &UnitSignals;
}
