use log::{debug, warn};

use crate::unit::{OutputFormat, Unit, UnitError, UnitStatus};

/// Contents of the output-format dropdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatSelection {
    formats: Vec<OutputFormat>,
    selected: Option<u32>,
}

impl FormatSelection {
    pub fn from_unit(unit: &dyn Unit) -> Self {
        let formats = unit.output_formats();
        let selected = unit
            .output_format()
            .and_then(|current| formats.iter().position(|f| *f == current))
            .map(|i| i as u32);

        FormatSelection { formats, selected }
    }

    pub fn names(&self) -> Vec<String> {
        self.formats.iter().map(|f| f.name.clone()).collect()
    }

    pub fn selected_index(&self) -> Option<u32> {
        self.selected
    }

    pub fn selected(&self) -> Option<&OutputFormat> {
        self.selected.and_then(|i| self.formats.get(i as usize))
    }

    pub fn get(&self, index: u32) -> Option<&OutputFormat> {
        self.formats.get(index as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Switches `unit` to `format`, restarting its stream as needed.
///
/// Returns `Ok(false)` if `format` already is the current one. Every step is
/// tried even if an earlier one failed; each failure is logged and the first
/// one is returned. Nothing is undone.
pub fn apply_format_choice(unit: &dyn Unit, format: &OutputFormat) -> Result<bool, UnitError> {
    if unit.output_format().as_ref() == Some(format) {
        return Ok(false);
    }

    let status = unit.status();
    debug!("{}: switching to {} while {}", unit.id(), format.name, status);

    let mut first_error = None;
    let mut step = |name: &str, result: Result<(), UnitError>| {
        if let Err(e) = result {
            warn!("{}: {} failed: {}", unit.id(), name, e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    };

    step("set preferred format", unit.stream_set_preferred_format(format));

    if status != UnitStatus::Idle {
        step("shutdown", unit.stream_shutdown());
        step("init", unit.stream_init_any_format());

        if status == UnitStatus::Streaming {
            step("stream on", unit.stream_on());
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(true),
    }
}
