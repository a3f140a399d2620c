//! GTK panel binding the controls of a processing unit, such as a camera, to
//! widgets.
//!
//! Every control becomes a table row whose widget follows the control's type
//! and hints. Widget changes are written to the unit and rolled back if the
//! unit does not take them; changes announced by the unit are shown without
//! writing anything back.

mod components;
pub mod controls;
mod enum_entry_item;
pub mod unit;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use unit::{SimulatedUnit, Unit, UnitError, V4l2Unit};
pub use widgets::{ControlsPanel, PanelError, UnitControlWidget};
