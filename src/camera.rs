use std::rc::Rc;

use log::{debug, warn};
use unit_control_widget::unit::{
    Control, ControlKind, ControlValue, EnumEntry, OutputFormat, SimulatedUnit, UiHints, Unit,
    UnitStatus, V4l2Unit,
};

use crate::files::video_devices;

/// Opens every V4L2 capture node in `dir` that offers controls or formats.
pub fn open_cameras(dir: &str) -> Vec<Rc<V4l2Unit>> {
    video_devices(dir)
        .iter()
        .filter_map(|path| match V4l2Unit::open(path) {
            Ok(unit) if unit.controls().is_empty() && unit.output_formats().is_empty() => {
                debug!("Skipping {}, it has neither controls nor formats", path);
                None
            }
            Ok(unit) => Some(Rc::new(unit)),
            Err(e) => {
                warn!("Could not open {}: {}", path, e);
                None
            }
        })
        .collect()
}

/// A simulated camera carrying one control of every kind.
pub fn demo_camera() -> SimulatedUnit {
    SimulatedUnit::new("demo", "Demo Camera")
        .with_control(
            Control::new(1, "Brightness", ControlKind::Integer { min: -64, max: 64, step: 1 }),
            ControlValue::Integer(0),
        )
        .with_control(
            Control::new(2, "Contrast", ControlKind::Integer { min: 0, max: 100, step: 5 })
                .with_hints(UiHints::SPIN_BUTTON),
            ControlValue::Integer(50),
        )
        .with_control(
            Control::new(
                3,
                "Gamma",
                ControlKind::Float {
                    min: 0.1,
                    max: 5.0,
                    step: 0.1,
                    display_width: 4,
                    display_precision: 1,
                },
            ),
            ControlValue::Float(1.0),
        )
        .with_control(
            Control::new(4, "White Balance, Automatic", ControlKind::Boolean),
            ControlValue::Boolean(true),
        )
        .with_control(
            Control::new(5, "Backlight Compensation", ControlKind::Boolean)
                .with_hints(UiHints::TOGGLE_BUTTON),
            ControlValue::Boolean(false),
        )
        .with_control(
            Control::new(6, "Focus, Automatic Once", ControlKind::Boolean)
                .with_hints(UiHints::ONE_SHOT),
            ControlValue::Boolean(false),
        )
        .with_control(
            Control::new(
                7,
                "Power Line Frequency",
                ControlKind::Enumeration {
                    entries: vec![
                        EnumEntry::new("Disabled"),
                        EnumEntry::new("50 Hz"),
                        EnumEntry::new("60 Hz"),
                        EnumEntry::disabled("Auto"),
                    ],
                },
            ),
            ControlValue::Enumeration(1),
        )
        .with_control(
            Control::new(8, "Caption", ControlKind::String),
            ControlValue::String("Demo".to_string()),
        )
        .with_control(
            Control::new(9, "Log File", ControlKind::String).with_hints(UiHints::FILENAME),
            ControlValue::String(String::new()),
        )
        .with_output_formats(vec![
            OutputFormat::new("YUYV 4:2:2", "YUYV"),
            OutputFormat::new("Motion-JPEG", "MJPG"),
        ])
        .with_status(UnitStatus::Ready)
}
