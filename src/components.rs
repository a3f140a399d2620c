use gtk::prelude::*;
use gtk::{Align, Box, Label, Orientation};

/// Creates a preconfigured, horizontal box
pub fn create_hbox() -> Box {
    Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .build()
}

/// Creates a pre-configured GtkLabel
pub fn create_label(label: &str) -> Label {
    Label::builder()
        .ellipsize(gtk::pango::EllipsizeMode::End)
        .halign(Align::Start)
        .label(label)
        .tooltip_text(label)
        .xalign(0.0)
        .build()
}

/// Creates a right-aligned label in a monospace font, for numbers that
/// should line up across rows.
pub fn create_value_label() -> Label {
    let label = Label::builder()
        .halign(Align::End)
        .xalign(1.0)
        .build();
    label.add_css_class("monospace");
    label
}
