use gtk::glib::Object;

use crate::unit::EnumEntry;

mod imp;

gtk::glib::wrapper! {
    /// One entry of an enumeration control, as shown in a dropdown.
    pub struct EnumEntryItem(ObjectSubclass<imp::EnumEntryItem>);
}

impl EnumEntryItem {
    pub fn new(index: u32, entry: &EnumEntry) -> Self {
        Object::builder()
            .property("index", index)
            .property("label", entry.label.as_str())
            .property("enabled", entry.enabled)
            .build()
    }
}

#[derive(Default, Clone)]
pub struct EntryData {
    pub index: u32,
    pub label: String,
    pub enabled: bool,
}
