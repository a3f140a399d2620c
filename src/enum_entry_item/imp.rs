use std::cell::RefCell;

use gtk::subclass::prelude::*;
use glib::Properties;
use gtk::prelude::*;

use super::EntryData;

#[derive(Properties, Default)]
#[properties(wrapper_type = super::EnumEntryItem)]
pub struct EnumEntryItem {
    #[property(name = "index", get, set, type = u32, member = index)]
    #[property(name = "label", get, set, type = String, member = label)]
    #[property(name = "enabled", get, set, type = bool, member = enabled)]
    pub data: RefCell<EntryData>,
}

#[glib::object_subclass]
impl ObjectSubclass for EnumEntryItem {
    const NAME: &'static str = "EnumEntryItem";
    type Type = super::EnumEntryItem;
}

#[glib::derived_properties]
impl ObjectImpl for EnumEntryItem {}
