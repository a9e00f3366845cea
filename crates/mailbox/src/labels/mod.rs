//! Label registry
//!
//! Create, update, delete and list label definitions. Labels are addressed
//! by name; the store-assigned ID is looked up on each call.

mod registry;

pub use registry::{
    LabelUpdate, NewLabel, create_label, delete_label, find_label, list_labels, update_label,
};
