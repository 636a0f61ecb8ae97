pub mod dropdown;
pub mod modal;
pub mod table;
pub mod toast;

pub use dropdown::Dropdown;
pub use table::DataTable;
pub use toast::{wait_for_toast, wait_for_toast_within};
