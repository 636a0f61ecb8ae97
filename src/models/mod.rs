pub mod form;
pub mod table;
pub mod toast;

pub use form::{LoginForm, ResetPasswordForm, SubscriptionForm};
pub use table::{SortDirection, TableRow};
pub use toast::{Toast, ToastKind};
