//! 流程层：跨多个页面状态的组合操作，以及纯函数的校验工具

pub mod auth;
pub mod filtering;
pub mod forgot_password;
pub mod pagination;
pub mod sorting;
pub mod subscription;

pub use auth::login_as;
pub use filtering::{verify_column_filter, verify_keyword_filter, FilterVerification};
pub use forgot_password::{
    open_forgot_password_from_login, request_otp, submit_reset, OtpRequestOutcome, ResetOutcome,
};
pub use pagination::{get_pagination_range, parse_pagination_range, PaginationRange};
pub use sorting::{
    normalize_numeric, sort_column_and_read, verify_ascending_sort, verify_column_sort,
    verify_descending_sort, SortVerification,
};
pub use subscription::{
    create_subscription, delete_subscription, edit_subscription, search_and_verify, DeleteOutcome,
    SubscriptionOutcome,
};
