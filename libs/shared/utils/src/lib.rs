pub mod text;
pub mod test_utils;

pub use text::{format_appointment_date, message_snippet};
