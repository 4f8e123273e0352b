pub mod store;
pub mod supabase;
pub mod writer;
pub mod events;
pub mod listener;
pub mod bulk;

pub use store::*;
pub use supabase::*;
pub use writer::*;
pub use events::*;
pub use listener::*;
pub use bulk::*;
