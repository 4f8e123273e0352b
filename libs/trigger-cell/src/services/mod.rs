pub mod directory;
pub mod ledger;
pub mod dispatcher;

pub use directory::*;
pub use ledger::*;
pub use dispatcher::*;
