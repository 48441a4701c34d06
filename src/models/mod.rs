mod audit_log;
mod blacklist;
mod event;
mod post;
mod report;
mod status;
mod user;
mod volunteer;

pub use audit_log::*;
pub use blacklist::*;
pub use event::*;
pub use post::*;
pub use report::*;
pub use status::*;
pub use user::*;
pub use volunteer::*;
