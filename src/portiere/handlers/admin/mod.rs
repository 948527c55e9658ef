pub mod session;
pub mod setup;
pub mod types;
pub mod whoami;

pub use self::session::{logout, sync_session};
pub use self::setup::setup;
pub use self::whoami::whoami;
