pub mod du;
pub mod dump;
pub mod gc;
pub mod init;
pub mod list;
pub mod repair;
pub mod restore;

pub use du::du_command;
pub use dump::dump_command;
pub use gc::gc_command;
pub use init::init_command;
pub use list::list_command;
pub use repair::repair_command;
pub use restore::restore_command;
