//! CLI subcommand implementations

mod delete;
mod list;
mod publish;
mod status;
mod sync;

pub use delete::run_delete;
pub use list::{run_list, ListTarget};
pub use publish::run_publish;
pub use status::run_status;
pub use sync::run_sync;
