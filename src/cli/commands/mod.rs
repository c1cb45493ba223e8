//! CLI command implementations

pub mod activate;
pub mod config;
pub mod fetch;
pub mod install;
pub mod message;
pub mod notify;
pub mod route;
pub mod status;

pub use activate::execute as activate;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use message::execute as message;
pub use notify::click;
pub use notify::push;
pub use route::execute as route;
pub use status::execute as status;
