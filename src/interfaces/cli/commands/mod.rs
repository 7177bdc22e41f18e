//! CLI command implementations

mod block_ip;
mod config_gen;
mod link;
mod partner;

pub use block_ip::block_ip;
pub use config_gen::config_generate;
pub use link::{CreateLinkArgs, create_link};
pub use partner::add_partner;
