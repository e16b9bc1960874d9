//! One module per subcommand.

pub mod add;
pub mod completions;
pub mod init;
pub mod key;
pub mod list;
pub mod mask;
pub mod remove;
pub mod reveal;
pub mod rotate;
