mod args;
mod init;
mod pack;

pub use args::{Args, Command};
pub use init::{init_in, run_init};
pub use pack::{apply_overrides, run_pack};
