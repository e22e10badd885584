//! # Command Line Interface
//!
//! Dispatch commands to `commands` module.

use env_logger;
#[cfg(windows)]
use colored;
use fmkit::commands;
use fmkit::commands::CommandError;
mod cli;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).unwrap();

    let main_cmd = cli::build_cli();
    let matches = main_cmd.get_matches();

    // Create a formatted disk image

    if let Some(cmd) = matches.subcommand_matches("makedisk") {
        return commands::mkdsk::makedisk(cmd);
    }

    // Display the directory of an image

    if let Some(cmd) = matches.subcommand_matches("dir") {
        return commands::dir::dir(cmd);
    }

    // Read a file out of an image

    if let Some(cmd) = matches.subcommand_matches("read") {
        return commands::get::read(cmd);
    }

    // Write a local file into an image

    if let Some(cmd) = matches.subcommand_matches("write") {
        return commands::put::write(cmd);
    }

    log::error!("No subcommand was found, try `fmkit --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
