//! tubesweep - YouTube comment remover
//!
//! Removes comments from videos you own, one by one or with a classifier
//! flagging online-gambling spam for review.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write the default configuration
//! tubesweep config init
//!
//! # Start the terminal front end
//! tubesweep
//!
//! # Or work headless
//! tubesweep list https://www.youtube.com/watch?v=VIDEO --credentials client_secret.json
//! tubesweep sweep https://www.youtube.com/watch?v=VIDEO --credentials client_secret.json
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
