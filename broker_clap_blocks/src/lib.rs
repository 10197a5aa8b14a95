//! Building blocks for [`clap`]-driven configuration of the broker components.
pub mod executor;
pub mod replica;
