//! Subsystem modules for the law-energy bot.

pub mod comms;
pub mod runtime;
