//! Built-in producer catalog.
//!
//! Each submodule owns one area of the output tree and exposes a
//! `register` function; [`install`] collects them into one registry
//! during startup. There is no central list of producers to edit:
//! adding a file and a `register` call here is the whole job.

pub mod commands;
pub mod kernel;
pub mod pid;
pub mod proc;
pub mod sched;
pub mod sys;

use crate::produce::{Registry, RegistryError};

/// Register every built-in producer. Any error here is a configuration
/// bug caught before snapshot work begins.
pub fn install(registry: &mut Registry) -> Result<(), RegistryError> {
    proc::register(registry)?;
    pid::register(registry)?;
    sys::register(registry)?;
    commands::register(registry)?;
    kernel::register(registry)?;
    sched::register(registry)?;
    Ok(())
}
