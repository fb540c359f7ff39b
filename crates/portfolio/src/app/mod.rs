mod audio;
pub(crate) mod bootstrap;
mod console;
pub(crate) mod loop_runner;
mod notifier;
mod router;
mod session;
