//! IPC handlers for the server.

pub mod handlers;
mod register;

pub use register::register_handlers;

#[cfg(test)]
mod tests;
