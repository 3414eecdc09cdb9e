//! Dispatch layer: turns parsed lines into actions for the session.

pub mod action;
pub mod event;
pub mod handler;
