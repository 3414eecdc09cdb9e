use crate::app::event::ChatEvent;
use crate::irc::commands::OutboundLine;

/// What the session should do in response to one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write a line back on the connection.
    Reply(OutboundLine),
    /// Hand an event to the sink worker.
    Submit(ChatEvent),
}
