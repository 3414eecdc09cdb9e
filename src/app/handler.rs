use crate::app::action::Action;
use crate::app::event::ChatEvent;
use crate::irc::commands;
use crate::irc::message::ParsedMessage;
use chrono::{DateTime, Utc};

/// Decide what to do with one parsed line. `now` stamps chat events.
///
/// PINGs always produce a PONG reply. Chat messages whose text is blank
/// after trimming are parsed successfully but never submitted.
pub fn handle_message(message: ParsedMessage, now: DateTime<Utc>) -> Option<Action> {
    match message {
        ParsedMessage::Ping { payload } => Some(Action::Reply(commands::pong(&payload))),
        ParsedMessage::ChatMessage {
            channel,
            username,
            text,
            ..
        } => {
            if text.trim().is_empty() {
                return None;
            }
            Some(Action::Submit(ChatEvent::new(channel, username, text, now)))
        }
        ParsedMessage::Other { raw } => {
            tracing::trace!(line = %raw, "ignoring line");
            None
        }
    }
}
