//! Inbound line classification.
//!
//! Only two shapes matter to the recorder: keepalive `PING`s and channel
//! `PRIVMSG`s. Everything else (MOTD, JOIN acks, CAP ACKs, ROOMSTATE, ...) is
//! [`ParsedMessage::Other`] and dropped by the dispatcher.
//!
//! The PRIVMSG grammar after the optional tag segment is
//!
//! ```text
//! :<nick>!<ident> PRIVMSG #<channel> :<text>
//! ```
//!
//! where `<nick>` runs to the first `!`, `<ident>` to the next space,
//! `<channel>` is `[A-Za-z0-9_]+` and `<text>` is the rest of the line.

use std::collections::HashMap;

/// IRCv3 tags from the leading `@key=value;...` segment. Values are kept raw;
/// escape sequences such as `\s` are not decoded.
pub type Tags = HashMap<String, String>;

const DEFAULT_PING_PAYLOAD: &str = ":tmi.twitch.tv";
const PRIVMSG_MARKER: &str = " PRIVMSG #";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Ping {
        payload: String,
    },
    ChatMessage {
        channel: String,
        username: String,
        text: String,
        tags: Tags,
    },
    Other {
        raw: String,
    },
}

/// Classify a framed line. Pure: the same input always yields the same output.
pub fn parse(line: &str) -> ParsedMessage {
    if line.starts_with("PING") {
        // The payload ends at a repeated "PING " marker, if any.
        let payload = line
            .strip_prefix("PING ")
            .and_then(|rest| rest.split("PING ").next())
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PING_PAYLOAD);
        return ParsedMessage::Ping {
            payload: payload.to_string(),
        };
    }

    if !line.contains(PRIVMSG_MARKER) {
        return other(line);
    }

    let (tags, rest) = match line.strip_prefix('@') {
        Some(tagged) => match tagged.split_once(' ') {
            Some((raw_tags, rest)) => (parse_tags(raw_tags), rest),
            None => return other(line),
        },
        None => (Tags::new(), line),
    };

    let Some(privmsg) = parse_privmsg(rest) else {
        return other(line);
    };

    let username = tags
        .get("display-name")
        .filter(|name| !name.is_empty())
        .map(String::as_str)
        .unwrap_or(privmsg.nick)
        .to_string();

    ParsedMessage::ChatMessage {
        channel: privmsg.channel.to_string(),
        username,
        text: privmsg.text.to_string(),
        tags,
    }
}

fn other(line: &str) -> ParsedMessage {
    ParsedMessage::Other {
        raw: line.to_string(),
    }
}

/// Split `key=value;key=value` into a map. An entry without `=` gets an empty
/// value. The first occurrence of a repeated key wins.
pub fn parse_tags(raw: &str) -> Tags {
    let mut tags = Tags::new();
    for entry in raw.split(';').filter(|e| !e.is_empty()) {
        let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
        tags.entry(key.to_string()).or_insert_with(|| value.to_string());
    }
    tags
}

struct PrivmsgParts<'a> {
    nick: &'a str,
    channel: &'a str,
    text: &'a str,
}

fn parse_privmsg(rest: &str) -> Option<PrivmsgParts<'_>> {
    let prefixed = rest.strip_prefix(':')?;

    let (nick, after_nick) = prefixed.split_once('!')?;
    if nick.is_empty() {
        return None;
    }

    let (ident, after_ident) = after_nick.split_once(' ')?;
    if ident.is_empty() {
        return None;
    }

    let after_command = after_ident.strip_prefix("PRIVMSG #")?;
    let channel_len = after_command
        .find(|c: char| !is_word_char(c))
        .unwrap_or(after_command.len());
    if channel_len == 0 {
        return None;
    }
    let (channel, after_channel) = after_command.split_at(channel_len);

    let text = after_channel.strip_prefix(" :")?;
    Some(PrivmsgParts {
        nick,
        channel,
        text,
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn chat(channel: &str, username: &str, text: &str, tags: Tags) -> ParsedMessage {
        ParsedMessage::ChatMessage {
            channel: channel.into(),
            username: username.into(),
            text: text.into(),
            tags,
        }
    }

    #[test]
    fn test_ping() {
        assert_eq!(
            parse("PING :tmi.twitch.tv"),
            ParsedMessage::Ping {
                payload: ":tmi.twitch.tv".into()
            }
        );
        assert_eq!(
            parse("PING :custom.payload"),
            ParsedMessage::Ping {
                payload: ":custom.payload".into()
            }
        );
    }

    #[test]
    fn test_ping_payload_stops_at_repeated_marker() {
        assert_eq!(
            parse("PING :a PING :b"),
            ParsedMessage::Ping {
                payload: ":a ".into()
            }
        );
        assert_eq!(
            parse("PING PING :b"),
            ParsedMessage::Ping {
                payload: ":tmi.twitch.tv".into()
            }
        );
    }

    #[test]
    fn test_ping_without_payload_uses_default() {
        for line in ["PING", "PING "] {
            assert_eq!(
                parse(line),
                ParsedMessage::Ping {
                    payload: ":tmi.twitch.tv".into()
                },
                "{line:?}"
            );
        }
    }

    #[test]
    fn test_tagged_privmsg_uses_display_name() {
        let msg = parse(
            "@display-name=Bob;color=#fff :bob!bob@bob.tmi.twitch.tv PRIVMSG #foo :hello world",
        );
        assert_eq!(
            msg,
            chat(
                "foo",
                "Bob",
                "hello world",
                tags(&[("display-name", "Bob"), ("color", "#fff")])
            )
        );
    }

    #[test]
    fn test_untagged_privmsg_uses_nick() {
        assert_eq!(
            parse(":nick!nick@host PRIVMSG #chan :hi"),
            chat("chan", "nick", "hi", Tags::new())
        );
    }

    #[test]
    fn test_empty_display_name_falls_back_to_nick() {
        let msg = parse("@display-name=;color= :nick!nick@host PRIVMSG #chan :hi");
        assert_eq!(
            msg,
            chat(
                "chan",
                "nick",
                "hi",
                tags(&[("display-name", ""), ("color", "")])
            )
        );
    }

    #[test]
    fn test_text_keeps_colons_spaces_and_unicode() {
        let msg = parse(":nick!nick@host PRIVMSG #chan :see :this: https://x.y :: ünï 🎉 ");
        assert_eq!(
            msg,
            chat("chan", "nick", "see :this: https://x.y :: ünï 🎉 ", Tags::new())
        );
    }

    #[test]
    fn test_blank_text_still_parses() {
        assert_eq!(
            parse(":nick!nick@host PRIVMSG #chan :   "),
            chat("chan", "nick", "   ", Tags::new())
        );
        assert_eq!(
            parse(":nick!nick@host PRIVMSG #chan :"),
            chat("chan", "nick", "", Tags::new())
        );
    }

    #[test]
    fn test_malformed_tags() {
        assert_eq!(
            parse_tags("flag;key=a=b;;empty="),
            tags(&[("flag", ""), ("key", "a=b"), ("empty", "")])
        );
    }

    #[test]
    fn test_repeated_tag_keeps_first() {
        assert_eq!(parse_tags("a=1;a=2"), tags(&[("a", "1")]));
    }

    #[test]
    fn test_tag_values_are_not_unescaped() {
        let t = parse_tags(r"system-msg=hello\sthere\:x");
        assert_eq!(t["system-msg"], r"hello\sthere\:x");
    }

    #[test]
    fn test_non_privmsg_lines_are_other() {
        for line in [
            ":tmi.twitch.tv 001 bot :Welcome, GLHF!",
            ":bot!bot@bot.tmi.twitch.tv JOIN #chan",
            ":tmi.twitch.tv CAP * ACK :twitch.tv/tags twitch.tv/commands",
            "@emote-only=0;room-id=1 :tmi.twitch.tv ROOMSTATE #chan",
            ":jtv MODE #chan +o nick",
            "",
        ] {
            assert_eq!(parse(line), ParsedMessage::Other { raw: line.into() }, "{line:?}");
        }
    }

    #[test]
    fn test_privmsg_shape_mismatch_is_other() {
        for line in [
            // no leading colon
            "nick!nick@host PRIVMSG #chan :hi",
            // no ident separator
            ":nick PRIVMSG #chan :hi",
            // empty nick
            ":!nick@host PRIVMSG #chan :hi",
            // channel with non-word character
            ":nick!nick@host PRIVMSG #chan-name :hi",
            // missing text separator
            ":nick!nick@host PRIVMSG #chan hi",
            // tag segment followed by a bare command, no prefix
            "@display-name=Bob PRIVMSG #chan :hi",
        ] {
            assert_eq!(parse(line), ParsedMessage::Other { raw: line.into() }, "{line:?}");
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let line = "@badges=;display-name=Ann :ann!ann@ann.tmi.twitch.tv PRIVMSG #foo :again";
        let first = parse(line);
        for _ in 0..3 {
            assert_eq!(parse(line), first);
        }
    }
}
