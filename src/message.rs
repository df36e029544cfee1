use std::fmt;

/// A line the server sends to clients.
///
/// Messages are transient: they are rendered with `Display` straight onto the
/// recipient's outbound queue and never stored. The rendered text is the wire
/// format clients depend on, so it must not drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Joined(String),
    Left(String),
    Welcome(String),
    HelpHint,
    /// A plain chat line from `from` to everyone else.
    Chat { from: String, body: String },
    PrivateFrom { from: String, body: String },
    PrivateSent { body: String },
    NotOnline(Vec<String>),
    BroadcastExcept { from: String, body: String },
    /// Sender's confirmation for `/msgexcept`; `excluded` includes the sender.
    BroadcastExceptSent { excluded: Vec<String>, body: String },
    ForbiddenMessage,
}

impl Message {
    /// The two lines a newly registered client sees first.
    pub fn greeting(name: &str) -> [Message; 2] {
        [Message::Welcome(name.to_string()), Message::HelpHint]
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Joined(_) | Message::Left(_) | Message::Welcome(_) | Message::HelpHint => {
                MessageKind::System
            }
            Message::Chat { .. } => MessageKind::Broadcast,
            Message::PrivateFrom { .. } | Message::PrivateSent { .. } | Message::NotOnline(_) => {
                MessageKind::Private
            }
            Message::BroadcastExcept { .. } | Message::BroadcastExceptSent { .. } => {
                MessageKind::BroadcastExcept
            }
            Message::ForbiddenMessage => MessageKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    System,
    Broadcast,
    Private,
    BroadcastExcept,
    Error,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Joined(name) => write!(f, "{name} has joined the chat"),
            Message::Left(name) => write!(f, "{name} has left the chat"),
            Message::Welcome(name) => write!(f, "Welcome to my server {name}"),
            Message::HelpHint => f.write_str("write /help to see the list of commands"),
            Message::Chat { from, body } => write!(f, "{from}: {body}"),
            Message::PrivateFrom { from, body } => write!(f, "[Private from {from}]: {body}"),
            Message::PrivateSent { body } => {
                write!(f, "[Private to one or multiple users]: {body}")
            }
            Message::NotOnline(names) => {
                write!(f, "The following users are not online: {}", names.join(" "))
            }
            Message::BroadcastExcept { from, body } => {
                write!(
                    f,
                    "[Broadcast from {from} to everyone except specified]: {body}"
                )
            }
            Message::BroadcastExceptSent { excluded, body } => {
                write!(
                    f,
                    "[Broadcast to everyone except {}]: {body}",
                    excluded.join(", ")
                )
            }
            Message::ForbiddenMessage => f.write_str(
                "ERROR: your message was not sent because it contains forbidden words",
            ),
        }
    }
}

/// Lets a `Message` go anywhere a rendered line is expected.
impl From<Message> for String {
    fn from(msg: Message) -> Self {
        msg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_literal_lines() {
        let from = "alice".to_string();
        let body = "hi there".to_string();
        let cases = [
            (Message::Joined(from.clone()), "alice has joined the chat"),
            (Message::Left(from.clone()), "alice has left the chat"),
            (Message::Welcome(from.clone()), "Welcome to my server alice"),
            (Message::HelpHint, "write /help to see the list of commands"),
            (
                Message::Chat { from: from.clone(), body: body.clone() },
                "alice: hi there",
            ),
            (
                Message::PrivateFrom { from: from.clone(), body: body.clone() },
                "[Private from alice]: hi there",
            ),
            (
                Message::PrivateSent { body: body.clone() },
                "[Private to one or multiple users]: hi there",
            ),
            (
                Message::NotOnline(vec!["bob".into(), "carol".into()]),
                "The following users are not online: bob carol",
            ),
            (
                Message::BroadcastExcept { from: from.clone(), body: body.clone() },
                "[Broadcast from alice to everyone except specified]: hi there",
            ),
            (
                Message::BroadcastExceptSent {
                    excluded: vec!["alice".into(), "bob".into()],
                    body,
                },
                "[Broadcast to everyone except alice, bob]: hi there",
            ),
            (
                Message::ForbiddenMessage,
                "ERROR: your message was not sent because it contains forbidden words",
            ),
        ];

        for (msg, expected) in cases {
            assert_eq!(String::from(msg), expected);
        }
    }

    #[test]
    fn greeting_welcomes_then_hints() {
        let lines: Vec<String> = Message::greeting("bob").into_iter().map(String::from).collect();
        assert_eq!(
            lines,
            vec!["Welcome to my server bob", "write /help to see the list of commands"]
        );
    }

    #[test]
    fn classifies_messages() {
        assert_eq!(Message::HelpHint.kind(), MessageKind::System);
        assert_eq!(Message::ForbiddenMessage.kind(), MessageKind::Error);
        assert_eq!(
            Message::PrivateSent { body: String::new() }.kind(),
            MessageKind::Private
        );
    }
}
