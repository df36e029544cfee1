use crate::error::CommandError;

/// Lines starting with this character are commands.
pub const COMMAND_PREFIX: char = '/';

pub const HELP_TEXT: &str = "Available commands:\n\
/msg <username1> <username2> ... <message> - Send a private message to one or multiple users.\n\
/msgexcept <username1> <username2> ... <message> - Send a message to every user except the specified ones.\n\
/userlist - Show the list of online users.\n\
/bannedwords - Show the list of banned words.\n\
/help - Show this help message.";

/// A parsed command line. The set is closed, so dispatch is a plain match.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    UserList,
    BannedWords,
    /// Raw argument string; recipients are resolved against the registry at
    /// execution time.
    Msg(&'a str),
    MsgExcept(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a `/`-prefixed line. The verb is case-insensitive; everything
    /// after the first space is kept verbatim as the argument.
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let (verb, args) = line.split_once(' ').unwrap_or((line, ""));

        match verb.to_lowercase().as_str() {
            "/help" => Ok(Command::Help),
            "/userlist" => Ok(Command::UserList),
            "/bannedwords" => Ok(Command::BannedWords),
            "/msg" => Ok(Command::Msg(args)),
            "/msgexcept" => Ok(Command::MsgExcept(args)),
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }
}

/// Recipients and message body split out of a `/msg`-style argument.
#[derive(Debug, PartialEq, Eq)]
pub struct Addressed<'a> {
    pub recipients: Vec<&'a str>,
    pub body: String,
}

/// Split `<name1> <name2> ... <text>` into names and text.
///
/// There is no delimiter, so tokens are taken as names for as long as they
/// name someone online; the first token that does not starts the body. A body
/// whose first word is an online name is therefore read as one more
/// recipient. The protocol has no way around that.
pub fn split_recipients<'a, F>(
    usage: &'static str,
    args: &'a str,
    is_online: F,
) -> Result<Addressed<'a>, CommandError>
where
    F: Fn(&str) -> bool,
{
    let mut tokens: Vec<&str> = args.split(' ').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    if tokens.len() < 2 {
        return Err(CommandError::Usage(usage));
    }

    match tokens.iter().position(|t| !is_online(t)) {
        Some(start) if start > 0 => Ok(Addressed {
            recipients: tokens[..start].to_vec(),
            body: tokens[start..].join(" "),
        }),
        _ => Err(CommandError::NoMessage),
    }
}
