use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::broadcast;
use crate::command::{self, COMMAND_PREFIX, Command, HELP_TEXT};
use crate::config::ServerConfig;
use crate::error::{CommandError, HandshakeError};
use crate::filter::{ContentFilter, FilterAction};
use crate::message::Message;
use crate::registry::ClientRegistry;
use crate::session::Session;
use crate::types::SessionId;

/// Shared relay state: who is online, the banned words, and the settings.
///
/// Everything here is either immutable or internally synchronised, so the
/// server is shared as a plain `Arc<Server>` with no outer lock.
pub struct Server {
    registry: ClientRegistry,
    filter: ContentFilter,
    pub config: ServerConfig,
    next_session_id: AtomicU64,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let filter = ContentFilter::new(config.banned_word_list());
        Self {
            registry: ClientRegistry::new(),
            filter,
            config,
            next_session_id: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Decide whether `raw_name` may join and, if so, register it.
    ///
    /// On success everyone else hears about the join and the caller gets the
    /// receiving end of the newcomer's queue to hand to a writer task. The
    /// queue starts empty; the greeting (`Message::greeting`) is the caller's
    /// to write before that task starts draining.
    pub fn join(
        &self,
        raw_name: &str,
    ) -> Result<(Arc<Session>, mpsc::Receiver<String>), HandshakeError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(HandshakeError::EmptyName);
        }
        if let FilterAction::Block(word) = self.filter.check(name) {
            debug!(name = %name, word = %word, "name matched a banned word");
            return Err(HandshakeError::ForbiddenName);
        }

        let id = SessionId::new(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        let (session, rx) = Session::new(id, name, self.config.outbound_queue);
        self.registry.register(Arc::clone(&session))?;

        info!(session = %id, name = %name, online = self.registry.len(), "user joined");
        broadcast::to_others(&self.registry, name, &Message::Joined(name.to_string()));

        Ok((session, rx))
    }

    /// Route one line read from `session`.
    pub fn handle_line(&self, session: &Session, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        if line.starts_with(COMMAND_PREFIX) {
            let result = Command::parse(line).and_then(|cmd| self.execute(session, cmd));
            if let Err(e) = result {
                debug!(session = %session.id, error = %e, "command rejected");
                let _ = session.deliver(e.to_string());
            }
            return;
        }

        if let FilterAction::Block(word) = self.filter.check(line) {
            info!(session = %session.id, name = %session.name, word = %word, "message blocked");
            let _ = session.deliver(Message::ForbiddenMessage);
            return;
        }

        let chat = Message::Chat {
            from: session.name.clone(),
            body: line.to_string(),
        };
        broadcast::to_others(&self.registry, &session.name, &chat);
    }

    fn execute(&self, session: &Session, cmd: Command<'_>) -> Result<(), CommandError> {
        match cmd {
            Command::Help => {
                let _ = session.deliver(HELP_TEXT);
            }
            Command::UserList => {
                let mut reply = String::from("Connected users:");
                for name in self.registry.names() {
                    reply.push('\n');
                    reply.push_str(&name);
                }
                let _ = session.deliver(reply);
            }
            Command::BannedWords => {
                let mut reply = String::from("list of banned words:");
                for word in self.filter.words() {
                    reply.push('\n');
                    reply.push_str(word);
                }
                let _ = session.deliver(reply);
            }
            Command::Msg(args) => {
                let addressed =
                    command::split_recipients("/msg", args, |name| self.registry.contains(name))?;
                self.send_private(session, &addressed.recipients, addressed.body);
            }
            Command::MsgExcept(args) => {
                let addressed = command::split_recipients("/msgexcept", args, |name| {
                    self.registry.contains(name)
                })?;
                self.send_except(session, &addressed.recipients, addressed.body);
            }
        }
        Ok(())
    }

    fn send_private(&self, sender: &Session, recipients: &[&str], body: String) {
        let line = Message::PrivateFrom {
            from: sender.name.clone(),
            body: body.clone(),
        }
        .to_string();

        // A recipient can leave between parsing and delivery.
        let mut offline = Vec::new();
        for &name in recipients {
            match self.registry.lookup(name) {
                Some(target) => {
                    let _ = target.deliver(line.as_str());
                }
                None => offline.push(name.to_string()),
            }
        }

        let _ = sender.deliver(Message::PrivateSent { body });
        if !offline.is_empty() {
            let _ = sender.deliver(Message::NotOnline(offline));
        }
    }

    fn send_except(&self, sender: &Session, recipients: &[&str], body: String) {
        let mut excluded: BTreeSet<&str> = recipients.iter().copied().collect();
        excluded.insert(sender.name.as_str());

        let msg = Message::BroadcastExcept {
            from: sender.name.clone(),
            body: body.clone(),
        };
        let delivered = broadcast::fan_out(&self.registry, &msg, |name| !excluded.contains(name));
        debug!(session = %sender.id, delivered, "broadcast-except sent");

        let _ = sender.deliver(Message::BroadcastExceptSent {
            excluded: excluded.into_iter().map(str::to_string).collect(),
            body,
        });
    }

    /// Remove `session` and announce its departure.
    ///
    /// Safe to call any number of times from any path; only the first call
    /// does anything. Returns whether this call performed the teardown.
    pub fn teardown(&self, session: &Session) -> bool {
        if !session.begin_teardown() {
            return false;
        }

        if self.registry.unregister(&session.name, session.id) {
            info!(session = %session.id, name = %session.name, online = self.registry.len(), "user left");
            broadcast::to_others(
                &self.registry,
                &session.name,
                &Message::Left(session.name.clone()),
            );
        }
        true
    }
}
