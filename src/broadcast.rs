use tracing::{debug, trace};

use crate::message::{Message, MessageKind};
use crate::registry::ClientRegistry;

/// Queue `msg` for every online session whose name passes `include`.
///
/// The line is rendered once. Delivery is independent per recipient: a
/// recipient whose queue rejects the line is flagged for teardown (see
/// `Session::deliver`) and skipped, and the others still get it. Returns how
/// many sessions accepted it.
pub fn fan_out<F>(registry: &ClientRegistry, msg: &Message, include: F) -> usize
where
    F: Fn(&str) -> bool,
{
    let kind = msg.kind();
    let line = msg.to_string();
    let mut delivered = 0;
    for session in registry.snapshot() {
        if !include(&session.name) {
            continue;
        }
        match session.deliver(line.as_str()) {
            Ok(()) => delivered += 1,
            Err(e) => {
                debug!(session = %session.id, name = %session.name, ?kind, error = %e, "fan-out skipped recipient");
            }
        }
    }

    // Chat traffic is the bulk of fan-out; keep it out of debug output.
    if kind == MessageKind::Broadcast {
        trace!(?kind, delivered, "fan-out");
    } else {
        debug!(?kind, delivered, "fan-out");
    }
    delivered
}

/// Everyone except `sender`.
pub fn to_others(registry: &ClientRegistry, sender: &str, msg: &Message) -> usize {
    fan_out(registry, msg, |name| name != sender)
}
