use std::fmt;

/// Identifies one accepted connection.
///
/// Names can be reused once their owner leaves, so the registry checks this
/// id before removing an entry: a stale teardown must never evict whoever
/// holds the name now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}
