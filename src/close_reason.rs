use std::fmt;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CloseReason {
    /// Kicked by application logic, the text is shown to the client
    Kick(String),
    /// Closed by peer, we just propagate the event here
    PeerClose,
    /// Frontend is shutting down
    ServerStopped,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CloseReason::*;
        match *self {
            Kick(ref reason) if reason.len() > 0 => {
                write!(f, "kicked: {}", reason)
            }
            Kick(_) => f.write_str("kicked"),
            PeerClose => f.write_str("connection closed by peer"),
            ServerStopped => f.write_str("server stopped"),
        }
    }
}
