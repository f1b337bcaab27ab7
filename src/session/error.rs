use crate::error::TransportError;
use crate::intern::Uid;
use crate::sid::Sid;


quick_error! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum SessionError {
        /// No session with this id on the frontend
        NotFound(sid: Sid) {
            display("session {} not found", sid)
        }
        /// Session exists but is not bound to the uid given
        NotBound(sid: Sid, uid: Uid) {
            display("session {} is not bound to {:?}", sid, uid)
        }
        /// Session is already bound to another uid
        AlreadyBound(sid: Sid, uid: Uid) {
            display("session {} is already bound to {:?}", sid, uid)
        }
        /// Session id is already registered
        Duplicate(sid: Sid) {
            display("session {} already exists", sid)
        }
        /// Single-session mode is on and the uid has a session already
        SingleSession(uid: Uid) {
            display("uid {:?} already has a bound session", uid)
        }
        Transport(err: TransportError) {
            display("transport error: {}", err)
            from()
        }
    }
}

impl SessionError {
    /// Unknown session or unknown binding
    pub fn is_not_found(&self) -> bool {
        match *self {
            SessionError::NotFound(..) | SessionError::NotBound(..) => true,
            _ => false,
        }
    }
    /// Converts into the error reported for one recipient of a send
    pub fn into_transport(self) -> TransportError {
        match self {
            SessionError::Transport(e) => e,
            SessionError::NotFound(sid) => TransportError::SessionGone(sid),
            other => TransportError::Remote(other.to_string()),
        }
    }
}
