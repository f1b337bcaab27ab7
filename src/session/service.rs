use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::close_reason::CloseReason;
use crate::config::Sessions;
use crate::error::DeliveryError;
use crate::intern::{Uid, ServerId};
use crate::metrics::{SESSIONS, BOUND_SESSIONS, KICKS};
use crate::pair::PairCollection;
use crate::sid::Sid;
use crate::transport::Transport;
use super::error::SessionError;
use super::session::{Session, Settings};


/// Registry of sessions of one frontend process
///
/// Sessions are indexed by id (owning) and by bound uid. Every sid in the
/// uid index is present in the id index, removing a session drops it from
/// both.
pub struct SessionService {
    config: Arc<Sessions>,
    sessions: HashMap<Sid, Session>,
    by_uid: HashMap<Uid, HashSet<Sid>>,
}

impl SessionService {
    pub fn new(config: &Arc<Sessions>) -> SessionService {
        SessionService {
            config: config.clone(),
            sessions: HashMap::new(),
            by_uid: HashMap::new(),
        }
    }

    pub fn create(&mut self, sid: Sid, frontend_id: ServerId,
        transport: Box<dyn Transport>)
        -> Result<&mut Session, SessionError>
    {
        use std::collections::hash_map::Entry::*;
        match self.sessions.entry(sid) {
            Occupied(_) => Err(SessionError::Duplicate(sid)),
            Vacant(e) => {
                SESSIONS.incr(1);
                debug!("New session {:#?} on {:?}", sid, frontend_id);
                Ok(e.insert(Session::new(sid, frontend_id, transport)))
            }
        }
    }

    /// Binds session to a user id
    ///
    /// Binding the same uid again is a no-op, binding a different one
    /// fails and keeps the original binding.
    pub fn bind(&mut self, sid: Sid, uid: Uid) -> Result<(), SessionError> {
        let session = self.sessions.get_mut(&sid)
            .ok_or(SessionError::NotFound(sid))?;
        match session.uid() {
            Some(old) if *old == uid => return Ok(()),
            Some(old) => {
                return Err(SessionError::AlreadyBound(sid, old.clone()));
            }
            None => {}
        }
        if self.config.single_session &&
            self.by_uid.get(&uid).map(|s| !s.is_empty()).unwrap_or(false)
        {
            return Err(SessionError::SingleSession(uid));
        }
        self.by_uid.insert_pair(&uid, &sid);
        BOUND_SESSIONS.incr(1);
        session.bind(uid);
        Ok(())
    }

    pub fn unbind(&mut self, sid: Sid, uid: &Uid) -> Result<(), SessionError> {
        let session = self.sessions.get_mut(&sid)
            .ok_or(SessionError::NotFound(sid))?;
        if session.uid() != Some(uid) {
            return Err(SessionError::NotBound(sid, uid.clone()));
        }
        self.by_uid.remove_pair(uid, &sid);
        BOUND_SESSIONS.decr(1);
        session.unbind();
        Ok(())
    }

    pub fn get(&self, sid: Sid) -> Option<&Session> {
        self.sessions.get(&sid)
    }
    pub fn get_mut(&mut self, sid: Sid) -> Option<&mut Session> {
        self.sessions.get_mut(&sid)
    }
    /// All sessions bound to the uid, empty if there are none
    pub fn get_by_uid(&self, uid: &Uid) -> Vec<&Session> {
        self.by_uid.get(uid)
            .map(|sids| {
                sids.iter().filter_map(|sid| self.sessions.get(sid)).collect()
            })
            .unwrap_or_else(Vec::new)
    }
    pub fn sids_by_uid(&self, uid: &Uid) -> Vec<Sid> {
        self.by_uid.get(uid)
            .map(|sids| sids.iter().cloned().collect())
            .unwrap_or_else(Vec::new)
    }

    /// Forgets the session, returns it if it was registered
    ///
    /// Listeners are not notified, use `closed` for the disconnect path.
    pub fn remove(&mut self, sid: Sid) -> Option<Session> {
        let session = self.sessions.remove(&sid)?;
        SESSIONS.decr(1);
        if let Some(uid) = session.uid() {
            self.by_uid.remove_pair(uid, &sid);
            BOUND_SESSIONS.decr(1);
        }
        debug!("Session {:#?} removed", sid);
        Some(session)
    }

    /// Disconnect path: removes the session, fires `Closed` and closes
    /// the transport
    pub fn closed(&mut self, sid: Sid, reason: CloseReason)
        -> Result<(), SessionError>
    {
        let mut session = self.remove(sid)
            .ok_or(SessionError::NotFound(sid))?;
        session.closed(reason)?;
        Ok(())
    }

    pub fn import(&mut self, sid: Sid, key: &str, value: Json)
        -> Result<(), SessionError>
    {
        self.sessions.get_mut(&sid)
            .ok_or(SessionError::NotFound(sid))?
            .set(key, value);
        Ok(())
    }

    pub fn import_all(&mut self, sid: Sid, settings: Settings)
        -> Result<(), SessionError>
    {
        self.sessions.get_mut(&sid)
            .ok_or(SessionError::NotFound(sid))?
            .set_all(settings);
        Ok(())
    }

    /// Closes every session bound to the uid
    ///
    /// Each session is closed independently. Returns the number of sessions
    /// closed, fails only if every close failed.
    pub fn kick(&mut self, uid: &Uid, reason: CloseReason)
        -> Result<usize, DeliveryError>
    {
        let sids = self.sids_by_uid(uid);
        let mut failures = DeliveryError::new(sids.len());
        for sid in &sids {
            KICKS.incr(1);
            if let Err(e) = self.closed(*sid, reason.clone()) {
                failures.add(*sid, e.into_transport());
            }
        }
        if failures.is_total() {
            return Err(failures);
        }
        if failures.is_partial() {
            warn!("Kick of {:?} was incomplete: {}", uid, failures);
        }
        Ok(sids.len())
    }

    pub fn kick_by_session_id(&mut self, sid: Sid, reason: CloseReason)
        -> Result<(), SessionError>
    {
        KICKS.incr(1);
        self.closed(sid, reason)
    }

    pub fn get_client_address_by_session_id(&self, sid: Sid)
        -> Option<SocketAddr>
    {
        self.sessions.get(&sid).and_then(|s| s.remote_addr())
    }

    pub fn send_message(&self, sid: Sid, msg: Arc<Json>)
        -> Result<(), SessionError>
    {
        let session = self.sessions.get(&sid)
            .ok_or(SessionError::NotFound(sid))?;
        session.send(msg)?;
        Ok(())
    }

    /// Delivers to every session of the uid, returns number of deliveries
    ///
    /// A failure on one session doesn't stop delivery to the others.
    pub fn send_message_by_uid(&self, uid: &Uid, msg: Arc<Json>)
        -> Result<usize, DeliveryError>
    {
        let sessions = self.get_by_uid(uid);
        if sessions.is_empty() {
            debug!("No sessions for {:?}, message dropped", uid);
            return Ok(0);
        }
        let mut failures = DeliveryError::new(sessions.len());
        for session in &sessions {
            if let Err(e) = session.send(msg.clone()) {
                failures.add(session.id(), e);
            }
        }
        let delivered = sessions.len() - failures.failed().len();
        failures.into_result().map(|()| delivered)
    }

    /// Visits every session
    ///
    /// The shared borrow guarantees nothing is added or removed while
    /// iterating.
    pub fn for_each_session<F: FnMut(&Session)>(&self, mut f: F) {
        for session in self.sessions.values() {
            f(session);
        }
    }

    pub fn for_each_binded_session<F: FnMut(&Session)>(&self, mut f: F) {
        for session in self.sessions.values() {
            if session.is_bound() {
                f(session);
            }
        }
    }

    pub fn sessions_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Drop for SessionService {
    fn drop(&mut self) {
        SESSIONS.decr(self.sessions.len() as i64);
        BOUND_SESSIONS.decr(
            self.by_uid.values().map(|s| s.len()).sum::<usize>() as i64);
    }
}
