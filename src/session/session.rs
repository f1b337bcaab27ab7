use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::close_reason::CloseReason;
use crate::error::TransportError;
use crate::intern::{Uid, ServerId};
use crate::sid::Sid;
use crate::transport::Transport;
use super::event::{EventKind, SessionEvent, Listeners};
use super::frontend::FrontendSession;

pub type Settings = HashMap<String, Json>;


/// State of one client connection on a frontend
///
/// Sessions are created and owned by `SessionService`, bind and unbind go
/// through the service so that the uid index stays consistent.
pub struct Session {
    id: Sid,
    frontend_id: ServerId,
    uid: Option<Uid>,
    settings: Settings,
    transport: Box<dyn Transport>,
    listeners: Listeners,
    closed: bool,
}

impl Session {
    pub(in crate::session) fn new(id: Sid, frontend_id: ServerId,
        transport: Box<dyn Transport>)
        -> Session
    {
        Session {
            id: id,
            frontend_id: frontend_id,
            uid: None,
            settings: HashMap::new(),
            transport: transport,
            listeners: Listeners::default(),
            closed: false,
        }
    }
    pub fn id(&self) -> Sid {
        self.id
    }
    pub fn frontend_id(&self) -> &ServerId {
        &self.frontend_id
    }
    pub fn uid(&self) -> Option<&Uid> {
        self.uid.as_ref()
    }
    pub fn is_bound(&self) -> bool {
        self.uid.is_some()
    }
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Registers a listener for one kind of event
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
        where F: FnMut(&SessionEvent) + 'static
    {
        self.listeners.add(kind, Box::new(listener));
    }
    pub fn listeners_count(&self, kind: EventKind) -> usize {
        self.listeners.count(kind)
    }

    pub fn set<K: Into<String>>(&mut self, key: K, value: Json) {
        self.settings.insert(key.into(), value);
    }
    pub fn set_all(&mut self, settings: Settings) {
        self.settings.extend(settings);
    }
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.settings.get(key)
    }
    pub fn remove(&mut self, key: &str) -> Option<Json> {
        self.settings.remove(key)
    }
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn send(&self, msg: Arc<Json>) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.transport.send(msg)
    }
    pub fn send_batch(&self, msgs: Vec<Arc<Json>>)
        -> Result<(), TransportError>
    {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.transport.send_batch(msgs)
    }
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.transport.remote_addr()
    }

    pub fn to_frontend_session(&self) -> FrontendSession {
        FrontendSession {
            id: self.id,
            frontend_id: self.frontend_id.clone(),
            uid: self.uid.clone(),
            settings: self.settings.clone(),
        }
    }

    pub(in crate::session) fn bind(&mut self, uid: Uid) {
        self.uid = Some(uid.clone());
        self.listeners.emit(&SessionEvent::Bind { sid: self.id, uid: uid });
    }
    pub(in crate::session) fn unbind(&mut self) -> Option<Uid> {
        let uid = self.uid.take();
        if let Some(ref uid) = uid {
            self.listeners.emit(&SessionEvent::Unbind {
                sid: self.id,
                uid: uid.clone(),
            });
        }
        uid
    }
    /// Marks session closed, notifies listeners and closes the transport
    ///
    /// Only the first call has any effect.
    pub(in crate::session) fn closed(&mut self, reason: CloseReason)
        -> Result<(), TransportError>
    {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.listeners.emit(&SessionEvent::Closed {
            sid: self.id,
            uid: self.uid.clone(),
            reason: reason.clone(),
        });
        self.transport.close(&reason)
    }
}
