//! Recording transports and frontends shared by unit tests
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;

use futures::future::{ok, err};
use serde_json::Value as Json;

use crate::close_reason::CloseReason;
use crate::config::Sessions;
use crate::connector::{Connector, SessionConnector, SendFuture};
use crate::error::TransportError;
use crate::intern::{Uid, Route, ServerId, ServerType};
use crate::options::{PushOptions, SendOptions, SendType};
use crate::remote::{FrontendRemote, LocalRemote};
use crate::router::Router;
use crate::session::SessionService;
use crate::sid::Sid;
use crate::transport::Transport;


/// What a test transport has seen
#[derive(Clone, Default)]
pub struct Probe {
    pub messages: Rc<RefCell<Vec<Arc<Json>>>>,
    pub closed: Rc<RefCell<Vec<CloseReason>>>,
}

struct Recording {
    probe: Probe,
    addr: Option<SocketAddr>,
    broken: bool,
}

impl Transport for Recording {
    fn send(&self, msg: Arc<Json>) -> Result<(), TransportError> {
        if self.broken {
            return Err(TransportError::Closed);
        }
        self.probe.messages.borrow_mut().push(msg);
        Ok(())
    }
    fn close(&self, reason: &CloseReason) -> Result<(), TransportError> {
        if self.broken {
            return Err(TransportError::Closed);
        }
        self.probe.closed.borrow_mut().push(reason.clone());
        Ok(())
    }
    fn remote_addr(&self) -> Option<SocketAddr> {
        self.addr
    }
}

fn recording(addr: Option<SocketAddr>, broken: bool)
    -> (Box<dyn Transport>, Probe)
{
    let probe = Probe::default();
    let t = Recording { probe: probe.clone(), addr: addr, broken: broken };
    (Box::new(t), probe)
}

pub fn transport() -> (Box<dyn Transport>, Probe) {
    recording(None, false)
}

/// Transport whose connection is already gone
pub fn broken_transport() -> (Box<dyn Transport>, Probe) {
    recording(None, true)
}

pub fn transport_at(addr: &str) -> (Box<dyn Transport>, Probe) {
    recording(Some(addr.parse().unwrap()), false)
}

pub fn uids(list: &[&str]) -> Vec<Uid> {
    list.iter().map(|u| u.parse().unwrap()).collect()
}

/// A call seen by a `Tap` frontend
#[derive(Debug, Clone)]
pub struct TapEntry {
    pub frontend: ServerId,
    pub uids: Vec<Uid>,
    pub broadcast: bool,
    pub opts: PushOptions,
    pub delivered: bool,
}

/// Fake frontends that record calls instead of delivering
#[derive(Clone, Default)]
pub struct Tap {
    log: Rc<RefCell<Vec<TapEntry>>>,
    down: Rc<RefCell<HashSet<ServerId>>>,
}

struct TapRemote {
    id: ServerId,
    tap: Tap,
}

impl Tap {
    pub fn new() -> Tap {
        Tap::default()
    }
    pub fn remote(&self, id: &str) -> Rc<dyn FrontendRemote> {
        Rc::new(TapRemote { id: id.parse().unwrap(), tap: self.clone() })
    }
    /// Router with a `connector` frontend per id
    pub fn router(&self, ids: &[&str]) -> Router {
        let router = Router::new();
        for &id in ids {
            router.add_frontend(id.parse().unwrap(),
                ServerType::from("connector"), self.remote(id));
        }
        router
    }
    /// Frontend fails every call from now on
    pub fn set_down(&self, id: &str) {
        self.down.borrow_mut().insert(id.parse().unwrap());
    }
    pub fn log(&self) -> Vec<TapEntry> {
        self.log.borrow().clone()
    }
    pub fn delivered(&self) -> Vec<TapEntry> {
        self.log.borrow().iter().filter(|e| e.delivered).cloned().collect()
    }
    fn record(&self, id: &ServerId, uids: Vec<Uid>, broadcast: bool,
              opts: &PushOptions)
        -> SendFuture
    {
        let delivered = !self.down.borrow().contains(id);
        self.log.borrow_mut().push(TapEntry {
            frontend: id.clone(),
            uids: uids,
            broadcast: broadcast,
            opts: opts.clone(),
            delivered: delivered,
        });
        if delivered {
            Box::new(ok(()))
        } else {
            Box::new(err(TransportError::Closed))
        }
    }
}

impl FrontendRemote for TapRemote {
    fn push_message(&self, _route: &Route, _msg: &Arc<Json>, uids: Vec<Uid>,
                    opts: &PushOptions)
        -> SendFuture
    {
        self.tap.record(&self.id, uids, false, opts)
    }
    fn broadcast(&self, _route: &Route, _msg: &Arc<Json>, opts: &PushOptions)
        -> SendFuture
    {
        self.tap.record(&self.id, Vec::new(), true, opts)
    }
}

/// A connector call, sids are sorted
#[derive(Debug, Clone)]
pub struct Sent {
    pub kind: SendType,
    pub route: Route,
    pub sids: Vec<u64>,
}

struct LoggingConnector {
    inner: SessionConnector,
    log: Rc<RefCell<Vec<Sent>>>,
}

impl Connector for LoggingConnector {
    fn send(&self, req_id: Option<u64>, route: &Route, msg: &Arc<Json>,
            recvs: &[Sid], opts: &SendOptions)
        -> SendFuture
    {
        let mut sids = recvs.iter().map(|s| s.as_u64()).collect::<Vec<_>>();
        sids.sort();
        self.log.borrow_mut().push(Sent {
            kind: opts.kind,
            route: route.clone(),
            sids: sids,
        });
        self.inner.send(req_id, route, msg, recvs, opts)
    }
}

/// Real frontend stack on top of recording transports
pub struct Frontend {
    id: ServerId,
    pub sessions: Rc<RefCell<SessionService>>,
    connector: Rc<LoggingConnector>,
    log: Rc<RefCell<Vec<Sent>>>,
    probes: HashMap<u64, Probe>,
}

impl Frontend {
    pub fn new(id: &str) -> Frontend {
        let sessions = Rc::new(RefCell::new(
            SessionService::new(&Arc::new(Sessions::default()))));
        let log = Rc::new(RefCell::new(Vec::new()));
        Frontend {
            id: id.parse().unwrap(),
            connector: Rc::new(LoggingConnector {
                inner: SessionConnector::new(&sessions),
                log: log.clone(),
            }),
            sessions: sessions,
            log: log,
            probes: HashMap::new(),
        }
    }
    pub fn id(&self) -> &ServerId {
        &self.id
    }
    pub fn connect(&mut self, sid: u64, uid: Option<&str>) {
        let (t, probe) = transport();
        let mut sessions = self.sessions.borrow_mut();
        sessions.create(Sid::from(sid), self.id.clone(), t).unwrap();
        if let Some(uid) = uid {
            sessions.bind(Sid::from(sid), uid.parse().unwrap()).unwrap();
        }
        self.probes.insert(sid, probe);
    }
    pub fn set_level(&self, sid: u64, level: u64) {
        self.sessions.borrow_mut()
            .import(Sid::from(sid), "level", json!(level)).unwrap();
    }
    pub fn remote(&self) -> LocalRemote {
        LocalRemote::new(self.id.clone(), &self.sessions,
                         self.connector.clone())
    }
    pub fn connector_log(&self) -> Vec<Sent> {
        self.log.borrow().clone()
    }
    pub fn inbox(&self, sid: u64) -> Vec<Arc<Json>> {
        self.probes.get(&sid)
            .map(|p| p.messages.borrow().clone())
            .unwrap_or_else(Vec::new)
    }
}
