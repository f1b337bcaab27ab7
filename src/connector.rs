//! Send primitive of a frontend
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use futures::Future;
use futures::future::{ok, err};
use serde_json::Value as Json;

use crate::error::{TransportError, DeliveryError};
use crate::intern::Route;
use crate::options::SendOptions;
use crate::session::SessionService;
use crate::sid::Sid;

pub type SendFuture = Box<dyn Future<Item=(), Error=TransportError>>;


/// Transport-level send of one frontend
///
/// Delivery is initiated when `send` is called, the future only reports
/// the outcome. So sends issued one after another reach the transport in
/// the same order.
///
/// The outcome is per call, not per session: the future fails with
/// `Undelivered` only when every addressed session failed. When only some
/// of them fail the call succeeds and the failures are logged at `warn`,
/// so they don't show up in the aggregate error of a push.
pub trait Connector {
    fn send(&self, req_id: Option<u64>, route: &Route, msg: &Arc<Json>,
            recvs: &[Sid], opts: &SendOptions)
        -> SendFuture;
}

/// Builds the frame delivered to a client
pub fn encode(req_id: Option<u64>, route: &Route, msg: &Json) -> Arc<Json> {
    let mut frame = json!({
        "route": &route[..],
        "body": msg,
    });
    if let Some(id) = req_id {
        frame["id"] = json!(id);
    }
    Arc::new(frame)
}

/// Connector writing into the transports of local sessions
pub struct SessionConnector {
    sessions: Rc<RefCell<SessionService>>,
}

impl SessionConnector {
    pub fn new(sessions: &Rc<RefCell<SessionService>>) -> SessionConnector {
        SessionConnector {
            sessions: sessions.clone(),
        }
    }
}

impl Connector for SessionConnector {
    fn send(&self, req_id: Option<u64>, route: &Route, msg: &Arc<Json>,
            recvs: &[Sid], opts: &SendOptions)
        -> SendFuture
    {
        if recvs.is_empty() {
            return Box::new(ok(()));
        }
        let frame = encode(req_id, route, msg);
        let sessions = self.sessions.borrow();
        let mut failures = DeliveryError::new(recvs.len());
        for &sid in recvs {
            if let Err(e) = sessions.send_message(sid, frame.clone()) {
                failures.add(sid, e.into_transport());
            }
        }
        if failures.is_total() {
            debug!("{:?} send of {:?} failed: {}", opts.kind, route, failures);
            return Box::new(err(TransportError::Undelivered(recvs.len())));
        }
        if failures.is_partial() {
            warn!("{:?} send of {:?} was incomplete: {}",
                  opts.kind, route, failures);
        }
        Box::new(ok(()))
    }
}
