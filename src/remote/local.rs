use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use futures::future::ok;
use serde_json::Value as Json;

use crate::connector::{Connector, SendFuture};
use crate::intern::{Route, Uid, ServerId};
use crate::options::{PushOptions, SendOptions};
use crate::session::{Session, SessionService};
use crate::sid::Sid;
use super::FrontendRemote;

/// Decides whether a session gets a broadcast, gets `filter_param` of the
/// push options
pub type BroadcastFilter = Box<dyn Fn(&Session, Option<&Json>) -> bool>;


/// Frontend side of the routing: resolves users to local sessions and
/// hands them to the connector in a single send
pub struct LocalRemote {
    frontend_id: ServerId,
    sessions: Rc<RefCell<SessionService>>,
    connector: Rc<dyn Connector>,
    filter: Option<BroadcastFilter>,
}

impl LocalRemote {
    pub fn new(frontend_id: ServerId, sessions: &Rc<RefCell<SessionService>>,
               connector: Rc<dyn Connector>)
        -> LocalRemote
    {
        LocalRemote {
            frontend_id: frontend_id,
            sessions: sessions.clone(),
            connector: connector,
            filter: None,
        }
    }
    pub fn set_broadcast_filter<F>(&mut self, filter: F)
        where F: Fn(&Session, Option<&Json>) -> bool + 'static
    {
        self.filter = Some(Box::new(filter));
    }
    pub fn frontend_id(&self) -> &ServerId {
        &self.frontend_id
    }
    fn broadcast_audience(&self, opts: &PushOptions) -> Vec<Sid> {
        let sessions = self.sessions.borrow();
        let mut sids = Vec::new();
        {
            let mut visit = |s: &Session| {
                let accepted = self.filter.as_ref()
                    .map(|f| f(s, opts.filter_param.as_ref()))
                    .unwrap_or(true);
                if accepted {
                    sids.push(s.id());
                }
            };
            if opts.binded {
                sessions.for_each_binded_session(&mut visit);
            } else {
                sessions.for_each_session(&mut visit);
            }
        }
        sids
    }
}

impl FrontendRemote for LocalRemote {
    fn push_message(&self, route: &Route, msg: &Arc<Json>, uids: Vec<Uid>,
                    opts: &PushOptions)
        -> SendFuture
    {
        let sids = {
            let sessions = self.sessions.borrow();
            uids.iter()
                .flat_map(|uid| sessions.sids_by_uid(uid))
                .collect::<Vec<_>>()
        };
        if sids.is_empty() {
            debug!("{:?}: no sessions for {} uids, push of {:?} skipped",
                   self.frontend_id, uids.len(), route);
            return Box::new(ok(()));
        }
        self.connector.send(None, route, msg, &sids, &SendOptions::push(opts))
    }

    fn broadcast(&self, route: &Route, msg: &Arc<Json>, opts: &PushOptions)
        -> SendFuture
    {
        let sids = self.broadcast_audience(opts);
        debug!("{:?}: broadcast of {:?} to {} sessions",
               self.frontend_id, route, sids.len());
        self.connector.send(None, route, msg, &sids,
                            &SendOptions::broadcast(opts))
    }
}
