//! What a backend can ask a frontend to do
use std::sync::Arc;

use serde_json::Value as Json;

use crate::connector::SendFuture;
use crate::intern::{Route, Uid};
use crate::options::PushOptions;

mod local;
mod queue;

pub use self::local::{LocalRemote, BroadcastFilter};
pub use self::queue::{QueuedRemote, Request, spawn};


/// Capability of one frontend as seen from the router
///
/// Like `Connector::send`, calls start the delivery immediately and the
/// returned future reports the outcome.
pub trait FrontendRemote {
    /// Delivers to every session bound to any of `uids` on this frontend
    fn push_message(&self, route: &Route, msg: &Arc<Json>, uids: Vec<Uid>,
                    opts: &PushOptions)
        -> SendFuture;
    /// Delivers to every local session accepted by `opts` and the filter
    fn broadcast(&self, route: &Route, msg: &Arc<Json>, opts: &PushOptions)
        -> SendFuture;
}

/// Request to a frontend in a form suitable for a wire codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteAction {
    PushMessage {
        route: Route,
        msg: Arc<Json>,
        uids: Vec<Uid>,
        opts: PushOptions,
    },
    Broadcast {
        route: Route,
        msg: Arc<Json>,
        opts: PushOptions,
    },
}

impl RemoteAction {
    /// Runs the action against a frontend
    pub fn dispatch<R: FrontendRemote + ?Sized>(self, remote: &R)
        -> SendFuture
    {
        match self {
            RemoteAction::PushMessage { route, msg, uids, opts } => {
                remote.push_message(&route, &msg, uids, &opts)
            }
            RemoteAction::Broadcast { route, msg, opts } => {
                remote.broadcast(&route, &msg, &opts)
            }
        }
    }
}
