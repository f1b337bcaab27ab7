use std::sync::Arc;

use futures::{Future, Stream};
use futures::future::err;
use futures::sync::mpsc::{unbounded, UnboundedSender};
use futures::sync::oneshot::{channel as oneshot, Sender};
use serde_json::Value as Json;
use tokio_core::reactor::Handle;

use crate::connector::SendFuture;
use crate::error::TransportError;
use crate::intern::{Route, Uid, ServerId};
use crate::options::PushOptions;
use super::{FrontendRemote, RemoteAction};


/// Action with a slot for the outcome
pub struct Request {
    pub action: RemoteAction,
    pub reply: Sender<Result<(), TransportError>>,
}

/// Handle to a frontend served by a task on the event loop
///
/// Requests are queued in call order and the serving task starts them in
/// the same order, so sends to one frontend are never reordered.
#[derive(Clone)]
pub struct QueuedRemote {
    frontend_id: ServerId,
    queue: UnboundedSender<Request>,
}

impl QueuedRemote {
    pub fn new(frontend_id: ServerId, queue: UnboundedSender<Request>)
        -> QueuedRemote
    {
        QueuedRemote {
            frontend_id: frontend_id,
            queue: queue,
        }
    }
    fn call(&self, action: RemoteAction) -> SendFuture {
        let (tx, rx) = oneshot();
        let req = Request { action: action, reply: tx };
        if let Err(_) = self.queue.unbounded_send(req) {
            debug!("{:?}: request queue is closed", self.frontend_id);
            return Box::new(err(TransportError::Closed));
        }
        Box::new(rx.then(|res| match res {
            Ok(result) => result,
            Err(_) => Err(TransportError::Canceled),
        }))
    }
}

impl FrontendRemote for QueuedRemote {
    fn push_message(&self, route: &Route, msg: &Arc<Json>, uids: Vec<Uid>,
                    opts: &PushOptions)
        -> SendFuture
    {
        self.call(RemoteAction::PushMessage {
            route: route.clone(),
            msg: msg.clone(),
            uids: uids,
            opts: opts.clone(),
        })
    }
    fn broadcast(&self, route: &Route, msg: &Arc<Json>, opts: &PushOptions)
        -> SendFuture
    {
        self.call(RemoteAction::Broadcast {
            route: route.clone(),
            msg: msg.clone(),
            opts: opts.clone(),
        })
    }
}

/// Starts a task serving `remote` and returns a handle to it
///
/// The task stops when every handle is dropped.
pub fn spawn<R>(frontend_id: ServerId, remote: R, handle: &Handle)
    -> QueuedRemote
    where R: FrontendRemote + 'static
{
    let (tx, rx) = unbounded();
    let h1 = handle.clone();
    let id = frontend_id.clone();
    handle.spawn(rx.for_each(move |req: Request| {
        let Request { action, reply } = req;
        h1.spawn(action.dispatch(&remote).then(move |res| {
            reply.send(res).ok();
            Ok(())
        }));
        Ok(())
    }).then(move |_| {
        debug!("{:?}: remote task stopped", id);
        Ok(())
    }));
    QueuedRemote::new(frontend_id, tx)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use futures::future::join_all;
    use futures::sync::mpsc::unbounded;
    use tokio_core::reactor::Core;

    use crate::error::TransportError;
    use crate::intern::{Route, Uid, ServerId};
    use crate::options::PushOptions;
    use crate::testing::Frontend;
    use super::super::{FrontendRemote, RemoteAction};
    use super::{spawn, QueuedRemote};

    #[test]
    fn preserves_order() {
        let mut core = Core::new().unwrap();
        let mut fe = Frontend::new("conn-1");
        fe.connect(1, Some("u1"));
        let remote = spawn(ServerId::from("conn-1"), fe.remote(),
                           &core.handle());
        let route = Route::from("onChat");
        let futures = (0..5).map(|i| {
            remote.push_message(&route, &Arc::new(json!(i)),
                vec![Uid::from("u1")], &PushOptions::default())
        }).collect::<Vec<_>>();
        core.run(join_all(futures)).unwrap();
        let bodies = fe.inbox(1).iter()
            .map(|m| m["body"].clone())
            .collect::<Vec<_>>();
        assert_eq!(bodies, vec![json!(0), json!(1), json!(2), json!(3),
                                json!(4)]);
    }

    #[test]
    fn closed_queue() {
        let (tx, rx) = unbounded();
        drop(rx);
        let remote = QueuedRemote::new(ServerId::from("conn-1"), tx);
        let mut core = Core::new().unwrap();
        let res = core.run(remote.broadcast(&Route::from("onChat"),
            &Arc::new(json!(1)), &PushOptions::default()));
        assert_eq!(res, Err(TransportError::Closed));
    }

    #[test]
    fn dropped_reply() {
        let (tx, rx) = unbounded();
        let remote = QueuedRemote::new(ServerId::from("conn-1"), tx);
        let fut = remote.broadcast(&Route::from("onChat"),
            &Arc::new(json!(1)), &PushOptions::default());
        drop(rx);
        let mut core = Core::new().unwrap();
        assert_eq!(core.run(fut), Err(TransportError::Canceled));
    }

    #[test]
    fn action_wire_format() {
        let action = RemoteAction::PushMessage {
            route: Route::from("onChat"),
            msg: Arc::new(json!({"text": "hi"})),
            uids: vec![Uid::from("u1")],
            opts: PushOptions::default(),
        };
        let text = ::serde_json::to_string(&action).unwrap();
        let back: RemoteAction = ::serde_json::from_str(&text).unwrap();
        assert_eq!(back, action);
    }
}
