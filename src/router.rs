//! Fan-out of logical pushes into one send per frontend
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use futures::Future;
use futures::future::{join_all, err};
use serde_json::Value as Json;
use void::{self, Void};

use crate::connector::SendFuture;
use crate::error::{TransportError, PushError};
use crate::intern::{Uid, Route, ServerId, ServerType};
use crate::metrics::{PUSHES, BROADCASTS, FRONTEND_SENDS, SEND_FAILURES};
use crate::metrics::DROPPED_RECEIVERS;
use crate::options::PushOptions;
use crate::remote::FrontendRemote;

/// Settles after every per-frontend send has settled
///
/// Resolves to an error when at least one frontend failed. The error
/// lists only the failed frontends.
pub type PushFuture = Box<dyn Future<Item=(), Error=PushError>>;


/// Single delivery target: a user reachable through a frontend
///
/// Receivers without a frontend are unreachable and are dropped by the
/// router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub uid: Uid,
    #[serde(default)]
    pub frontend: Option<ServerId>,
}

struct Frontend {
    server_type: ServerType,
    remote: Rc<dyn FrontendRemote>,
}

/// Table of frontends known to this process
///
/// Clones share the table.
#[derive(Clone)]
pub struct Router {
    frontends: Rc<RefCell<HashMap<ServerId, Frontend>>>,
}

impl Receiver {
    pub fn new(uid: Uid, frontend: ServerId) -> Receiver {
        Receiver {
            uid: uid,
            frontend: Some(frontend),
        }
    }
}

impl Router {
    pub fn new() -> Router {
        Router {
            frontends: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Registers a frontend, returns the remote it replaced, if any
    pub fn add_frontend(&self, id: ServerId, server_type: ServerType,
        remote: Rc<dyn FrontendRemote>)
        -> Option<Rc<dyn FrontendRemote>>
    {
        debug!("Frontend {:?} of type {:?} registered", id, server_type);
        self.frontends.borrow_mut()
            .insert(id, Frontend { server_type: server_type, remote: remote })
            .map(|old| old.remote)
    }
    pub fn remove_frontend(&self, id: &ServerId) -> bool {
        let removed = self.frontends.borrow_mut().remove(id).is_some();
        if removed {
            debug!("Frontend {:?} removed", id);
        }
        removed
    }
    /// Replaces the whole table
    pub fn replace_frontends<I>(&self, frontends: I)
        where I: IntoIterator<Item=(ServerId, ServerType,
                                     Rc<dyn FrontendRemote>)>
    {
        let table = frontends.into_iter()
            .map(|(id, server_type, remote)| {
                (id, Frontend { server_type: server_type, remote: remote })
            })
            .collect::<HashMap<_, _>>();
        info!("Router has {} frontends", table.len());
        *self.frontends.borrow_mut() = table;
    }
    /// Ids of registered frontends, optionally of one type, sorted
    pub fn frontends_by_type(&self, server_type: Option<&ServerType>)
        -> Vec<ServerId>
    {
        let mut ids = self.frontends.borrow().iter()
            .filter(|&(_, f)| {
                server_type.map(|t| f.server_type == *t).unwrap_or(true)
            })
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        ids.sort_by(|a, b| a[..].cmp(&b[..]));
        ids
    }
    /// Distinct server types of registered frontends, sorted
    pub fn server_types(&self) -> Vec<ServerType> {
        let mut types = self.frontends.borrow().values()
            .map(|f| f.server_type.clone())
            .collect::<Vec<_>>();
        types.sort_by(|a, b| a[..].cmp(&b[..]));
        types.dedup();
        types
    }
    pub fn has_frontend(&self, id: &ServerId) -> bool {
        self.frontends.borrow().contains_key(id)
    }
    pub fn len(&self) -> usize {
        self.frontends.borrow().len()
    }

    /// Groups receivers by frontend, keeping first-seen order of both
    /// frontends and users
    ///
    /// Receivers without a frontend are dropped. Duplicate receivers are
    /// collapsed.
    pub fn group_receivers(receivers: &[Receiver])
        -> Vec<(ServerId, Vec<Uid>)>
    {
        let mut index = HashMap::new();
        let mut groups: Vec<(ServerId, Vec<Uid>)> = Vec::new();
        for recv in receivers {
            let frontend = match recv.frontend {
                Some(ref frontend) => frontend,
                None => {
                    debug!("Receiver {:?} has no frontend, dropped", recv.uid);
                    DROPPED_RECEIVERS.incr(1);
                    continue;
                }
            };
            let idx = *index.entry(frontend.clone()).or_insert_with(|| {
                groups.push((frontend.clone(), Vec::new()));
                groups.len() - 1
            });
            let uids = &mut groups[idx].1;
            if !uids.contains(&recv.uid) {
                uids.push(recv.uid.clone());
            }
        }
        groups
    }

    /// Delivers to explicitly addressed receivers
    pub fn push_message_by_uids(&self, route: &Route, msg: &Arc<Json>,
        receivers: &[Receiver], opts: &PushOptions)
        -> PushFuture
    {
        self.push_groups(route, msg, Router::group_receivers(receivers), opts)
    }

    /// Issues one `push_message` per group
    ///
    /// All sends are started before this method returns. A group whose
    /// frontend isn't registered fails with `UnknownFrontend`.
    pub fn push_groups(&self, route: &Route, msg: &Arc<Json>,
        groups: Vec<(ServerId, Vec<Uid>)>, opts: &PushOptions)
        -> PushFuture
    {
        PUSHES.incr(1);
        let targets = {
            let frontends = self.frontends.borrow();
            groups.into_iter()
                .map(|(id, uids)| {
                    let remote = frontends.get(&id).map(|f| f.remote.clone());
                    (id, remote, uids)
                })
                .collect::<Vec<_>>()
        };
        // table is not borrowed here, a remote may call back into router
        let sends = targets.into_iter()
            .map(|(id, remote, uids)| {
                let fut: SendFuture = match remote {
                    Some(remote) => {
                        FRONTEND_SENDS.incr(1);
                        remote.push_message(route, msg, uids, opts)
                    }
                    None => {
                        Box::new(err(
                            TransportError::UnknownFrontend(id.clone())))
                    }
                };
                (id, fut)
            })
            .collect();
        settle(route, sends)
    }

    /// Delivers to every session of every frontend of the type (or of all
    /// types), filtering is done by each frontend
    pub fn broadcast(&self, server_type: Option<&ServerType>, route: &Route,
        msg: &Arc<Json>, opts: &PushOptions)
        -> PushFuture
    {
        BROADCASTS.incr(1);
        let mut targets = self.frontends.borrow().iter()
            .filter(|&(_, f)| {
                server_type.map(|t| f.server_type == *t).unwrap_or(true)
            })
            .map(|(id, f)| (id.clone(), f.remote.clone()))
            .collect::<Vec<_>>();
        targets.sort_by(|a, b| a.0[..].cmp(&b.0[..]));
        let sends = targets.into_iter()
            .map(|(id, remote)| {
                FRONTEND_SENDS.incr(1);
                (id, remote.broadcast(route, msg, opts))
            })
            .collect();
        settle(route, sends)
    }
}

fn settle(route: &Route, sends: Vec<(ServerId, SendFuture)>) -> PushFuture {
    let attempted = sends.len();
    let route = route.clone();
    Box::new(join_all(sends.into_iter().map(|(id, fut)| {
        fut.then(move |res| Ok::<_, Void>((id, res)))
    }))
    .map_err(|e: Void| void::unreachable(e))
    .and_then(move |results| {
        let mut failures = PushError::new(attempted);
        for (id, res) in results {
            if let Err(e) = res {
                SEND_FAILURES.incr(1);
                failures.add(id, e);
            }
        }
        if !failures.is_empty() {
            warn!("Push of {:?}: {}", route, failures);
        }
        failures.into_result()
    }))
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use futures::{Future, Async};
    use futures::future::lazy;
    use futures::sync::oneshot;
    use serde_json::Value as Json;

    use crate::connector::SendFuture;
    use crate::error::TransportError;
    use crate::intern::{Uid, Route, ServerId, ServerType};
    use crate::options::PushOptions;
    use crate::remote::FrontendRemote;
    use crate::testing::{Tap, uids};
    use super::{Router, Receiver};

    /// Frontend that settles when the test fires the oneshot
    struct Deferred(RefCell<Option<oneshot::Receiver<()>>>);

    impl Deferred {
        fn settle(&self) -> SendFuture {
            match self.0.borrow_mut().take() {
                Some(rx) => Box::new(rx.map_err(|_| TransportError::Canceled)),
                None => Box::new(::futures::future::ok(())),
            }
        }
    }

    impl FrontendRemote for Deferred {
        fn push_message(&self, _: &Route, _: &Arc<Json>, _: Vec<Uid>,
                        _: &PushOptions)
            -> SendFuture
        {
            self.settle()
        }
        fn broadcast(&self, _: &Route, _: &Arc<Json>, _: &PushOptions)
            -> SendFuture
        {
            self.settle()
        }
    }

    fn recv(uid: &str, frontend: Option<&str>) -> Receiver {
        Receiver {
            uid: uid.parse().unwrap(),
            frontend: frontend.map(|f| f.parse::<ServerId>().unwrap()),
        }
    }

    fn router(tap: &Tap, frontends: &[(&str, &str)]) -> Router {
        let router = Router::new();
        for &(id, kind) in frontends {
            router.add_frontend(id.parse().unwrap(), kind.parse().unwrap(),
                                tap.remote(id));
        }
        router
    }

    #[test]
    fn group() {
        let groups = Router::group_receivers(&[
            recv("1", Some("f2")),
            recv("2", Some("f1")),
            recv("3", None),
            recv("4", Some("f2")),
            recv("1", Some("f2")),
        ]);
        assert_eq!(groups, vec![
            (ServerId::from("f2"), uids(&["1", "4"])),
            (ServerId::from("f1"), uids(&["2"])),
        ]);
    }

    #[test]
    fn one_send_per_frontend() {
        let tap = Tap::new();
        let r = router(&tap, &[("f1", "connector"), ("f2", "connector")]);
        let receivers = (0..100)
            .map(|i| recv(&i.to_string(), Some(if i % 2 == 0 { "f1" }
                                               else { "f2" })))
            .collect::<Vec<_>>();
        r.push_message_by_uids(&Route::from("onChat"), &Arc::new(json!(1)),
            &receivers, &PushOptions::default()).wait().unwrap();
        let log = tap.log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].uids.len(), 50);
        assert_eq!(log[1].uids.len(), 50);
    }

    #[test]
    fn unresolved_receiver_is_dropped() {
        let tap = Tap::new();
        let r = router(&tap, &[("A", "connector")]);
        r.push_message_by_uids(&Route::from("onChat"), &Arc::new(json!(1)),
            &[recv("1", Some("A")), recv("2", None)],
            &PushOptions::default()).wait().unwrap();
        let log = tap.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].frontend, ServerId::from("A"));
        assert_eq!(log[0].uids, uids(&["1"]));
    }

    #[test]
    fn partial_failure() {
        let tap = Tap::new();
        let r = router(&tap,
            &[("f1", "connector"), ("f2", "connector"), ("f3", "connector")]);
        tap.set_down("f2");
        let err = r.push_message_by_uids(&Route::from("onChat"),
            &Arc::new(json!(1)),
            &[recv("1", Some("f1")), recv("2", Some("f2")),
              recv("3", Some("f3"))],
            &PushOptions::default()).wait().unwrap_err();
        assert!(err.is_partial());
        assert_eq!(err.attempted(), 3);
        assert_eq!(err.failed(),
                   &[(ServerId::from("f2"), TransportError::Closed)][..]);
        let delivered = tap.delivered().into_iter()
            .map(|e| e.frontend).collect::<Vec<_>>();
        assert_eq!(delivered, vec![ServerId::from("f1"), ServerId::from("f3")]);
    }

    #[test]
    fn waits_for_every_frontend() {
        let tap = Tap::new();
        let r = router(&tap, &[("a", "connector")]);
        tap.set_down("a");
        let (tx, rx) = oneshot::channel();
        r.add_frontend(ServerId::from("b"), ServerType::from("connector"),
                       Rc::new(Deferred(RefCell::new(Some(rx)))));
        let mut push = r.push_message_by_uids(&Route::from("onChat"),
            &Arc::new(json!(1)),
            &[recv("1", Some("a")), recv("2", Some("b"))],
            &PushOptions::default());
        // "a" has already failed, but "b" is still in flight
        let state = lazy(|| Ok::<_, ()>(push.poll())).wait().unwrap();
        assert_matches!(state, Ok(Async::NotReady));
        tx.send(()).unwrap();
        let err = push.wait().unwrap_err();
        assert_eq!(err.attempted(), 2);
        assert_eq!(err.failed(),
                   &[(ServerId::from("a"), TransportError::Closed)][..]);
    }

    #[test]
    fn unknown_frontend() {
        let tap = Tap::new();
        let r = router(&tap, &[("f1", "connector")]);
        let err = r.push_message_by_uids(&Route::from("onChat"),
            &Arc::new(json!(1)),
            &[recv("1", Some("f1")), recv("2", Some("gone"))],
            &PushOptions::default()).wait().unwrap_err();
        assert_eq!(err.failed(), &[(ServerId::from("gone"),
            TransportError::UnknownFrontend(ServerId::from("gone")))][..]);
        assert_eq!(tap.log().len(), 1);
    }

    #[test]
    fn empty_push() {
        let r = Router::new();
        r.push_message_by_uids(&Route::from("onChat"), &Arc::new(json!(1)),
            &[], &PushOptions::default()).wait().unwrap();
        r.broadcast(None, &Route::from("onChat"), &Arc::new(json!(1)),
            &PushOptions::default()).wait().unwrap();
    }

    #[test]
    fn broadcast_by_type() {
        let tap = Tap::new();
        let r = router(&tap, &[("c1", "connector"), ("c2", "connector"),
                               ("g1", "gate")]);
        let route = Route::from("onNotice");
        let msg = Arc::new(json!("hi"));
        r.broadcast(Some(&ServerType::from("connector")), &route, &msg,
                    &PushOptions::binded()).wait().unwrap();
        let log = tap.log();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.broadcast && e.opts.binded));
        r.broadcast(None, &route, &msg, &PushOptions::default())
            .wait().unwrap();
        assert_eq!(tap.log().len(), 5);
    }

    #[test]
    fn registry() {
        let tap = Tap::new();
        let r = router(&tap, &[("c2", "connector"), ("c1", "connector"),
                               ("g1", "gate")]);
        assert_eq!(r.frontends_by_type(Some(&ServerType::from("connector"))),
                   vec![ServerId::from("c1"), ServerId::from("c2")]);
        assert_eq!(r.server_types(),
                   vec![ServerType::from("connector"), ServerType::from("gate")]);
        assert!(r.add_frontend(ServerId::from("g1"), ServerType::from("gate"),
                               tap.remote("g1")).is_some());
        assert!(r.remove_frontend(&ServerId::from("g1")));
        assert!(!r.remove_frontend(&ServerId::from("g1")));
        assert!(!r.has_frontend(&ServerId::from("g1")));
        r.replace_frontends(vec![
            (ServerId::from("x1"), ServerType::from("connector"),
             tap.remote("x1")),
        ]);
        assert_eq!(r.frontends_by_type(None), vec![ServerId::from("x1")]);
        assert_eq!(r.len(), 1);
        let shared = r.clone();
        shared.remove_frontend(&ServerId::from("x1"));
        assert_eq!(r.len(), 0);
    }
}
