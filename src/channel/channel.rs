use std::collections::{HashMap, HashSet};
use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::config::Channels;
use crate::intern::{ChannelName, Uid, Route, ServerId};
use crate::options::PushOptions;
use crate::pair::PairCollection;
use crate::router::{Router, PushFuture};
use super::error::ChannelError;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Active,
    Destroyed,
}

/// Membership info of one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub uid: Uid,
    /// Frontends the user is reachable through, sorted
    pub frontends: Vec<ServerId>,
}

/// Set of `(uid, frontend)` pairs
///
/// Pairs are indexed both ways: by user (to answer membership queries)
/// and by frontend (to fan out). A pair is present in one index iff it's
/// present in the other.
pub struct Channel {
    name: ChannelName,
    state: State,
    destroy_when_empty: bool,
    members: HashMap<Uid, HashSet<ServerId>>,
    groups: HashMap<ServerId, HashSet<Uid>>,
}

fn sorted<T, I>(items: I) -> Vec<T>
    where I: IntoIterator<Item=T>, T: Deref<Target=str>
{
    let mut items = items.into_iter().collect::<Vec<_>>();
    items.sort_by(|a, b| (**a).cmp(&**b));
    items
}

impl Channel {
    pub fn new(name: ChannelName, config: &Channels) -> Channel {
        Channel {
            name: name,
            state: State::Active,
            destroy_when_empty: config.destroy_when_empty,
            members: HashMap::new(),
            groups: HashMap::new(),
        }
    }
    pub fn name(&self) -> &ChannelName {
        &self.name
    }
    pub fn state(&self) -> State {
        self.state
    }
    pub fn is_destroyed(&self) -> bool {
        self.state == State::Destroyed
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds a member, returns `false` if the pair is already there or the
    /// channel is destroyed
    pub fn add(&mut self, uid: Uid, frontend: ServerId) -> bool {
        if self.is_destroyed() {
            debug!("Add of {:?} to destroyed channel {:?} ignored",
                   uid, self.name);
            return false;
        }
        let added = self.members.insert_pair(&uid, &frontend);
        if added {
            self.groups.insert_pair(&frontend, &uid);
        }
        added
    }

    /// Removes a member, returns `false` if the pair wasn't there
    pub fn leave(&mut self, uid: &Uid, frontend: &ServerId) -> bool {
        if !self.members.remove_pair(uid, frontend) {
            return false;
        }
        self.groups.remove_pair(frontend, uid);
        if self.destroy_when_empty && self.members.is_empty() {
            debug!("Channel {:?} is empty, destroying", self.name);
            self.state = State::Destroyed;
        }
        true
    }

    /// Number of distinct users
    pub fn user_amount(&self) -> usize {
        self.members.len()
    }
    /// All member uids, sorted
    ///
    /// This copies the whole member list, don't use it on hot paths.
    pub fn members(&self) -> Vec<Uid> {
        sorted(self.members.keys().cloned())
    }
    pub fn member(&self, uid: &Uid) -> Option<Member> {
        self.members.get(uid).map(|frontends| Member {
            uid: uid.clone(),
            frontends: sorted(frontends.iter().cloned()),
        })
    }
    pub fn contains(&self, uid: &Uid) -> bool {
        self.members.contains_key(uid)
    }
    /// Frontends having at least one member, sorted
    pub fn frontends(&self) -> Vec<ServerId> {
        sorted(self.groups.keys().cloned())
    }
    /// Members reachable through the frontend, sorted
    pub fn members_on(&self, frontend: &ServerId) -> Vec<Uid> {
        self.groups.get(frontend)
            .map(|uids| sorted(uids.iter().cloned()))
            .unwrap_or_else(Vec::new)
    }

    /// Drops all members, the channel can't be used afterwards
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        debug!("Channel {:?} destroyed", self.name);
        self.members.clear();
        self.groups.clear();
        self.state = State::Destroyed;
    }

    /// Pushes to all members with one send per frontend
    ///
    /// Frontends are addressed in id order, each with its member list.
    pub fn push_message(&self, router: &Router, route: &Route,
        msg: &Arc<Json>, opts: &PushOptions)
        -> Result<PushFuture, ChannelError>
    {
        if self.is_destroyed() {
            return Err(ChannelError::Destroyed(self.name.clone()));
        }
        let groups = self.frontends().into_iter()
            .map(|frontend| {
                let uids = self.members_on(&frontend);
                (frontend, uids)
            })
            .collect();
        Ok(router.push_groups(route, msg, groups, opts))
    }
}
