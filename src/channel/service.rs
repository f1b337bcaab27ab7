use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::config::Channels;
use crate::intern::{ChannelName, Route, ServerType};
use crate::metrics::CHANNELS;
use crate::options::PushOptions;
use crate::router::{Router, Receiver, PushFuture};
use super::channel::Channel;
use super::error::ChannelError;


/// Registry of channels of one process
///
/// A destroyed channel (explicitly or by the empty-channel policy) is
/// forgotten on next lookup, so its name can be used again.
pub struct ChannelService {
    config: Arc<Channels>,
    router: Router,
    channels: HashMap<ChannelName, Channel>,
}

impl ChannelService {
    pub fn new(config: &Arc<Channels>, router: &Router) -> ChannelService {
        ChannelService {
            config: config.clone(),
            router: router.clone(),
            channels: HashMap::new(),
        }
    }
    pub fn router(&self) -> &Router {
        &self.router
    }

    fn purge(&mut self, name: &ChannelName) {
        let destroyed = self.channels.get(name)
            .map(|c| c.is_destroyed())
            .unwrap_or(false);
        if destroyed {
            self.channels.remove(name);
            CHANNELS.decr(1);
        }
    }

    /// Creates an empty channel, fails if a live one has the name
    pub fn create_channel(&mut self, name: &ChannelName)
        -> Result<&mut Channel, ChannelError>
    {
        use std::collections::hash_map::Entry::*;
        self.purge(name);
        match self.channels.entry(name.clone()) {
            Occupied(_) => Err(ChannelError::AlreadyExists(name.clone())),
            Vacant(e) => {
                CHANNELS.incr(1);
                debug!("Channel {:?} created", name);
                Ok(e.insert(Channel::new(name.clone(), &self.config)))
            }
        }
    }

    /// Returns the channel, creating it if `create` is set
    pub fn get_channel(&mut self, name: &ChannelName, create: bool)
        -> Option<&mut Channel>
    {
        self.purge(name);
        if !create {
            return self.channels.get_mut(name);
        }
        let config = &self.config;
        Some(self.channels.entry(name.clone()).or_insert_with(|| {
            CHANNELS.incr(1);
            debug!("Channel {:?} created", name);
            Channel::new(name.clone(), config)
        }))
    }

    /// Live channel by name, doesn't create
    pub fn channel(&self, name: &ChannelName) -> Option<&Channel> {
        self.channels.get(name).filter(|c| !c.is_destroyed())
    }

    /// Destroys and forgets the channel, no-op for unknown names
    pub fn destroy_channel(&mut self, name: &ChannelName) {
        if let Some(mut channel) = self.channels.remove(name) {
            CHANNELS.decr(1);
            channel.destroy();
        }
    }

    /// Number of live channels
    pub fn channels_count(&self) -> usize {
        self.channels.values().filter(|c| !c.is_destroyed()).count()
    }

    pub fn push_message(&self, name: &ChannelName, route: &Route,
        msg: &Arc<Json>, opts: &PushOptions)
        -> Result<PushFuture, ChannelError>
    {
        let channel = self.channel(name)
            .ok_or_else(|| ChannelError::NotFound(name.clone()))?;
        channel.push_message(&self.router, route, msg, opts)
    }

    /// Pushes to receivers that aren't necessarily in any channel
    ///
    /// Receivers without a frontend are silently dropped.
    pub fn push_message_by_uids(&self, route: &Route, msg: &Arc<Json>,
        receivers: &[Receiver], opts: &PushOptions)
        -> PushFuture
    {
        self.router.push_message_by_uids(route, msg, receivers, opts)
    }

    /// Pushes to every session on frontends of the type, or of all types
    pub fn broadcast(&self, server_type: Option<&ServerType>, route: &Route,
        msg: &Arc<Json>, opts: &PushOptions)
        -> PushFuture
    {
        self.router.broadcast(server_type, route, msg, opts)
    }
}

impl Drop for ChannelService {
    fn drop(&mut self) {
        CHANNELS.decr(self.channels.len() as i64);
    }
}
