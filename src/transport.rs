//! Per-connection transport handle held by a session
use std::net::SocketAddr;
use std::sync::Arc;

use futures::sync::mpsc::{unbounded, UnboundedSender, UnboundedReceiver};
use serde_json::Value as Json;

use crate::close_reason::CloseReason;
use crate::error::TransportError;


/// Opaque connection handle supplied when a session is created
///
/// Sends must not block: implementations queue the data for the
/// connection task and only report whether the connection is still there.
pub trait Transport {
    fn send(&self, msg: Arc<Json>) -> Result<(), TransportError>;
    fn send_batch(&self, msgs: Vec<Arc<Json>>) -> Result<(), TransportError> {
        for msg in msgs {
            self.send(msg)?;
        }
        Ok(())
    }
    fn close(&self, reason: &CloseReason) -> Result<(), TransportError>;
    fn remote_addr(&self) -> Option<SocketAddr> {
        None
    }
}

#[derive(Debug, Clone)]
pub enum Outgoing {
    Message(Arc<Json>),
    Batch(Vec<Arc<Json>>),
    Close(CloseReason),
}

pub type Receiver = UnboundedReceiver<Outgoing>;

/// Transport that hands frames over to a connection task
#[derive(Clone)]
pub struct ChannelTransport {
    sender: UnboundedSender<Outgoing>,
    addr: Option<SocketAddr>,
}

impl ChannelTransport {
    pub fn new(addr: Option<SocketAddr>) -> (ChannelTransport, Receiver) {
        let (tx, rx) = unbounded();
        (ChannelTransport {
            sender: tx,
            addr: addr,
        }, rx)
    }
    fn queue(&self, item: Outgoing) -> Result<(), TransportError> {
        self.sender.unbounded_send(item)
        .map_err(|e| {
            debug!("Error sending connection message: {}. \
                usually these means connection has been closed to soon", e);
            TransportError::Closed
        })
    }
}

impl Transport for ChannelTransport {
    fn send(&self, msg: Arc<Json>) -> Result<(), TransportError> {
        self.queue(Outgoing::Message(msg))
    }
    fn send_batch(&self, msgs: Vec<Arc<Json>>) -> Result<(), TransportError> {
        self.queue(Outgoing::Batch(msgs))
    }
    fn close(&self, reason: &CloseReason) -> Result<(), TransportError> {
        self.queue(Outgoing::Close(reason.clone()))
    }
    fn remote_addr(&self) -> Option<SocketAddr> {
        self.addr
    }
}
