use std::fmt;
use std::error::Error;

use crate::intern::ServerId;
use crate::sid::Sid;


quick_error! {
    /// Failure of a single send, either to one session or to one frontend
    #[derive(Debug, Clone, PartialEq)]
    pub enum TransportError {
        /// Transport (or the link to a frontend) is already closed
        Closed {
            display("transport is closed")
        }
        /// Session is not (or no longer) connected to this frontend
        SessionGone(sid: Sid) {
            display("session {} is not connected", sid)
        }
        /// Frontend id is not registered in the router
        UnknownFrontend(id: ServerId) {
            display("unknown frontend {:?}", id)
        }
        /// Every addressed session on a frontend failed
        Undelivered(failed: usize) {
            display("none of {} sessions received the message", failed)
        }
        /// Remote side dropped the request without replying
        Canceled {
            display("request was canceled by the remote side")
        }
        /// Error reported by the remote side
        Remote(message: String) {
            display("remote error: {}", message)
        }
    }
}

/// Aggregated outcome of a multi-target delivery
///
/// The error is only constructed when at least one target failed. Use
/// `is_partial` to tell apart "some targets got the message" from
/// "nobody got it".
#[derive(Debug, Clone, PartialEq)]
pub struct Failures<K> {
    attempted: usize,
    failed: Vec<(K, TransportError)>,
}

/// Per-frontend failures of a fan-out
pub type PushError = Failures<ServerId>;

/// Per-session failures of a local delivery
pub type DeliveryError = Failures<Sid>;

impl<K> Failures<K> {
    pub fn new(attempted: usize) -> Failures<K> {
        Failures {
            attempted: attempted,
            failed: Vec::new(),
        }
    }
    pub fn add(&mut self, key: K, err: TransportError) {
        self.failed.push((key, err));
    }
    pub fn attempted(&self) -> usize {
        self.attempted
    }
    pub fn failed(&self) -> &[(K, TransportError)] {
        &self.failed
    }
    pub fn keys<'x>(&'x self) -> impl Iterator<Item=&'x K> + 'x {
        self.failed.iter().map(|&(ref k, _)| k)
    }
    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }
    /// Some targets failed but at least one succeeded
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && self.failed.len() < self.attempted
    }
    /// Every attempted target failed
    pub fn is_total(&self) -> bool {
        !self.failed.is_empty() && self.failed.len() >= self.attempted
    }
    /// Converts into `Err(self)` if anything failed
    pub fn into_result(self) -> Result<(), Failures<K>> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<K: fmt::Debug> fmt::Display for Failures<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} of {} deliveries failed", self.failed.len(),
            self.attempted)?;
        let mut sep = ": ";
        for &(ref key, ref err) in &self.failed {
            write!(f, "{}{:?}: {}", sep, key, err)?;
            sep = ", ";
        }
        Ok(())
    }
}

impl<K: fmt::Debug> Error for Failures<K> {}
