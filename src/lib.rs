//! Session registry, channels and per-frontend fan-out
//!
//! Frontend processes own client connections (`SessionService`), backend
//! processes keep named groups of users (`ChannelService`) and push to them
//! through a `Router` that issues exactly one send per frontend.
//!
//! Everything here runs on a single reactor thread, so shared state is kept
//! in `Rc<RefCell<..>>` and every fan-out returns a futures 0.1 future that
//! resolves after all per-frontend sends have settled.

#[macro_use] extern crate log;
#[macro_use] extern crate quick_error;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate serde_derive;
#[macro_use] extern crate serde_json;
#[cfg(test)] #[macro_use] extern crate assert_matches;
extern crate futures;
extern crate tokio_core;
extern crate quire;
extern crate serde;
extern crate string_intern;
extern crate libcantal;
extern crate void;

pub mod intern;
pub mod config;
pub mod metrics;
pub mod channel;
pub mod connector;
pub mod remote;
pub mod router;
pub mod session;
pub mod transport;

mod close_reason;
mod error;
mod options;
mod pair;
mod sid;

#[cfg(test)]
mod testing;

pub use crate::close_reason::CloseReason;
pub use crate::error::{TransportError, Failures, PushError, DeliveryError};
pub use crate::options::{PushOptions, SendOptions, SendType};
pub use crate::sid::Sid;
