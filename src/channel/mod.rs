//! Named groups of users spanning many frontends
mod channel;
mod error;
mod service;

pub use self::channel::{Channel, Member, State};
pub use self::error::ChannelError;
pub use self::service::ChannelService;
