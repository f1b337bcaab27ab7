//! Frontend-side registry of client sessions

mod error;
mod event;
mod frontend;
mod service;
mod session;

pub use self::error::SessionError;
pub use self::event::{EventKind, SessionEvent, Listener};
pub use self::frontend::FrontendSession;
pub use self::service::SessionService;
pub use self::session::{Session, Settings};
