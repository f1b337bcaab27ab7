use crate::close_reason::CloseReason;
use crate::intern::Uid;
use crate::sid::Sid;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Bind,
    Unbind,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Bind { sid: Sid, uid: Uid },
    Unbind { sid: Sid, uid: Uid },
    /// Fired once, `uid` is the binding the session had when closed
    Closed { sid: Sid, uid: Option<Uid>, reason: CloseReason },
}

/// Listeners run synchronously inside the state transition
pub type Listener = Box<dyn FnMut(&SessionEvent)>;

#[derive(Default)]
pub struct Listeners {
    bind: Vec<Listener>,
    unbind: Vec<Listener>,
    closed: Vec<Listener>,
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match *self {
            SessionEvent::Bind { .. } => EventKind::Bind,
            SessionEvent::Unbind { .. } => EventKind::Unbind,
            SessionEvent::Closed { .. } => EventKind::Closed,
        }
    }
    pub fn sid(&self) -> Sid {
        match *self {
            SessionEvent::Bind { sid, .. } => sid,
            SessionEvent::Unbind { sid, .. } => sid,
            SessionEvent::Closed { sid, .. } => sid,
        }
    }
}

impl Listeners {
    fn slot(&mut self, kind: EventKind) -> &mut Vec<Listener> {
        match kind {
            EventKind::Bind => &mut self.bind,
            EventKind::Unbind => &mut self.unbind,
            EventKind::Closed => &mut self.closed,
        }
    }
    pub fn add(&mut self, kind: EventKind, listener: Listener) {
        self.slot(kind).push(listener);
    }
    pub fn emit(&mut self, event: &SessionEvent) {
        for listener in self.slot(event.kind()).iter_mut() {
            listener(event);
        }
    }
    pub fn count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Bind => self.bind.len(),
            EventKind::Unbind => self.unbind.len(),
            EventKind::Closed => self.closed.len(),
        }
    }
}
