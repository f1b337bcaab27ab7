use libcantal::{Name, NameVisitor, Value};

pub use libcantal::{Counter, Integer};

pub type List = Vec<(Metric, &'static dyn Value)>;

pub struct Metric(pub &'static str, pub &'static str);

lazy_static! {
    pub static ref SESSIONS: Integer = Integer::new();
    pub static ref BOUND_SESSIONS: Integer = Integer::new();
    pub static ref KICKS: Counter = Counter::new();
    pub static ref CHANNELS: Integer = Integer::new();
    pub static ref PUSHES: Counter = Counter::new();
    pub static ref BROADCASTS: Counter = Counter::new();
    pub static ref FRONTEND_SENDS: Counter = Counter::new();
    pub static ref SEND_FAILURES: Counter = Counter::new();
    pub static ref DROPPED_RECEIVERS: Counter = Counter::new();
}

impl Name for Metric {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "metric" => Some(self.1),
            "group" => Some(self.0),
            _ => None,
        }
    }
    fn visit(&self, s: &mut dyn NameVisitor) {
        s.visit_pair("group", self.0);
        s.visit_pair("metric", self.1);
    }
}

pub fn all() -> List {
    let mut list: List = Vec::new();
    list.push((Metric("sessions", "active"), &*SESSIONS));
    list.push((Metric("sessions", "bound"), &*BOUND_SESSIONS));
    list.push((Metric("sessions", "kicks"), &*KICKS));
    list.push((Metric("channels", "active"), &*CHANNELS));
    list.push((Metric("fanout", "pushes"), &*PUSHES));
    list.push((Metric("fanout", "broadcasts"), &*BROADCASTS));
    list.push((Metric("fanout", "frontend_sends"), &*FRONTEND_SENDS));
    list.push((Metric("fanout", "send_failures"), &*SEND_FAILURES));
    list.push((Metric("fanout", "dropped_receivers"), &*DROPPED_RECEIVERS));
    list
}
