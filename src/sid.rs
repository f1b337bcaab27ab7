use std::fmt;
use std::str::FromStr;
use std::num::ParseIntError;


/// Session id, unique within one frontend process
#[derive(Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[derive(Serialize, Deserialize)]
pub struct Sid(u64);

impl Sid {
    pub fn new() -> Sid {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Sid(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Sid {
    fn from(val: u64) -> Sid {
        Sid(val)
    }
}

impl FromStr for Sid {
    type Err = ParseIntError;

    fn from_str(src: &str) -> Result<Sid, Self::Err> {
        src.parse().map(|x| Sid(x))
    }
}

impl fmt::Debug for Sid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "sid:{}", self.0)
        } else {
            write!(f, "Sid({})", self.0)
        }
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
