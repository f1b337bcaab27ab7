//! Node configuration: session and channel policies, cluster registry
use std::collections::HashMap;
use std::sync::Arc;

use quire::validate::{Structure, Mapping, Scalar};

use crate::intern::{ServerId, ServerType};

mod channels;
mod read;
mod servers;
mod sessions;

pub use self::channels::Channels;
pub use self::read::{Error, read_config, from_string};
pub use self::servers::Server;
pub use self::sessions::Sessions;


#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct ConfigData {
    pub sessions: Arc<Sessions>,
    pub channels: Arc<Channels>,
    pub servers: HashMap<ServerId, Server>,
}

impl ConfigData {
    /// Frontend servers, optionally of a single type, sorted by id
    pub fn frontends(&self, server_type: Option<&ServerType>)
        -> Vec<(&ServerId, &Server)>
    {
        let mut list = self.servers.iter()
            .filter(|&(_, s)| s.frontend)
            .filter(|&(_, s)| {
                server_type.map(|t| s.server_type == *t).unwrap_or(true)
            })
            .collect::<Vec<_>>();
        list.sort_by(|a, b| a.0[..].cmp(&b.0[..]));
        list
    }
}

pub fn config_validator<'a>() -> Structure<'a> {
    Structure::new()
    .member("sessions", sessions::validator())
    .member("channels", channels::validator())
    .member("servers", Mapping::new(Scalar::new(), servers::validator()))
}
