use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use quire::{self, Options, parse_config, parse_string};

use crate::intern::ServerId;
use super::{ConfigData, config_validator};


quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Io(err: io::Error) {
            display("IO error: {}", err)
            from()
        }
        Config(err: quire::ErrorList) {
            display("config error: {}", err)
            from()
        }
        Validation(err: String) {
            display("validation error: {}", err)
            from()
        }
    }
}

macro_rules! err {
    // Shortcut to config post-load validation error
    ($msg:expr, $($a:expr),*) => (
        return Err(format!($msg, $($a),*).into())
    )
}

pub fn read_config<P: AsRef<Path>>(filename: P)
    -> Result<Arc<ConfigData>, Error>
{
    let cfg = parse_config(filename.as_ref(),
        &config_validator(), &Options::default())?;
    postprocess_config(cfg)
}

pub fn from_string(data: &str, name: &str)
    -> Result<Arc<ConfigData>, Error>
{
    let cfg = parse_string(name, data,
        &config_validator(), &Options::default())?;
    postprocess_config(cfg)
}

fn postprocess_config(cfg: ConfigData) -> Result<Arc<ConfigData>, Error> {
    {
        let mut addresses: HashMap<(&str, u16), &ServerId> = HashMap::new();
        for (id, server) in &cfg.servers {
            if server.port.is_some() && server.host.is_none() {
                err!("server {:?} has a port but no host", id)
            }
            if let (Some(host), Some(port)) = (server.host.as_ref(), server.port)
            {
                if let Some(other) = addresses.insert((&host[..], port), id) {
                    err!("servers {:?} and {:?} both listen at {}:{}",
                         other, id, host, port)
                }
            }
        }
    }
    Ok(Arc::new(cfg))
}
