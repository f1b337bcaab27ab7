use quire::validate::{Structure, Scalar, Numeric};

use crate::intern::ServerType;


/// Entry of the cluster registry
#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Server {
    pub server_type: ServerType,
    /// Frontend servers hold client connections
    pub frontend: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub fn validator<'x>() -> Structure<'x> {
    Structure::new()
    .member("server_type", Scalar::new().min_length(1))
    .member("frontend", Scalar::new().default(false))
    .member("host", Scalar::new().optional())
    .member("port", Numeric::new().min(1).max(65535).optional())
}
