use std::fmt;
use string_intern::{Symbol, Validator};


pub struct UidValidator;
/// Application-level user id, assigned on bind
pub type Uid = Symbol<UidValidator>;

pub struct ServerIdValidator;
/// Id of a server process in the cluster (frontend or backend)
pub type ServerId = Symbol<ServerIdValidator>;

pub struct ServerTypeValidator;
/// Kind of a server, e.g. `connector` or `area`
pub type ServerType = Symbol<ServerTypeValidator>;

pub struct ChannelNameValidator;
pub type ChannelName = Symbol<ChannelNameValidator>;

pub struct RouteValidator;
/// Route of a pushed message, logically the client-side event name
pub type Route = Symbol<RouteValidator>;

quick_error! {
    #[derive(Debug)]
    pub enum BadIdent {
        Empty {
            display("identifier is empty")
        }
        InvalidChar {
            display("invalid character in identifier")
        }
    }
}

fn valid_ident(val: &str) -> bool {
    val.chars().all(|c| c.is_ascii() &&
        (c.is_alphanumeric() || c == '-' || c == '_'))
}

fn valid_server_id(val: &str) -> bool {
    val.chars().all(|c| c.is_ascii() &&
        (c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ':'))
}

fn valid_route(val: &str) -> bool {
    val.chars().all(|c| c.is_ascii() &&
        (c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ':'))
}

// Uids and channel names come from application code, so only whitespace
// and control characters are rejected
fn valid_opaque(val: &str) -> bool {
    val.chars().all(|c| !c.is_whitespace() && !c.is_control())
}

fn check(val: &str, valid: fn(&str) -> bool) -> Result<(), BadIdent> {
    if val.len() == 0 {
        return Err(BadIdent::Empty);
    }
    if !valid(val) {
        return Err(BadIdent::InvalidChar);
    }
    Ok(())
}

impl Validator for UidValidator {
    type Err = BadIdent;
    fn validate_symbol(val: &str) -> Result<(), Self::Err> {
        check(val, valid_opaque)
    }
    fn display(value: &Symbol<Self>, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "uid{:?}", value.as_ref())
    }
}

impl Validator for ServerIdValidator {
    type Err = BadIdent;
    fn validate_symbol(val: &str) -> Result<(), Self::Err> {
        check(val, valid_server_id)
    }
    fn display(value: &Symbol<Self>, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "server{:?}", value.as_ref())
    }
}

impl Validator for ServerTypeValidator {
    type Err = BadIdent;
    fn validate_symbol(val: &str) -> Result<(), Self::Err> {
        check(val, valid_ident)
    }
    fn display(value: &Symbol<Self>, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "servertype{:?}", value.as_ref())
    }
}

impl Validator for ChannelNameValidator {
    type Err = BadIdent;
    fn validate_symbol(val: &str) -> Result<(), Self::Err> {
        check(val, valid_opaque)
    }
    fn display(value: &Symbol<Self>, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "channel{:?}", value.as_ref())
    }
}

impl Validator for RouteValidator {
    type Err = BadIdent;
    fn validate_symbol(val: &str) -> Result<(), Self::Err> {
        check(val, valid_route)
    }
    fn display(value: &Symbol<Self>, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "route{:?}", value.as_ref())
    }
}
