use serde_json::Value as Json;


/// Options of a push or broadcast requested by application code
///
/// Defaults: deliver to every session (`binded: false`), no filter
/// parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PushOptions {
    /// Only deliver to sessions that have completed user binding
    ///
    /// Uid-addressed pushes reach bound sessions only anyway, so this
    /// matters for broadcasts.
    #[serde(default)]
    pub binded: bool,
    /// Parameter passed to the broadcast filter installed on a frontend
    #[serde(default)]
    pub filter_param: Option<Json>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendType {
    /// Point-to-point push to the listed sessions
    Push,
    /// Broadcast, the listed sessions are the already filtered audience
    Broadcast,
    /// Reply to a client request, request id is set
    Response,
}

/// Options passed down to a `Connector`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    pub kind: SendType,
    pub user_options: PushOptions,
}

impl PushOptions {
    pub fn binded() -> PushOptions {
        PushOptions {
            binded: true,
            filter_param: None,
        }
    }
    pub fn with_filter(mut self, param: Json) -> PushOptions {
        self.filter_param = Some(param);
        self
    }
}

impl SendOptions {
    pub fn push(user_options: &PushOptions) -> SendOptions {
        SendOptions {
            kind: SendType::Push,
            user_options: user_options.clone(),
        }
    }
    pub fn broadcast(user_options: &PushOptions) -> SendOptions {
        SendOptions {
            kind: SendType::Broadcast,
            user_options: user_options.clone(),
        }
    }
    pub fn response() -> SendOptions {
        SendOptions {
            kind: SendType::Response,
            user_options: PushOptions::default(),
        }
    }
}
