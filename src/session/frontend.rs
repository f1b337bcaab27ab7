use serde_json::Value as Json;

use crate::intern::{Uid, ServerId};
use crate::sid::Sid;
use super::error::SessionError;
use super::event::{EventKind, SessionEvent};
use super::service::SessionService;
use super::session::Settings;


/// Detached copy of a session that can be handed to handlers or shipped
/// to a backend
///
/// Changes made to the copy are local until `push`/`push_all` writes them
/// back into the live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendSession {
    pub id: Sid,
    pub frontend_id: ServerId,
    pub uid: Option<Uid>,
    pub settings: Settings,
}

impl FrontendSession {
    pub fn set<K: Into<String>>(&mut self, key: K, value: Json) {
        self.settings.insert(key.into(), value);
    }
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.settings.get(key)
    }
    /// Settings for serialization
    pub fn export(&self) -> Settings {
        self.settings.clone()
    }

    pub fn bind(&mut self, uid: Uid, service: &mut SessionService)
        -> Result<(), SessionError>
    {
        service.bind(self.id, uid.clone())?;
        self.uid = Some(uid);
        Ok(())
    }
    pub fn unbind(&mut self, uid: &Uid, service: &mut SessionService)
        -> Result<(), SessionError>
    {
        service.unbind(self.id, uid)?;
        self.uid = None;
        Ok(())
    }
    /// Writes a single setting back into the live session
    pub fn push(&self, key: &str, service: &mut SessionService)
        -> Result<(), SessionError>
    {
        let value = self.settings.get(key).cloned().unwrap_or(Json::Null);
        service.import(self.id, key, value)
    }
    /// Writes all settings back into the live session
    pub fn push_all(&self, service: &mut SessionService)
        -> Result<(), SessionError>
    {
        service.import_all(self.id, self.settings.clone())
    }
    /// Registers a listener on the live session
    pub fn on<F>(&self, kind: EventKind, listener: F,
        service: &mut SessionService)
        -> Result<(), SessionError>
        where F: FnMut(&SessionEvent) + 'static
    {
        service.get_mut(self.id)
            .ok_or(SessionError::NotFound(self.id))?
            .on(kind, listener);
        Ok(())
    }
}
