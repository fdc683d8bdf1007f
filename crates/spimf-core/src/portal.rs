//! Portal: the context object behind every user action.
//!
//! Owns the backend client, the session store and the open edit prompt.
//! All state changes go through `&mut self`.

use anyhow::Result;
use tracing::info;

use crate::auth::AuthClient;
use crate::client::{AdminMessage, BackendClient, HealthReport};
use crate::config::Config;
use crate::editor::{EditOutcome, FieldEditor};
use crate::error::{ClientError, ClientResult};
use crate::member::{EditState, LoginContext, LoginMethod, Member};
use crate::profile::ProfileClient;
use crate::session::{Session, SessionStore};

#[derive(Debug)]
pub struct Portal {
    backend: BackendClient,
    sessions: SessionStore,
    edit: Option<EditState>,
}

impl Portal {
    pub fn new(backend: BackendClient, sessions: SessionStore) -> Self {
        Self {
            backend,
            sessions,
            edit: None,
        }
    }

    /// Builds a portal from config, using the default session directory.
    ///
    /// # Errors
    /// Returns an error if the backend client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            BackendClient::from_config(config)?,
            SessionStore::open_default(),
        ))
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    pub fn edit_state(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    /// Restores a persisted session. Call once at startup.
    ///
    /// # Errors
    /// Returns an error if stale entries cannot be cleared.
    pub fn restore(&mut self) -> Result<Option<&Session>> {
        self.sessions.restore()
    }

    /// Logs a member in and establishes the session.
    ///
    /// # Errors
    /// A [`ClientError`] from the login, or an IO error persisting the session.
    pub async fn login(
        &mut self,
        method: LoginMethod,
        identifier: &str,
        password: &str,
    ) -> Result<&Session> {
        let member = AuthClient::new(&self.backend)
            .login(method, identifier, password)
            .await?;

        self.edit = None;
        let login = LoginContext {
            method,
            identifier: identifier.trim().to_string(),
        };
        Ok(self.sessions.establish(member, false, Some(login))?)
    }

    /// Enters guest mode and establishes the session.
    ///
    /// # Errors
    /// A [`ClientError`] from the backend, or an IO error persisting the session.
    pub async fn login_guest(&mut self) -> Result<&Session> {
        let member = AuthClient::new(&self.backend).login_guest().await?;

        self.edit = None;
        Ok(self.sessions.establish(member, true, None)?)
    }

    /// Ends the session. Returns true if there was anything to clear.
    ///
    /// # Errors
    /// Returns an error if persisted entries cannot be removed.
    pub fn logout(&mut self) -> Result<bool> {
        self.edit = None;
        let cleared = self.sessions.clear()?;
        if cleared {
            info!("logged out");
        }
        Ok(cleared)
    }

    /// Password-gated health report.
    ///
    /// # Errors
    /// A [`ClientError`] from validation or the backend.
    pub async fn check_system_health(&self, password: &str) -> Result<HealthReport> {
        Ok(AuthClient::new(&self.backend)
            .check_system_health(password)
            .await?)
    }

    /// Connection test against the endpoint.
    ///
    /// # Errors
    /// A [`ClientError`] from the backend.
    pub async fn probe(&self) -> Result<()> {
        Ok(AuthClient::new(&self.backend).probe().await?)
    }

    /// Opens an edit prompt on `field` for the current member.
    ///
    /// # Errors
    /// `Validation` without a member session, for guests, for a blank field
    /// or for an internal key.
    pub fn begin_edit(&mut self, field: &str) -> ClientResult<&EditState> {
        let session = self.require_session()?;
        if session.is_guest {
            return Err(ClientError::validation(
                "Guest sessions cannot edit profile fields",
            ));
        }

        let field = field.trim();
        if field.is_empty() {
            return Err(ClientError::validation("Please choose a field to edit"));
        }
        if !Member::is_editable_field(field) {
            return Err(ClientError::validation(format!(
                "Field {field} cannot be edited"
            )));
        }

        let current_value = session.member.get(field).unwrap_or_default().to_string();
        Ok(self.edit.insert(EditState {
            field: field.to_string(),
            current_value,
        }))
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Submits the open edit prompt with `new_value`.
    ///
    /// An empty value closes the prompt without contacting the backend. On a
    /// failed submit the prompt stays open.
    ///
    /// # Errors
    /// A [`ClientError`] from validation or the backend, or an IO error
    /// persisting the updated member.
    pub async fn save_edit(&mut self, new_value: &str) -> Result<EditOutcome> {
        let Some(edit) = self.edit.clone() else {
            return Err(ClientError::validation("No field is open for editing").into());
        };

        let session = self.require_session()?;
        let outcome = FieldEditor::new(&self.backend)
            .submit_edit(session, &edit.field, new_value)
            .await?;

        if outcome == EditOutcome::Saved {
            self.sessions.update(&edit.field, new_value.trim())?;
        }
        self.edit = None;
        Ok(outcome)
    }

    /// Re-fetches the member record and replaces the snapshot.
    ///
    /// # Errors
    /// `Validation` without a member login; otherwise backend or IO errors.
    pub async fn refresh_member(&mut self) -> Result<&Session> {
        let session = self.require_session()?;
        if session.is_guest {
            return Err(ClientError::validation("Guest sessions have no member data").into());
        }
        let Some(login) = session.login.clone() else {
            return Err(ClientError::validation(
                "Login details are not available; please log in again",
            )
            .into());
        };

        let member = ProfileClient::new(&self.backend)
            .fetch_member(&login)
            .await?;
        self.sessions.replace_member(member)?;
        Ok(self.require_session()?)
    }

    /// Messages addressed to the current member.
    ///
    /// # Errors
    /// `Validation` without a named member session; otherwise backend errors.
    pub async fn admin_messages(&self) -> Result<Vec<AdminMessage>> {
        let session = self.require_session()?;
        if session.is_guest {
            return Err(ClientError::validation("Guest sessions have no messages").into());
        }
        let Some(member_id) = session.member.display_name() else {
            return Err(ClientError::validation(
                "Member record has no display name to identify it",
            )
            .into());
        };

        Ok(ProfileClient::new(&self.backend)
            .admin_messages(member_id)
            .await?)
    }

    fn require_session(&self) -> ClientResult<&Session> {
        self.sessions
            .current()
            .ok_or_else(|| ClientError::validation("Please log in first"))
    }
}
