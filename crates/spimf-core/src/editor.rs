//! Single-field profile updates.
//!
//! The backend identifies members by display name (`memberId`). Two members
//! sharing a display name would collide; the backend contract offers no
//! stable id to use instead.

use tracing::{debug, info};

use crate::client::protocol::{Ack, UpdateFieldPayload};
use crate::client::{Action, BackendClient};
use crate::error::{ClientError, ClientResult};
use crate::member::Member;
use crate::session::Session;

/// Result of a submitted edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Backend accepted the new value; reflect it in the session store
    Saved,
    /// Empty value, nothing was sent
    Unchanged,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldEditor<'a> {
    backend: &'a BackendClient,
}

impl<'a> FieldEditor<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Sends `field = new_value` for the session's member.
    ///
    /// # Errors
    /// `Validation` for guest sessions, a blank field name or a member
    /// without a display name; otherwise whatever the backend call reports.
    pub async fn submit_edit(
        &self,
        session: &Session,
        field: &str,
        new_value: &str,
    ) -> ClientResult<EditOutcome> {
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

        let value = new_value.trim();
        if value.is_empty() {
            debug!(field, "empty edit dropped");
            return Ok(EditOutcome::Unchanged);
        }

        let Some(member_id) = session.member.display_name() else {
            return Err(ClientError::validation(
                "Member record has no display name to identify it",
            ));
        };

        let payload = UpdateFieldPayload {
            member_id,
            field,
            value,
        };
        let _: Ack = self
            .backend
            .call(Action::UpdateMemberField, &payload)
            .await?;

        info!(field, "member field updated");
        Ok(EditOutcome::Saved)
    }
}
