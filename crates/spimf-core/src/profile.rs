//! Member data refresh and admin messages.

use crate::client::protocol::{
    AdminMessagesPayload, AdminMessagesResponse, MemberDataPayload, MemberDataResponse,
};
use crate::client::{Action, AdminMessage, BackendClient};
use crate::error::ClientResult;
use crate::member::{LoginContext, Member};

#[derive(Debug, Clone, Copy)]
pub struct ProfileClient<'a> {
    backend: &'a BackendClient,
}

impl<'a> ProfileClient<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Re-reads the member record using the original login identifier.
    ///
    /// # Errors
    /// Whatever the backend call reports.
    pub async fn fetch_member(&self, login: &LoginContext) -> ClientResult<Member> {
        let payload = MemberDataPayload {
            identifier: &login.identifier,
            method: login.method,
        };
        let response: MemberDataResponse =
            self.backend.call(Action::GetMemberData, &payload).await?;
        Ok(response.data)
    }

    /// Lists messages addressed to `member_id` (the display name).
    ///
    /// # Errors
    /// Whatever the backend call reports.
    pub async fn admin_messages(&self, member_id: &str) -> ClientResult<Vec<AdminMessage>> {
        let payload = AdminMessagesPayload { member_id };
        let response: AdminMessagesResponse =
            self.backend.call(Action::GetAdminMessages, &payload).await?;
        Ok(response.messages)
    }
}
