//! Wire types for the single-endpoint JSON protocol.
//!
//! Every request is `{"action": <name>, "data": <payload>}`. Every response
//! carries a boolean `success`; failures add a `message`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::member::{LoginMethod, Member};

/// Backend actions understood by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    GuestLogin,
    SystemCheck,
    UpdateMemberField,
    GetMemberData,
    GetAdminMessages,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::GuestLogin => "guestLogin",
            Action::SystemCheck => "systemCheck",
            Action::UpdateMemberField => "updateMemberField",
            Action::GetMemberData => "getMemberData",
            Action::GetAdminMessages => "getAdminMessages",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestEnvelope<'a, P: ?Sized> {
    pub action: &'static str,
    pub data: &'a P,
}

/// Payload for actions that take no data.
#[derive(Debug, Default, Serialize)]
pub struct EmptyPayload {}

#[derive(Debug, Serialize)]
pub struct LoginPayload<'a> {
    pub method: LoginMethod,
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldPayload<'a> {
    pub member_id: &'a str,
    pub field: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MemberDataPayload<'a> {
    pub identifier: &'a str,
    pub method: LoginMethod,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessagesPayload<'a> {
    pub member_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub member: Member,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub health: HealthReport,
}

/// Backend health as reported by `systemCheck`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Backend name/identifier
    pub spreadsheet: String,
    pub rows: u64,
    pub columns: u64,
    pub operational_hours: bool,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberDataResponse {
    pub data: Member,
}

#[derive(Debug, Deserialize)]
pub struct AdminMessagesResponse {
    pub messages: Vec<AdminMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminMessage {
    pub message: String,
    pub timestamp: String,
}

/// Success response with no payload of interest.
#[derive(Debug, Deserialize)]
pub struct Ack {}
