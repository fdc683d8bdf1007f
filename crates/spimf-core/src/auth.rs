//! Login, guest login and system health requests.

use tracing::{info, warn};

use crate::client::protocol::{EmptyPayload, HealthResponse, LoginPayload, LoginResponse};
use crate::client::{Action, BackendClient, HealthReport};
use crate::error::{ClientError, ClientResult};
use crate::member::{LoginMethod, Member};

/// Shared secret gating the health check. Compared client-side only.
pub const SYSTEM_PASSWORD: &str = "SPIMFONWER";

/// Checks login input before anything is sent.
///
/// Returns the trimmed identifier on success.
///
/// # Errors
/// `Validation` if the identifier is blank, or if the method requires a
/// password and none was given.
pub fn validate_login<'a>(
    method: LoginMethod,
    identifier: &'a str,
    password: &str,
) -> ClientResult<&'a str> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(ClientError::validation("Please enter your credentials"));
    }
    if method.requires_password() && password.is_empty() {
        return Err(ClientError::validation("Please enter your password"));
    }
    Ok(identifier)
}

/// Auth operations against the backend.
#[derive(Debug, Clone, Copy)]
pub struct AuthClient<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthClient<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Logs a member in with the given identifier scheme.
    ///
    /// # Errors
    /// `Validation` for bad input (no request is made), otherwise whatever
    /// the backend call reports.
    pub async fn login(
        &self,
        method: LoginMethod,
        identifier: &str,
        password: &str,
    ) -> ClientResult<Member> {
        let identifier = validate_login(method, identifier, password)?;

        let payload = LoginPayload {
            method,
            identifier,
            password,
        };
        let response: LoginResponse = self.backend.call(Action::Login, &payload).await?;
        info!(%method, "member login succeeded");
        Ok(response.member)
    }

    /// Enters guest mode.
    ///
    /// # Errors
    /// Whatever the backend call reports.
    pub async fn login_guest(&self) -> ClientResult<Member> {
        let response: LoginResponse = self
            .backend
            .call(Action::GuestLogin, &EmptyPayload {})
            .await?;
        info!("guest login succeeded");
        Ok(response.member)
    }

    /// Fetches the backend health report.
    ///
    /// # Errors
    /// `Validation` if `password` is not the system password.
    pub async fn check_system_health(&self, password: &str) -> ClientResult<HealthReport> {
        if password.trim() != SYSTEM_PASSWORD {
            return Err(ClientError::validation("Invalid system password"));
        }

        let response: HealthResponse = self
            .backend
            .call(Action::SystemCheck, &EmptyPayload {})
            .await?;
        Ok(response.health)
    }

    /// Fires an unauthenticated `systemCheck` to see if the backend answers.
    ///
    /// Any 2xx reply counts as reachable, even `success: false`.
    ///
    /// # Errors
    /// `Transport` for a non-2xx status or a network failure.
    pub async fn probe(&self) -> ClientResult<()> {
        match self
            .backend
            .ping(Action::SystemCheck, &EmptyPayload {})
            .await
        {
            Ok(_) => {
                info!(endpoint = %self.backend.endpoint(), "API connection successful");
                Ok(())
            }
            Err(err) => {
                warn!(endpoint = %self.backend.endpoint(), error = ?err, "API connection issue");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::ErrorKind;

    fn backend(server: &MockServer) -> BackendClient {
        BackendClient::new(server.uri(), None).unwrap()
    }

    #[test]
    fn test_empty_password_only_fails_for_membership() {
        for method in LoginMethod::all() {
            let result = validate_login(*method, "user-1", "");
            if *method == LoginMethod::Membership {
                assert_eq!(
                    result,
                    Err(ClientError::validation("Please enter your password"))
                );
            } else {
                assert_eq!(result, Ok("user-1"));
            }
        }
    }

    #[test]
    fn test_blank_identifier_fails() {
        assert_eq!(
            validate_login(LoginMethod::Phone, "   ", "pw"),
            Err(ClientError::validation("Please enter your credentials"))
        );
    }

    #[tokio::test]
    async fn test_validation_failure_never_calls_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend(&server);
        let auth = AuthClient::new(&backend);
        let err = auth
            .login(LoginMethod::Membership, "M-001", "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = auth.check_system_health("wrong").await.unwrap_err();
        assert_eq!(err, ClientError::validation("Invalid system password"));
    }

    #[tokio::test]
    async fn test_login_sends_trimmed_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "action": "login",
                "data": {"method": "membership", "identifier": "M-001", "password": "secret"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "member": {"your_name_nama_anda": "Aisyah", "status_account": "Active"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        let member = AuthClient::new(&backend)
            .login(LoginMethod::Membership, "  M-001 ", "secret")
            .await
            .unwrap();
        assert_eq!(member.status(), Some("Active"));
    }

    #[tokio::test]
    async fn test_login_backend_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Phone number not registered"
            })))
            .mount(&server)
            .await;

        let backend = backend(&server);
        let err = AuthClient::new(&backend)
            .login(LoginMethod::Phone, "0123", "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Phone number not registered");
    }

    #[tokio::test]
    async fn test_guest_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"action": "guestLogin", "data": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "member": {"your_name_nama_anda": "Guest", "isGuest": true}
            })))
            .mount(&server)
            .await;

        let backend = backend(&server);
        let member = AuthClient::new(&backend).login_guest().await.unwrap();
        assert!(member.is_guest());
    }

    #[tokio::test]
    async fn test_health_check_with_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"action": "systemCheck", "data": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "health": {
                    "spreadsheet": "Connected",
                    "rows": 42,
                    "columns": 12,
                    "operationalHours": true,
                    "timestamp": "2026-10-19 09:00:00"
                }
            })))
            .mount(&server)
            .await;

        let backend = backend(&server);
        let report = AuthClient::new(&backend)
            .check_system_health(" SPIMFONWER ")
            .await
            .unwrap();
        assert_eq!(report.spreadsheet, "Connected");
        assert_eq!(report.rows, 42);
    }

    #[tokio::test]
    async fn test_probe_reports_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let backend = backend(&server);
        let err = AuthClient::new(&backend).probe().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_probe_accepts_backend_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Unauthorized"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        AuthClient::new(&backend).probe().await.unwrap();
    }
}
