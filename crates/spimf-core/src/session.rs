//! Session persistence.
//!
//! A session is stored as two independent entries under the session
//! directory: the member snapshot (`member.json`) and the start timestamp
//! (`started_at`, Unix milliseconds). Both must be present and younger than
//! [`SESSION_TTL`] for the session to be restored. An optional third entry
//! (`login.json`) remembers how the member logged in.
//!
//! Files are written with restricted permissions (0600).

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use crate::config::paths;
use crate::member::{LoginContext, Member};

/// Sessions older than this are discarded on restore.
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

const MEMBER_FILE: &str = "member.json";
const STARTED_AT_FILE: &str = "started_at";
const LOGIN_FILE: &str = "login.json";

/// The live authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub member: Member,
    pub is_guest: bool,
    pub established_at: DateTime<Utc>,
    /// How the member logged in; absent for guests
    pub login: Option<LoginContext>,
}

impl Session {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.established_at + ttl()
    }

    /// Time left before expiry, clamped at zero.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expires_at() - now).max(TimeDelta::zero())
    }
}

fn ttl() -> TimeDelta {
    TimeDelta::from_std(SESSION_TTL).unwrap_or(TimeDelta::MAX)
}

/// Owns the in-memory session and its persisted entries.
///
/// All mutation goes through `&mut self`, so there is a single writer.
#[derive(Debug)]
pub struct SessionStore {
    dir: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
        }
    }

    /// Store rooted at `$SPIMF_HOME/session`.
    pub fn open_default() -> Self {
        Self::new(paths::session_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Persists `member` with the current time and makes it the live session.
    ///
    /// # Errors
    /// Returns an error if the entries cannot be written.
    pub fn establish(
        &mut self,
        member: Member,
        is_guest: bool,
        login: Option<LoginContext>,
    ) -> Result<&Session> {
        self.establish_at(member, is_guest, login, Utc::now())
    }

    /// Like [`establish`](Self::establish) with an explicit start time.
    ///
    /// # Errors
    /// Returns an error if the entries cannot be written.
    pub fn establish_at(
        &mut self,
        mut member: Member,
        is_guest: bool,
        login: Option<LoginContext>,
        now: DateTime<Utc>,
    ) -> Result<&Session> {
        member.set_guest(is_guest);
        let login = if is_guest { None } else { login };

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory {}", self.dir.display()))?;
        self.write_member(&member)?;
        write_private(
            &self.dir.join(STARTED_AT_FILE),
            &now.timestamp_millis().to_string(),
        )?;
        match &login {
            Some(ctx) => {
                let contents =
                    serde_json::to_string_pretty(ctx).context("Failed to serialize login")?;
                write_private(&self.dir.join(LOGIN_FILE), &contents)?;
            }
            None => remove_if_exists(&self.dir.join(LOGIN_FILE))?,
        }

        info!(is_guest, "session established");
        Ok(self.current.insert(Session {
            member,
            is_guest,
            established_at: now,
            login,
        }))
    }

    /// Restores the persisted session if it is complete and unexpired.
    ///
    /// Anything else clears the persisted entries.
    ///
    /// # Errors
    /// Returns an error only if clearing stale entries fails.
    pub fn restore(&mut self) -> Result<Option<&Session>> {
        self.restore_at(Utc::now())
    }

    /// Like [`restore`](Self::restore) with an explicit current time.
    ///
    /// # Errors
    /// Returns an error only if clearing stale entries fails.
    pub fn restore_at(&mut self, now: DateTime<Utc>) -> Result<Option<&Session>> {
        match self.read_persisted(now) {
            Some(session) => Ok(Some(self.current.insert(session))),
            None => {
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn read_persisted(&self, now: DateTime<Utc>) -> Option<Session> {
        let member_raw = read_optional(&self.dir.join(MEMBER_FILE))?;
        let started_raw = read_optional(&self.dir.join(STARTED_AT_FILE))?;

        let member: Member = match serde_json::from_str(&member_raw) {
            Ok(member) => member,
            Err(err) => {
                warn!(error = %err, "discarding unreadable member snapshot");
                return None;
            }
        };

        let Some(established_at) = started_raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
        else {
            warn!("discarding unreadable session timestamp");
            return None;
        };

        let age = now - established_at;
        if age < TimeDelta::zero() || age >= ttl() {
            debug!(age_secs = age.num_seconds(), "session expired");
            return None;
        }

        let is_guest = member.is_guest();
        let login = if is_guest {
            None
        } else {
            read_optional(&self.dir.join(LOGIN_FILE))
                .and_then(|raw| serde_json::from_str::<LoginContext>(&raw).ok())
        };

        Some(Session {
            member,
            is_guest,
            established_at,
            login,
        })
    }

    /// Sets `field` on the live member and re-persists the snapshot.
    ///
    /// # Errors
    /// Returns an error if there is no member session or the write fails.
    pub fn update(&mut self, field: &str, value: &str) -> Result<()> {
        if !Member::is_editable_field(field) {
            anyhow::bail!("Field {field} cannot be updated");
        }
        let Some(session) = self.current.as_mut() else {
            anyhow::bail!("No active session");
        };
        if session.is_guest {
            anyhow::bail!("Guest sessions cannot be updated");
        }

        session.member.set(field, value);
        let member = session.member.clone();
        self.write_member(&member)?;
        debug!(field, "session member updated");
        Ok(())
    }

    /// Replaces the live member (e.g. after a refresh), keeping the start time.
    ///
    /// # Errors
    /// Returns an error if there is no member session or the write fails.
    pub fn replace_member(&mut self, mut member: Member) -> Result<()> {
        let Some(session) = self.current.as_mut() else {
            anyhow::bail!("No active session");
        };
        if session.is_guest {
            anyhow::bail!("Guest sessions cannot be updated");
        }

        member.set_guest(false);
        session.member = member.clone();
        self.write_member(&member)
    }

    /// Drops the live session and every persisted entry.
    ///
    /// Returns true if anything was removed. Safe to call repeatedly.
    ///
    /// # Errors
    /// Returns an error if an existing entry cannot be removed.
    pub fn clear(&mut self) -> Result<bool> {
        let mut removed = self.current.take().is_some();
        for name in [MEMBER_FILE, STARTED_AT_FILE, LOGIN_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                remove_if_exists(&path)?;
                removed = true;
            }
        }
        Ok(removed)
    }

    fn write_member(&self, member: &Member) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(member).context("Failed to serialize member")?;
        write_private(&self.dir.join(MEMBER_FILE), &contents)
    }
}

fn read_optional(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read session entry");
            None
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

fn write_private(path: &Path, contents: &str) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::member::{DISPLAY_NAME_FIELD, GUEST_FLAG_FIELD, LoginMethod, STATUS_FIELD};

    fn sample_member() -> Member {
        Member::from_pairs([
            (DISPLAY_NAME_FIELD, "Aisyah"),
            (STATUS_FIELD, "Active"),
            ("phone", "0123456789"),
        ])
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn store() -> (TempDir, SessionStore) {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session"));
        (dir, store)
    }

    #[test]
    fn test_establish_then_restore_roundtrip() {
        let (_dir, mut store) = store();
        let login = LoginContext {
            method: LoginMethod::Phone,
            identifier: "0123456789".to_string(),
        };
        store
            .establish_at(sample_member(), false, Some(login.clone()), t0())
            .unwrap();

        let mut fresh = SessionStore::new(store.dir());
        let restored = fresh.restore_at(t0()).unwrap().unwrap();
        assert_eq!(restored.member, sample_member());
        assert!(!restored.is_guest);
        assert_eq!(restored.established_at, t0());
        assert_eq!(restored.login, Some(login));
    }

    #[test]
    fn test_guest_flag_survives_restore() {
        let (_dir, mut store) = store();
        store
            .establish_at(Member::from_pairs([(DISPLAY_NAME_FIELD, "Guest")]), true, None, t0())
            .unwrap();

        let mut fresh = SessionStore::new(store.dir());
        let restored = fresh.restore_at(t0() + TimeDelta::minutes(5)).unwrap().unwrap();
        assert!(restored.is_guest);
        assert!(restored.login.is_none());
    }

    #[test]
    fn test_restore_just_before_ttl() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();

        let now = t0() + TimeDelta::hours(2) - TimeDelta::milliseconds(1);
        assert!(SessionStore::new(store.dir()).restore_at(now).unwrap().is_some());
    }

    #[test]
    fn test_restore_at_ttl_expires_and_clears() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();

        let mut fresh = SessionStore::new(store.dir());
        assert!(fresh.restore_at(t0() + TimeDelta::hours(2)).unwrap().is_none());
        assert!(!store.dir().join(MEMBER_FILE).exists());
        assert!(!store.dir().join(STARTED_AT_FILE).exists());

        // Stays gone even inside the window afterwards.
        assert!(fresh.restore_at(t0()).unwrap().is_none());
    }

    #[test]
    fn test_restore_missing_timestamp() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();
        fs::remove_file(store.dir().join(STARTED_AT_FILE)).unwrap();

        let mut fresh = SessionStore::new(store.dir());
        assert!(fresh.restore_at(t0()).unwrap().is_none());
        assert!(!store.dir().join(MEMBER_FILE).exists());
    }

    #[test]
    fn test_restore_missing_member() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();
        fs::remove_file(store.dir().join(MEMBER_FILE)).unwrap();

        let mut fresh = SessionStore::new(store.dir());
        assert!(fresh.restore_at(t0()).unwrap().is_none());
        assert!(!store.dir().join(STARTED_AT_FILE).exists());
    }

    #[test]
    fn test_restore_corrupt_entries() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();
        fs::write(store.dir().join(STARTED_AT_FILE), "yesterday").unwrap();
        assert!(SessionStore::new(store.dir()).restore_at(t0()).unwrap().is_none());

        store.establish_at(sample_member(), false, None, t0()).unwrap();
        fs::write(store.dir().join(MEMBER_FILE), "{not json").unwrap();
        assert!(SessionStore::new(store.dir()).restore_at(t0()).unwrap().is_none());
    }

    #[test]
    fn test_restore_rejects_future_timestamp() {
        let (_dir, mut store) = store();
        store
            .establish_at(sample_member(), false, None, t0() + TimeDelta::minutes(10))
            .unwrap();
        assert!(SessionStore::new(store.dir()).restore_at(t0()).unwrap().is_none());
    }

    #[test]
    fn test_restore_without_anything_persisted() {
        let (_dir, mut store) = store();
        assert!(store.restore_at(t0()).unwrap().is_none());
    }

    #[test]
    fn test_clear_then_restore_is_none() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();

        assert!(store.clear().unwrap());
        assert!(store.current().is_none());
        assert!(store.restore_at(t0()).unwrap().is_none());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_update_persists_field() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();
        store.update("phone", "0199999999").unwrap();

        assert_eq!(
            store.current().unwrap().member.get("phone"),
            Some("0199999999")
        );
        let restored = SessionStore::new(store.dir())
            .restore_at(t0())
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(restored.member.get("phone"), Some("0199999999"));
    }

    #[test]
    fn test_update_never_sets_guest_flag() {
        let (_dir, mut store) = store();
        store
            .establish_at(sample_member(), false, None, t0())
            .unwrap();

        assert!(store.update(GUEST_FLAG_FIELD, "true").is_err());
        assert!(!store.current().unwrap().is_guest);

        let mut reopened = SessionStore::new(store.dir());
        let session = reopened
            .restore_at(t0() + TimeDelta::minutes(5))
            .unwrap()
            .unwrap();
        assert!(!session.is_guest);
        assert!(!session.member.is_guest());
    }

    #[test]
    fn test_update_requires_member_session() {
        let (_dir, mut store) = store();
        assert!(store.update("phone", "1").is_err());

        store.establish_at(Member::new(), true, None, t0()).unwrap();
        let err = store.update("phone", "1").unwrap_err();
        assert!(err.to_string().contains("Guest"));
    }

    #[test]
    fn test_replace_member_keeps_start_time() {
        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();

        let refreshed = Member::from_pairs([(DISPLAY_NAME_FIELD, "Aisyah"), (STATUS_FIELD, "Suspended")]);
        store.replace_member(refreshed).unwrap();

        let session = store.current().unwrap();
        assert_eq!(session.member.status(), Some("Suspended"));
        assert_eq!(session.established_at, t0());
    }

    #[test]
    fn test_remaining_time() {
        let session = Session {
            member: sample_member(),
            is_guest: false,
            established_at: t0(),
            login: None,
        };
        assert_eq!(session.remaining_at(t0() + TimeDelta::minutes(30)), TimeDelta::minutes(90));
        assert_eq!(session.remaining_at(t0() + TimeDelta::hours(3)), TimeDelta::zero());
    }

    #[cfg(unix)]
    #[test]
    fn test_entries_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, mut store) = store();
        store.establish_at(sample_member(), false, None, t0()).unwrap();
        let mode = fs::metadata(store.dir().join(MEMBER_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
