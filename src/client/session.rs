//! Session admin persistée localement, valable 24 heures.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::error::ClientResult;

pub const ADMIN_SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSession {
    pub admin_authenticated: bool,
    pub admin_email: String,
    pub admin_login_time: DateTime<Utc>,
    pub token: String,
}

impl AdminSession {
    pub fn new(email: impl Into<String>, token: impl Into<String>, login_time: DateTime<Utc>) -> Self {
        Self {
            admin_authenticated: true,
            admin_email: email.into(),
            admin_login_time: login_time,
            token: token.into(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.admin_login_time + Duration::hours(ADMIN_SESSION_HOURS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.admin_authenticated || now >= self.expires_at()
    }

    pub fn save(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Session valide, `None` si absente ; une session expirée est effacée
    pub fn load(path: &Path, now: DateTime<Utc>) -> ClientResult<Option<Self>> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: AdminSession = match serde_json::from_slice(&raw) {
            Ok(session) => session,
            Err(_) => {
                // Fichier illisible : même traitement qu'une session expirée
                Self::clear(path)?;
                return Ok(None);
            }
        };

        if session.is_expired(now) {
            Self::clear(path)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn clear(path: &Path) -> ClientResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
