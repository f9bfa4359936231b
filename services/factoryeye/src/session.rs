//! Login session and its on-disk persistence

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::FactoryEyeError;

/// What a logged-in user may do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// An account allowed to log in to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub user_id: Option<u32>,
}

/// The state carried across restarts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.role == Role::Admin
    }

    /// Where an incoming visitor should be sent
    pub fn landing_route(&self) -> String {
        if !self.is_authenticated {
            return "/login".to_string();
        }
        match (self.role, self.user_id) {
            (Role::Admin, _) => "/overview".to_string(),
            (Role::User, Some(id)) => format!("/user/{}", id),
            (Role::User, None) => "/user-dashboard".to_string(),
        }
    }

    pub fn require_authenticated(&self) -> crate::Result<()> {
        if self.is_authenticated {
            Ok(())
        } else {
            Err(FactoryEyeError::Unauthorized("Login required".to_string()))
        }
    }

    pub fn require_admin(&self) -> crate::Result<()> {
        self.require_authenticated()?;
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(FactoryEyeError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }
}

/// Holds the current session and writes every change to `path`, if set
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    session: Session,
}

impl SessionStore {
    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            session: Session::default(),
        }
    }

    /// Load the session saved at `path`; a missing file means logged out
    pub fn load(path: &Path) -> crate::Result<Self> {
        let session = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                FactoryEyeError::Config(format!("Failed to read session file {:?}: {}", path, e))
            })?;
            serde_json::from_str(&content)?
        } else {
            tracing::debug!("No session file at {:?}, starting logged out", path);
            Session::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Authenticate against `accounts` and persist the resulting session
    pub fn login(
        &mut self,
        accounts: &[UserAccount],
        username: &str,
        password: &str,
    ) -> crate::Result<&Session> {
        let account = accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .ok_or_else(|| FactoryEyeError::Unauthorized("Invalid credentials".to_string()))?;

        let session = Session {
            is_authenticated: true,
            role: account.role,
            user_id: account.user_id,
            username: Some(account.display_name.clone()),
            theme: self.session.theme,
        };
        self.commit(session)?;
        tracing::info!("User '{}' logged in as {:?}", username, account.role);
        Ok(&self.session)
    }

    /// Forget everything, theme included
    pub fn logout(&mut self) -> crate::Result<()> {
        self.commit(Session::default())?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> crate::Result<()> {
        self.commit(Session {
            theme,
            ..self.session.clone()
        })
    }

    /// Persist `session`, then make it current. A failed write changes nothing.
    fn commit(&mut self, session: Session) -> crate::Result<()> {
        Self::save(self.path.as_deref(), &session)?;
        self.session = session;
        Ok(())
    }

    fn save(path: Option<&Path>, session: &Session) -> crate::Result<()> {
        let Some(path) = path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved session to {:?}", path);
        Ok(())
    }
}
