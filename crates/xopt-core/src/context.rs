//! Which client the operator is currently working on.
//!
//! The selection is a plain value persisted as JSON between CLI invocations;
//! the lookup against the client list happens on demand.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Client, CoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppContext {
    pub selected_client_id: Option<Uuid>,
}

impl AppContext {
    pub fn select(&mut self, client_id: Uuid) {
        self.selected_client_id = Some(client_id);
    }

    pub fn clear(&mut self) {
        self.selected_client_id = None;
    }

    /// Drop the selection if it points at a client that was just removed.
    pub fn forget_client(&mut self, client_id: Uuid) {
        if self.selected_client_id == Some(client_id) {
            self.selected_client_id = None;
        }
    }

    /// The selected client, if it is still among `clients`.
    #[must_use]
    pub fn selected<'a>(&self, clients: &'a [Client]) -> Option<&'a Client> {
        let id = self.selected_client_id?;
        clients.iter().find(|c| c.id == id)
    }

    /// Load from `path`. A missing file is an empty context.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StateIo` if the file exists but cannot be read, or
    /// `CoreError::StateParse` if it is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CoreError::StateIo {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&content).map_err(CoreError::StateParse)
    }

    /// # Errors
    ///
    /// Returns `CoreError::StateIo` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let body = serde_json::to_string_pretty(self).map_err(CoreError::StateParse)?;
        std::fs::write(path, body).map_err(|e| CoreError::StateIo {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn client(name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            x_handle: None,
            x_user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn temp_state_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("xopt-state-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn selected_resolves_against_client_list() {
        let clients = vec![client("a"), client("b")];
        let mut ctx = AppContext::default();
        assert!(ctx.selected(&clients).is_none());

        ctx.select(clients[1].id);
        assert_eq!(ctx.selected(&clients).map(|c| c.name.as_str()), Some("b"));
    }

    #[test]
    fn stale_selection_resolves_to_none() {
        let clients = vec![client("a")];
        let mut ctx = AppContext::default();
        ctx.select(Uuid::new_v4());
        assert!(ctx.selected(&clients).is_none());
    }

    #[test]
    fn forget_client_only_clears_matching_selection() {
        let kept = Uuid::new_v4();
        let mut ctx = AppContext::default();
        ctx.select(kept);

        ctx.forget_client(Uuid::new_v4());
        assert_eq!(ctx.selected_client_id, Some(kept));

        ctx.forget_client(kept);
        assert_eq!(ctx.selected_client_id, None);
    }

    #[test]
    fn missing_state_file_loads_empty() {
        let ctx = AppContext::load(&temp_state_path()).unwrap();
        assert_eq!(ctx, AppContext::default());
    }

    #[test]
    fn save_then_load_restores_selection() {
        let path = temp_state_path();
        let mut ctx = AppContext::default();
        ctx.select(Uuid::new_v4());
        ctx.save(&path).unwrap();

        let loaded = AppContext::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, ctx);
    }

    #[test]
    fn corrupt_state_file_is_an_error() {
        let path = temp_state_path();
        std::fs::write(&path, "not json").unwrap();
        let result = AppContext::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(CoreError::StateParse(_))));
    }
}
