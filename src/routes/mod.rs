//! API route handlers - maps HTTP endpoints to the attribution engine.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: Basic repo info (GET /api/v1/repository)
//! - `branches`: Branch listing, switching, stash and pull
//! - `frames`: Stack trace → frame references
//! - `offenders`: Stack trace or file/line → offending commits

pub mod branches;
pub mod frames;
pub mod offenders;
pub mod repository;

use std::sync::Arc;

use axum::Router;

use crate::error::{BlameError, Result};
use crate::git::{CommandRunner, GitRepository, SharedSession};
use crate::trace::StackFrameResolver;

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub repo: Arc<GitRepository>,
    pub resolver: Arc<StackFrameResolver>,
}

impl AppState {
    pub fn new(session: SharedSession, repo: GitRepository, resolver: StackFrameResolver) -> Self {
        Self {
            session,
            repo: Arc::new(repo),
            resolver: Arc::new(resolver),
        }
    }

    /// Run `f` with exclusive use of the command session.
    ///
    /// The lock is taken and git runs on the blocking pool, so a long history
    /// dump never stalls the async workers.
    pub async fn with_session<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut (dyn CommandRunner + Send)) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || {
            let mut runner = session
                .lock()
                .map_err(|_| BlameError::Internal("Lock poisoned".to_string()))?;
            f(&mut **runner)
        })
        .await
        .map_err(|e| BlameError::Internal(format!("Session task failed: {}", e)))?
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(branches::routes(state.clone()))
        .merge(frames::routes(state.clone()))
        .merge(offenders::routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::git;

    /// Runner whose every command blocks the calling thread for a while.
    struct SlowRunner {
        delay: Duration,
    }

    impl CommandRunner for SlowRunner {
        fn clear(&mut self) {}

        fn run(&mut self, command: &str) -> Result<Vec<String>> {
            std::thread::sleep(self.delay);
            Ok(vec![command.to_string()])
        }

        fn errors(&self) -> &[String] {
            &[]
        }
    }

    fn state(dir: &tempfile::TempDir, delay: Duration) -> AppState {
        git2::Repository::init(dir.path()).unwrap();
        AppState::new(
            git::share(SlowRunner { delay }),
            GitRepository::open(dir.path()).unwrap(),
            StackFrameResolver::default(),
        )
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_session_work_does_not_block_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir, Duration::from_millis(300));

        let timer_fired = tokio::select! {
            _ = state.with_session(|runner| runner.run("git pull")) => false,
            _ = tokio::time::sleep(Duration::from_millis(10)) => true,
        };

        assert!(timer_fired, "slow git command held the only runtime thread");
    }

    #[tokio::test]
    async fn test_with_session_returns_runner_output() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir, Duration::ZERO);

        let output = state
            .with_session(|runner| runner.run("git stash"))
            .await
            .unwrap();

        assert_eq!(output, vec!["git stash"]);
    }

    #[tokio::test]
    async fn test_with_session_propagates_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir, Duration::ZERO);

        let err = state
            .with_session(|_| Err::<(), _>(BlameError::ExternalCommand("boom".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, BlameError::ExternalCommand(_)));
    }
}
