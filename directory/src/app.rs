//! Application context wiring the services to their adapters.
//!
//! [`EmployeeDirectoryApp`] builds the edit session and the directory
//! service once and hands out references to them. Remote workflows are
//! spawned as detached Tokio tasks; each captures the session epoch before
//! it is spawned so its completion can tell whether the session it was
//! dispatched for is still live.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::DirectorySettings;
use crate::domain::ports::{
    EmployeeDirectory, MirrorError, PersistentMirror, SkillService, ViewportLock,
};
use crate::domain::{
    DirectoryError, DraftStore, EditSessionService, EmployeeDirectoryService, EmployeeDraft,
    EmployeeField, EmployeeFilter, EmployeeId, EmployeeRecord, FieldBinding,
};
use crate::outbound::http::{HttpEmployeeDirectory, HttpSkillService, RestClient, RestClientError};
use crate::outbound::mirror::{ConfiguredMirror, FileMirror, InMemoryMirror};
use crate::outbound::viewport::TracingViewportLock;

/// Failures while building an application from configuration.
#[derive(Debug, Error)]
pub enum AppBuildError {
    /// The configured base URL does not parse.
    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] RestClientError),
    /// The mirror directory is not valid UTF-8.
    #[error("mirror directory {path} is not valid UTF-8")]
    MirrorPath {
        /// Lossy rendering of the rejected path.
        path: String,
    },
    /// The mirror directory could not be opened.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

/// Application assembled from the HTTP adapters and a configured mirror.
pub type HttpDirectoryApp = EmployeeDirectoryApp<
    HttpEmployeeDirectory,
    HttpSkillService,
    ConfiguredMirror,
    TracingViewportLock,
>;

/// Owns the edit session and the directory service for one client.
pub struct EmployeeDirectoryApp<D, S, M, V> {
    session: Arc<EditSessionService<M, V>>,
    directory: Arc<EmployeeDirectoryService<D, S>>,
}

impl<D, S, M, V> EmployeeDirectoryApp<D, S, M, V>
where
    D: EmployeeDirectory + 'static,
    S: SkillService + 'static,
    M: PersistentMirror + 'static,
    V: ViewportLock + 'static,
{
    /// Wire the services. The draft's pending update is restored from the
    /// mirror so an interrupted edit survives a restart.
    pub fn new(directory: Arc<D>, skills: Arc<S>, mirror: Arc<M>, viewport: Arc<V>) -> Self {
        let draft = Arc::new(DraftStore::new(EmployeeDraft::restore_from(mirror.as_ref())));
        Self {
            session: Arc::new(EditSessionService::new(mirror, viewport)),
            directory: Arc::new(EmployeeDirectoryService::new(directory, skills, draft)),
        }
    }

    /// The edit session.
    pub fn session(&self) -> &EditSessionService<M, V> {
        &self.session
    }

    /// The directory service.
    pub fn directory(&self) -> &EmployeeDirectoryService<D, S> {
        &self.directory
    }

    /// The draft shared by the form and the workflows.
    pub fn draft(&self) -> &DraftStore {
        self.directory.draft()
    }

    /// Binding for one form field.
    pub fn field(&self, field: EmployeeField) -> FieldBinding<'_, M, V> {
        FieldBinding::new(field, &self.session, self.directory.draft())
    }

    /// Reload the whole employee list in the background.
    pub fn spawn_fetch_employees(&self) -> JoinHandle<Result<usize, DirectoryError>> {
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move { directory.fetch_employees().await })
    }

    /// Search employees in the background.
    pub fn spawn_search_employees(
        &self,
        term: impl Into<String>,
    ) -> JoinHandle<Result<usize, DirectoryError>> {
        let directory = Arc::clone(&self.directory);
        let term = term.into();
        tokio::spawn(async move { directory.search_employees(&term).await })
    }

    /// Filter employees in the background.
    pub fn spawn_filter_employees(
        &self,
        filter: EmployeeFilter,
    ) -> JoinHandle<Result<usize, DirectoryError>> {
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move { directory.filter_employees(&filter).await })
    }

    /// Reload the skill catalogue in the background.
    pub fn spawn_fetch_skills(&self) -> JoinHandle<Result<usize, DirectoryError>> {
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move { directory.fetch_skills().await })
    }

    /// Submit the create draft in the background.
    pub fn spawn_create_employee(&self) -> JoinHandle<Result<EmployeeRecord, DirectoryError>> {
        let (session, directory, epoch) = self.dispatch();
        tokio::spawn(async move { directory.create_employee(&session, epoch).await })
    }

    /// Submit an edited employee in the background.
    pub fn spawn_update_employee(
        &self,
        record: EmployeeRecord,
    ) -> JoinHandle<Result<EmployeeRecord, DirectoryError>> {
        let (session, directory, epoch) = self.dispatch();
        tokio::spawn(async move { directory.update_employee(&session, epoch, &record).await })
    }

    /// Delete an employee in the background.
    pub fn spawn_delete_employee(&self, id: EmployeeId) -> JoinHandle<Result<(), DirectoryError>> {
        let (session, directory, epoch) = self.dispatch();
        tokio::spawn(async move { directory.delete_employee(&session, epoch, &id).await })
    }

    /// Check an e-mail address in the background.
    pub fn spawn_check_email(
        &self,
        email: impl Into<String>,
    ) -> JoinHandle<Result<Option<bool>, DirectoryError>> {
        let (session, directory, epoch) = self.dispatch();
        let email = email.into();
        tokio::spawn(async move { directory.check_email_exists(&session, epoch, &email).await })
    }

    fn dispatch(
        &self,
    ) -> (
        Arc<EditSessionService<M, V>>,
        Arc<EmployeeDirectoryService<D, S>>,
        u64,
    ) {
        (
            Arc::clone(&self.session),
            Arc::clone(&self.directory),
            self.session.epoch(),
        )
    }
}

impl HttpDirectoryApp {
    /// Build the HTTP-backed application described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`AppBuildError`] when the base URL, HTTP client or mirror
    /// directory cannot be set up.
    pub fn from_settings(settings: &DirectorySettings) -> Result<Self, AppBuildError> {
        let client = RestClient::new(settings.api_base_url()?, settings.request_timeout())?;
        let mirror = match settings.mirror_dir() {
            Some(path) => {
                let utf8 = Utf8PathBuf::from_path_buf(path.clone()).map_err(|rejected| {
                    AppBuildError::MirrorPath {
                        path: rejected.to_string_lossy().into_owned(),
                    }
                })?;
                ConfiguredMirror::File(FileMirror::open(&utf8)?)
            }
            None => ConfiguredMirror::Memory(InMemoryMirror::new()),
        };
        Ok(Self::new(
            Arc::new(HttpEmployeeDirectory::new(client.clone())),
            Arc::new(HttpSkillService::new(client)),
            Arc::new(mirror),
            Arc::new(TracingViewportLock::new()),
        ))
    }
}
