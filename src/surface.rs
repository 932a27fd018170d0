//! Surfaces that drive the schema core against the remote API.
//!
//! Each surface exclusively owns its draft or graph. Remote calls race the
//! surface's cancellation token; the token is cancelled when the surface is
//! dropped, so nothing is written back after the user has navigated away.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::ConsoleApi;
use crate::draft::{DeleteConfirmation, TableDraft};
use crate::error::{AuthoringError, FetchError, SubmissionError};
use crate::graph::{Connection, SchemaGraph, SchemaGraphEdge};

/// Page-level message shown when the schema cannot be loaded.
pub const SCHEMA_LOAD_FAILED: &str = "Failed to load schema.";

async fn cancellable<T, E>(
    token: &CancellationToken,
    call: impl Future<Output = Result<T, E>>,
    cancelled: E,
) -> Result<T, E> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(cancelled),
        result = call => result,
    }
}

/// The create-table form.
pub struct TableAuthoring<A: ConsoleApi> {
    api: Arc<A>,
    project: String,
    draft: TableDraft,
    tables: Vec<String>,
    cancel: CancellationToken,
}

impl<A: ConsoleApi> TableAuthoring<A> {
    pub fn new(api: Arc<A>, project: impl Into<String>) -> Self {
        Self {
            api,
            project: project.into(),
            draft: TableDraft::new(),
            tables: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn draft(&self) -> &TableDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TableDraft {
        &mut self.draft
    }

    /// Table names as of the last refresh.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Validate and submit the draft. On success the draft is reset and the
    /// table list refreshed; on any failure the draft is left as it was.
    pub async fn submit(&mut self) -> Result<String, AuthoringError> {
        let request = self.draft.build_create_table_request()?;

        cancellable(
            &self.cancel,
            self.api.create_table(&self.project, &request),
            SubmissionError::Cancelled,
        )
        .await?;

        tracing::info!(
            project = %self.project,
            table = %request.table_name,
            columns = request.columns.len(),
            "table created"
        );
        self.draft.reset();
        if let Err(e) = self.refresh_tables().await {
            tracing::warn!(error = %e, "could not refresh table list");
        }
        Ok(format!("Table \"{}\" created successfully!", request.table_name))
    }

    pub async fn refresh_tables(&mut self) -> Result<(), FetchError> {
        self.tables = cancellable(
            &self.cancel,
            self.api.list_tables(&self.project),
            FetchError::Cancelled,
        )
        .await?;
        Ok(())
    }
}

impl<A: ConsoleApi> Drop for TableAuthoring<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The relationship-graph view.
pub struct SchemaView<A: ConsoleApi> {
    api: Arc<A>,
    project: String,
    graph: SchemaGraph,
    error: Option<String>,
    cancel: CancellationToken,
}

impl<A: ConsoleApi> SchemaView<A> {
    pub fn new(api: Arc<A>, project: impl Into<String>) -> Self {
        Self {
            api,
            project: project.into(),
            graph: SchemaGraph::default(),
            error: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Page-level error from the last load, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch and rebuild the graph. A failed load leaves the graph empty
    /// rather than partially populated; a cancelled one changes nothing.
    pub async fn load(&mut self) -> Result<&SchemaGraph, FetchError> {
        let fetched = cancellable(
            &self.cancel,
            self.api.fetch_schema(&self.project),
            FetchError::Cancelled,
        )
        .await;

        let built = match fetched {
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(e) => Err(e),
            Ok(raw) => SchemaGraph::from_schema_description(&raw),
        };

        match built {
            Ok(graph) => {
                self.graph = graph;
                self.error = None;
                Ok(&self.graph)
            }
            Err(e) => {
                tracing::warn!(project = %self.project, error = %e, "schema load failed");
                self.graph = SchemaGraph::default();
                self.error = Some(SCHEMA_LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    pub fn connect(&mut self, connection: Connection) -> &SchemaGraphEdge {
        self.graph.connect(connection)
    }
}

impl<A: ConsoleApi> Drop for SchemaView<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The delete-table dialog.
pub struct TableDeletion<A: ConsoleApi> {
    api: Arc<A>,
    project: String,
    gate: DeleteConfirmation,
    tables: Vec<String>,
    cancel: CancellationToken,
}

impl<A: ConsoleApi> TableDeletion<A> {
    pub fn new(api: Arc<A>, project: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            api,
            project: project.into(),
            gate: DeleteConfirmation::new(table),
            tables: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn type_name(&mut self, typed: impl Into<String>) {
        self.gate.type_name(typed);
    }

    /// Whether the delete action is enabled.
    pub fn can_delete(&self) -> bool {
        self.gate.is_confirmed()
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn delete(&mut self) -> Result<String, AuthoringError> {
        let table = self.gate.confirm()?.to_string();

        cancellable(
            &self.cancel,
            self.api.delete_table(&self.project, &table),
            SubmissionError::Cancelled,
        )
        .await?;
        tracing::info!(project = %self.project, %table, "table deleted");

        match cancellable(
            &self.cancel,
            self.api.list_tables(&self.project),
            FetchError::Cancelled,
        )
        .await
        {
            Ok(tables) => self.tables = tables,
            Err(e) => tracing::warn!(error = %e, "could not refresh table list"),
        }
        Ok("Table deleted successfully.".to_string())
    }
}

impl<A: ConsoleApi> Drop for TableDeletion<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnUpdate;
    use crate::draft::CreateTableRequest;
    use crate::error::ValidationError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        schema: Option<Value>,
        tables: Mutex<Vec<String>>,
        reject: Option<String>,
        hang: bool,
        created: Mutex<Vec<CreateTableRequest>>,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeApi {
        async fn wait(&self) {
            if self.hang {
                std::future::pending::<()>().await;
            }
        }
    }

    #[async_trait]
    impl ConsoleApi for FakeApi {
        async fn fetch_schema(&self, _project: &str) -> Result<Value, FetchError> {
            self.wait().await;
            self.schema
                .clone()
                .ok_or_else(|| FetchError::Transport("connection refused".into()))
        }

        async fn list_tables(&self, _project: &str) -> Result<Vec<String>, FetchError> {
            Ok(self.tables.lock().unwrap().clone())
        }

        async fn create_table(
            &self,
            _project: &str,
            request: &CreateTableRequest,
        ) -> Result<(), SubmissionError> {
            self.wait().await;
            if let Some(message) = &self.reject {
                return Err(SubmissionError::create(Some(message.clone())));
            }
            self.created.lock().unwrap().push(request.clone());
            self.tables.lock().unwrap().push(request.table_name.clone());
            Ok(())
        }

        async fn delete_table(&self, _project: &str, table: &str) -> Result<(), SubmissionError> {
            self.wait().await;
            if self.reject.is_some() {
                return Err(SubmissionError::delete(None));
            }
            self.deleted.lock().unwrap().push(table.to_string());
            self.tables.lock().unwrap().retain(|t| t != table);
            Ok(())
        }
    }

    fn fill(surface: &mut TableAuthoring<FakeApi>) {
        let draft = surface.draft_mut();
        draft.table_name = "users".into();
        draft
            .update_column(0, ColumnUpdate::Name("ID".into()))
            .unwrap();
        draft
            .update_column(0, ColumnUpdate::PrimaryKey(true))
            .unwrap();
        draft.add_column();
    }

    #[tokio::test]
    async fn test_submit_resets_and_refreshes() {
        let api = Arc::new(FakeApi::default());
        let mut surface = TableAuthoring::new(api.clone(), "p1");
        fill(&mut surface);

        let message = surface.submit().await.unwrap();
        assert_eq!(message, "Table \"users\" created successfully!");
        assert_eq!(surface.draft(), &TableDraft::new());
        assert_eq!(surface.tables(), &["users".to_string()]);

        let created = api.created.lock().unwrap();
        assert_eq!(created[0].columns.len(), 1);
        assert_eq!(created[0].columns[0].name, "id");
        assert!(!created[0].columns[0].is_nullable);
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let api = Arc::new(FakeApi::default());
        let mut surface = TableAuthoring::new(api.clone(), "p1");
        let err = surface.submit().await.unwrap_err();
        assert_eq!(err, AuthoringError::Validation(ValidationError::EmptyTableName));
        assert!(api.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_keeps_draft() {
        let api = Arc::new(FakeApi {
            reject: Some("relation \"users\" already exists".into()),
            ..Default::default()
        });
        let mut surface = TableAuthoring::new(api, "p1");
        fill(&mut surface);
        let before = surface.draft().clone();

        let err = surface.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "relation \"users\" already exists");
        assert_eq!(surface.draft(), &before);
    }

    #[tokio::test]
    async fn test_cancelled_submission_keeps_draft() {
        let api = Arc::new(FakeApi {
            hang: true,
            ..Default::default()
        });
        let mut surface = TableAuthoring::new(api.clone(), "p1");
        fill(&mut surface);
        surface.cancellation().cancel();

        let err = surface.submit().await.unwrap_err();
        assert_eq!(err, AuthoringError::Submission(SubmissionError::Cancelled));
        assert_eq!(surface.draft().table_name, "users");
        assert!(api.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schema_view_load() {
        let api = Arc::new(FakeApi {
            schema: Some(json!({
                "nodes": [{ "id": "users", "data": { "label": "users", "schema": [{ "title": "id", "type": "uuid", "key": "PK" }] } }],
                "edges": []
            })),
            ..Default::default()
        });
        let mut view = SchemaView::new(api, "p1");
        assert_eq!(view.load().await.unwrap().nodes.len(), 1);
        assert!(view.error().is_none());

        let edge = view.connect(Connection::new("users", "users").handles("id", "id"));
        assert_eq!(edge.source, "users");
        assert_eq!(view.graph().edges.len(), 1);
    }

    #[tokio::test]
    async fn test_schema_view_failure_clears_graph() {
        let api = Arc::new(FakeApi::default());
        let mut view = SchemaView::new(api, "p1");
        view.connect(Connection::new("a", "b"));

        assert!(matches!(view.load().await, Err(FetchError::Transport(_))));
        assert!(view.graph().is_empty());
        assert_eq!(view.error(), Some(SCHEMA_LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_schema_view_malformed_payload() {
        let api = Arc::new(FakeApi {
            schema: Some(json!("maintenance")),
            ..Default::default()
        });
        let mut view = SchemaView::new(api, "p1");
        assert!(matches!(view.load().await, Err(FetchError::Malformed(_))));
        assert_eq!(view.error(), Some(SCHEMA_LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_cancelled_load_changes_nothing() {
        let api = Arc::new(FakeApi {
            hang: true,
            ..Default::default()
        });
        let mut view = SchemaView::new(api, "p1");
        view.connect(Connection::new("a", "b"));
        view.cancellation().cancel();

        assert_eq!(view.load().await.unwrap_err(), FetchError::Cancelled);
        assert_eq!(view.graph().edges.len(), 1);
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn test_deletion_requires_exact_name() {
        let api = Arc::new(FakeApi {
            tables: Mutex::new(vec!["users".into(), "posts".into()]),
            ..Default::default()
        });
        let mut dialog = TableDeletion::new(api.clone(), "p1", "users");
        assert!(!dialog.can_delete());
        dialog.type_name("user");
        assert_eq!(
            dialog.delete().await.unwrap_err(),
            AuthoringError::Validation(ValidationError::ConfirmationMismatch)
        );
        assert!(api.deleted.lock().unwrap().is_empty());

        dialog.type_name("users");
        assert!(dialog.can_delete());
        assert_eq!(dialog.delete().await.unwrap(), "Table deleted successfully.");
        assert_eq!(dialog.tables(), &["posts".to_string()]);
    }

    #[tokio::test]
    async fn test_deletion_rejected() {
        let api = Arc::new(FakeApi {
            reject: Some(String::new()),
            ..Default::default()
        });
        let mut dialog = TableDeletion::new(api, "p1", "users");
        dialog.type_name("users");
        assert_eq!(dialog.delete().await.unwrap_err().to_string(), "Failed to delete table.");
    }

    #[test]
    fn test_drop_cancels() {
        let api = Arc::new(FakeApi::default());
        let surface = TableAuthoring::new(api, "p1");
        let token = surface.cancellation();
        drop(surface);
        assert!(token.is_cancelled());
    }
}
