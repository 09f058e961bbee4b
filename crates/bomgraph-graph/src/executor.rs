//! Safety-gated query execution.
//!
//! Every statement is classified before it reaches the runner. Writes are
//! refused without contacting the database, whoever the caller is.

use std::sync::Arc;

use bomgraph_core::{Params, Row};

use crate::classifier::{KeywordClassifier, QueryClassifier};
use crate::client::{GraphError, QueryRunner};

/// Runs read-only queries against an injected [`QueryRunner`].
///
/// Clone is cheap; clones share the runner and classifier.
#[derive(Clone)]
pub struct QueryExecutor {
    runner: Arc<dyn QueryRunner>,
    classifier: Arc<dyn QueryClassifier>,
}

impl QueryExecutor {
    /// Create an executor gated by the default [`KeywordClassifier`].
    pub fn new(runner: Arc<dyn QueryRunner>) -> Self {
        Self {
            runner,
            classifier: Arc::new(KeywordClassifier::new()),
        }
    }

    /// Swap in a different read/write classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn QueryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Execute a read query with bound parameters.
    ///
    /// Rows come back in database order with columns in RETURN order. Write
    /// queries fail with [`GraphError::WriteRejected`]; database failures are
    /// logged with the query text and returned unchanged.
    pub async fn execute(&self, query: &str, params: &Params) -> Result<Vec<Row>, GraphError> {
        tracing::debug!(query, "Executing query");

        if self.classifier.is_write_query(query) {
            tracing::error!(query, "Write query not supported");
            return Err(GraphError::WriteRejected {
                query: query.to_string(),
            });
        }

        match self.runner.run(query, params).await {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "Read query returned rows");
                Ok(rows)
            }
            Err(e) => {
                tracing::error!(error = %e, query, "Database error executing query");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    struct RecordingRunner {
        calls: AtomicUsize,
        rows: Vec<Row>,
        fail_with: Option<String>,
    }

    impl RecordingRunner {
        fn returning(rows: Vec<Row>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                rows,
                fail_with: None,
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                rows: Vec::new(),
                fail_with: Some(message.to_string()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QueryRunner for RecordingRunner {
        async fn run(&self, _query: &str, _params: &Params) -> Result<Vec<Row>, GraphError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(msg) => Err(GraphError::Database(msg.clone())),
                None => Ok(self.rows.clone()),
            }
        }
    }

    struct EchoParams;

    #[async_trait]
    impl QueryRunner for EchoParams {
        async fn run(&self, _query: &str, params: &Params) -> Result<Vec<Row>, GraphError> {
            Ok(vec![params.clone()])
        }
    }

    struct BlockEverything;

    impl QueryClassifier for BlockEverything {
        fn is_write_query(&self, _query: &str) -> bool {
            true
        }
    }

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_write_never_reaches_database() {
        let runner = RecordingRunner::returning(vec![]);
        let executor = QueryExecutor::new(runner.clone());

        for q in [
            "CREATE (n:Item {sku_id: 'X'})",
            "MATCH (n) DETACH DELETE n",
            "MATCH (s:Supplier) set s.tier = 1",
        ] {
            let err = executor.execute(q, &Params::new()).await.unwrap_err();
            assert!(err.is_write_rejected());
            assert!(err.to_string().contains(q));
        }
        assert_eq!(runner.calls(), 0);
    }

    #[tokio::test]
    async fn test_read_rows_pass_through_in_order() {
        let runner = RecordingRunner::returning(vec![
            row(json!({"sku_id": "P2", "type": "Product"})),
            row(json!({"sku_id": "P1", "type": "Product"})),
        ]);
        let executor = QueryExecutor::new(runner.clone());

        let rows = executor
            .execute("MATCH (p:Item) RETURN p.sku_id AS sku_id, p.type AS type", &Params::new())
            .await
            .unwrap();

        assert_eq!(runner.calls(), 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["sku_id"], "P2");
        let columns: Vec<&String> = rows[0].keys().collect();
        assert_eq!(columns, vec!["sku_id", "type"]);
    }

    #[tokio::test]
    async fn test_params_passed_verbatim() {
        let executor = QueryExecutor::new(Arc::new(EchoParams));
        let params = row(json!({"code": "S1", "limit": 5}));

        let rows = executor
            .execute("MATCH (s:Supplier {code: $code}) RETURN s LIMIT $limit", &params)
            .await
            .unwrap();
        assert_eq!(rows, vec![params]);
    }

    #[tokio::test]
    async fn test_database_error_propagates() {
        let runner = RecordingRunner::failing("Invalid input 'RETRUN'");
        let executor = QueryExecutor::new(runner.clone());

        let err = executor.execute("RETRUN 1", &Params::new()).await.unwrap_err();
        assert!(matches!(err, GraphError::Database(ref m) if m.contains("RETRUN")));
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn test_custom_classifier_is_used() {
        let runner = RecordingRunner::returning(vec![]);
        let executor =
            QueryExecutor::new(runner.clone()).with_classifier(Arc::new(BlockEverything));

        let err = executor.execute("RETURN 1", &Params::new()).await.unwrap_err();
        assert!(err.is_write_rejected());
        assert_eq!(runner.calls(), 0);
    }
}
