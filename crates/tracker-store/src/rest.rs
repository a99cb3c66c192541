//! HTTP backend speaking the PostgREST dialect.
//!
//! Every request carries `apikey` and `Authorization: Bearer <token>`.
//! Writes ask for `return=representation` so inserts come back with their
//! store-assigned columns and updates report how many rows they touched.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

use tracker_protocol::wire_types::rpc_path;
use tracker_protocol::{Filter, ReorderRequest, Row, RowSortUpdate, SelectQuery, Table};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::{apply_sequentially, TableStore};

pub struct RestStore {
    client: Client,
    config: StoreConfig,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        info!(url = %config.url, batch_rpc = ?config.reorder_rpc, "rest store configured");
        Ok(RestStore { client, config })
    }

    pub fn from_env() -> Result<Self, StoreError> {
        RestStore::new(StoreConfig::from_env()?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.config.bearer_token())
    }

    /// Send and map non-success statuses onto [`StoreError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %body, "store rejected request");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Forbidden(body)),
            _ => Err(StoreError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl TableStore for RestStore {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let pairs = query.to_query_pairs();
        debug!(%table, ?pairs, "select");
        let response = self
            .send(self.request(Method::GET, &table.path()).query(&pairs))
            .await?;
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        debug!(%table, "insert");
        let response = self
            .send(
                self.request(Method::POST, &table.path())
                    .header("Prefer", "return=representation")
                    .json(&row),
            )
            .await?;
        let mut rows = response.json::<Vec<Row>>().await?;
        if rows.is_empty() {
            return Err(StoreError::EmptyInsert(table));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError> {
        debug!(%table, column = filter.column(), value = filter.value(), "update");
        let response = self
            .send(
                self.request(Method::PATCH, &table.path())
                    .header("Prefer", "return=representation")
                    .query(&[filter.to_query_pair()])
                    .json(&patch),
            )
            .await?;
        Ok(response.json::<Vec<Row>>().await?.len())
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError> {
        debug!(%table, column = filter.column(), value = filter.value(), "delete");
        let response = self
            .send(
                self.request(Method::DELETE, &table.path())
                    .header("Prefer", "return=representation")
                    .query(&[filter.to_query_pair()]),
            )
            .await?;
        Ok(response.json::<Vec<Row>>().await?.len())
    }

    /// One procedure call when `reorder_rpc` is configured, otherwise the
    /// row-by-row fallback.
    async fn apply_sort_orders(
        &self,
        table: Table,
        updates: &[RowSortUpdate],
    ) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        let Some(function) = self.config.reorder_rpc.as_deref() else {
            return apply_sequentially(self, table, updates).await;
        };

        let body = ReorderRequest {
            target_table: table.as_str().to_string(),
            updates: updates.to_vec(),
        };
        debug!(%table, count = updates.len(), function, "batch reorder");
        self.send(self.request(Method::POST, &rpc_path(function)).json(&body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[derive(Debug, Clone)]
    struct Seen {
        method: String,
        path: String,
        body: String,
    }

    type SeenLog = Arc<Mutex<Vec<Seen>>>;

    /// Local HTTP endpoint that answers every request with `status` and
    /// `body` and records what it was sent.
    async fn canned_store(status: u16, body: &'static str) -> (String, SeenLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen: SeenLog = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(answer(socket, status, body, log.clone()));
            }
        });
        (format!("http://{addr}"), seen)
    }

    async fn answer(mut socket: TcpStream, status: u16, body: &'static str, log: SeenLog) {
        let mut buf: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let head_end = loop {
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < head_end + length {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }

            let mut request_line = head.split_whitespace();
            log.lock().unwrap().push(Seen {
                method: request_line.next().unwrap_or_default().to_string(),
                path: request_line.next().unwrap_or_default().to_string(),
                body: String::from_utf8_lossy(&buf[head_end..head_end + length]).to_string(),
            });
            buf.drain(..head_end + length);

            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            );
            if socket.write_all(response.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    fn local(url: String, reorder_rpc: Option<&str>) -> RestStore {
        RestStore::new(StoreConfig {
            url,
            api_key: "anon".into(),
            reorder_rpc: reorder_rpc.map(str::to_string),
            ..StoreConfig::default()
        })
        .unwrap()
    }

    fn swap() -> Vec<RowSortUpdate> {
        vec![
            RowSortUpdate {
                id: "t0".into(),
                sort_order: 1,
            },
            RowSortUpdate {
                id: "t1".into(),
                sort_order: 0,
            },
        ]
    }

    #[tokio::test]
    async fn batch_goes_through_one_rpc_call() {
        let (url, seen) = canned_store(200, "").await;
        let store = local(url, Some("apply_sort_orders"));

        store.apply_sort_orders(Table::Tasks, &swap()).await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].path, "/rest/v1/rpc/apply_sort_orders");
        let body: Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(
            body,
            json!({
                "target_table": "tasks",
                "updates": [
                    {"id": "t0", "sort_order": 1},
                    {"id": "t1", "sort_order": 0}
                ]
            })
        );
    }

    #[tokio::test]
    async fn batch_without_rpc_patches_row_by_row() {
        let (url, seen) = canned_store(200, r#"[{"id": "x"}]"#).await;
        let store = local(url, None);

        store.apply_sort_orders(Table::Tasks, &swap()).await.unwrap();

        let seen = seen.lock().unwrap().clone();
        let calls: Vec<(&str, &str)> = seen
            .iter()
            .map(|s| (s.method.as_str(), s.path.as_str()))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("PATCH", "/rest/v1/tasks?id=eq.t0"),
                ("PATCH", "/rest/v1/tasks?id=eq.t1"),
            ]
        );
        let first: Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(first, json!({"sort_order": 1}));
    }

    #[tokio::test]
    async fn policy_rejection_maps_to_forbidden() {
        let (url, _seen) = canned_store(403, r#"{"message":"permission denied"}"#).await;
        let store = local(url, None);

        let err = store
            .delete(Table::Projects, &Filter::id("p1"))
            .await
            .unwrap_err();
        match err {
            StoreError::Forbidden(body) => assert!(body.contains("permission denied")),
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_failures_keep_their_status() {
        let (url, _seen) = canned_store(503, "busy").await;
        let store = local(url, Some("apply_sort_orders"));

        let err = store.apply_sort_orders(Table::Tasks, &swap()).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, ref body } if body == "busy"));
    }

    fn config() -> StoreConfig {
        StoreConfig {
            url: "https://store.example.org/".into(),
            api_key: "anon".into(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn rejects_incomplete_config() {
        let result = RestStore::new(StoreConfig::default());
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let store = RestStore::new(config()).unwrap();
        assert_eq!(
            store.url(&Table::Projects.path()),
            "https://store.example.org/rest/v1/projects"
        );
    }

    #[test]
    fn requests_carry_key_and_token() {
        let mut cfg = config();
        cfg.access_token = Some("session-jwt".into());
        let store = RestStore::new(cfg).unwrap();

        let request = store
            .request(Method::GET, &Table::Tasks.path())
            .build()
            .unwrap();
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer session-jwt");
    }
}
