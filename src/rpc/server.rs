use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use callnav::present::{self, parse_caller_click};
use callnav::{CallnavError, ClickEvent, GraphLoader, Navigator};

use crate::rpc::protocol::*;

/// Run the JSON-RPC event loop over stdio until stdin closes.
pub async fn run_server<L: GraphLoader + 'static>(nav: Arc<Navigator<L>>) -> Result<(), CallnavError> {
    let stdin = BufReader::new(tokio::io::stdin());
    serve_lines(nav, stdin, tokio::io::stdout()).await?;
    Ok(())
}

/// Event loop over any line-oriented transport. Returns the writer once
/// every response has been flushed.
///
/// Each request runs on its own task, so a click that triggers a slow load
/// does not hold up clicks in projects that are already resident. Responses
/// may therefore arrive out of order; clients match them by id.
pub async fn serve_lines<L, R, W>(nav: Arc<Navigator<L>>, reader: R, writer: W) -> Result<W, CallnavError>
where
    L: GraphLoader + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            debug!(response = %line, "Outgoing JSON-RPC");
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(writer)
    });

    info!("Server ready, waiting for JSON-RPC requests on stdin");

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!(request = %line, "Incoming JSON-RPC");

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Failed to parse JSON-RPC request");
                let err = JsonRpcErrorResponse::new(Value::Null, PARSE_ERROR, format!("Parse error: {}", e));
                let _ = tx.send(to_line(&err));
                continue;
            }
        };

        // Notifications have no id; they get no response
        let Some(id) = request.id else {
            debug!(method = %request.method, "Received notification");
            continue;
        };

        let nav = Arc::clone(&nav);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_request(&nav, &request.method, request.params, id).await;
            let _ = tx.send(response.to_string());
        });
    }

    info!("stdin closed, shutting down");
    drop(tx);
    let writer = writer_task.await.map_err(std::io::Error::other)??;
    Ok(writer)
}

pub(crate) async fn handle_request<L: GraphLoader>(
    nav: &Navigator<L>,
    method: &str,
    params: Option<Value>,
    id: Value,
) -> Value {
    match method {
        "resolve" => {
            let event: ClickEvent = match parse_params(params) {
                Ok(e) => e,
                Err(msg) => return error(id, INVALID_PARAMS, msg),
            };
            match nav.resolve_click(&event).await {
                Ok(res) => {
                    let mut result = match serde_json::to_value(&res) {
                        Ok(v) => v,
                        Err(e) => return error(id, SERVER_ERROR, e.to_string()),
                    };
                    result["text"] = json!(present::format_resolution(&res));
                    success(id, result)
                }
                Err(e) => handler_error(id, &e),
            }
        }
        "openCaller" => {
            let p: OpenCallerParams = match parse_params(params) {
                Ok(p) => p,
                Err(msg) => return error(id, INVALID_PARAMS, msg),
            };
            match parse_caller_click(&p.text, p.row, p.selection) {
                Some(link) => success_of(id, &link),
                None => success(id, Value::Null),
            }
        }
        "info" => {
            let p: InfoParams = match parse_params(params) {
                Ok(p) => p,
                Err(msg) => return error(id, INVALID_PARAMS, msg),
            };
            match nav.graph_for(&p.project).await {
                Ok(graph) => success(id, json!({
                    "project": p.project,
                    "stats": graph.stats(),
                    "residentProjects": nav.cache().resident_projects(),
                })),
                Err(e) => handler_error(id, &e),
            }
        }
        "ping" => success(id, json!({})),
        _ => error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let params = params.ok_or_else(|| "Missing params".to_string())?;
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

fn success(id: Value, result: Value) -> Value {
    json!(JsonRpcResponse::new(id, result))
}

fn success_of<T: Serialize>(id: Value, result: &T) -> Value {
    match serde_json::to_value(result) {
        Ok(v) => success(id, v),
        Err(e) => error(id, SERVER_ERROR, e.to_string()),
    }
}

fn error(id: Value, code: i64, message: String) -> Value {
    json!(JsonRpcErrorResponse::new(id, code, message))
}

/// Application failure. `data.retryable` tells the editor whether clicking
/// again can help (a missing artifact may appear once the report is built).
fn handler_error(id: Value, e: &CallnavError) -> Value {
    json!(JsonRpcErrorResponse::new(id, SERVER_ERROR, e.to_string())
        .with_data(json!({ "retryable": e.is_retryable() })))
}

fn to_line<T: Serialize>(msg: &T) -> String {
    serde_json::to_string(msg).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use callnav::{MemoryLoader, WorkspaceLayout};

    fn make_nav() -> Navigator<MemoryLoader> {
        let loader = MemoryLoader::new().with_artifact("Shop", json!({
            "call_graph": {
                "cart/checkout.js:20:submitOrder": {
                    "referencedAt": [
                        { "file": "ui/button.js", "line": 40, "text": "submitOrder(cart);" }
                    ]
                },
                "ui/button.js:41:submitOrder": {
                    "definedAt": { "cart/checkout.js": { "line": 18 } }
                }
            }
        }));
        Navigator::new(WorkspaceLayout::new("/ws"), loader)
    }

    fn resolve_params(path: &str, line: u32) -> Option<Value> {
        Some(json!({ "path": path, "line": line, "identifier": "submitOrder" }))
    }

    #[tokio::test]
    async fn test_handle_resolve_callers() {
        let nav = make_nav();
        let result = handle_request(&nav, "resolve", resolve_params("/ws/Shop/project/src/cart/checkout.js", 17), json!(1)).await;
        assert_eq!(result["jsonrpc"], "2.0");
        assert_eq!(result["id"], 1);
        assert_eq!(result["result"]["resolution"]["kind"], "callers");
        assert_eq!(result["result"]["matchedLine"], 20);
        let text = result["result"]["text"].as_str().unwrap();
        assert!(text.contains("Found 1 caller in 1 file"));
    }

    #[tokio::test]
    async fn test_handle_resolve_definition() {
        let nav = make_nav();
        let result = handle_request(&nav, "resolve", resolve_params("/ws/Shop/project/src/ui/button.js", 40), json!(2)).await;
        assert_eq!(result["result"]["resolution"]["kind"], "definition");
        assert_eq!(result["result"]["targets"][0]["row"], 18);
        assert_eq!(result["result"]["targets"][0]["endColumn"], 70);
    }

    #[tokio::test]
    async fn test_handle_resolve_load_failure_is_error() {
        let nav = make_nav();
        let result = handle_request(&nav, "resolve", resolve_params("/ws/Billing/project/src/a.js", 1), json!(3)).await;
        assert_eq!(result["error"]["code"], SERVER_ERROR);
        assert!(result["error"]["message"].as_str().unwrap().contains("Billing"));
        assert_eq!(result["error"]["data"]["retryable"], true);
    }

    #[tokio::test]
    async fn test_handle_resolve_missing_params() {
        let nav = make_nav();
        let result = handle_request(&nav, "resolve", None, json!(4)).await;
        assert_eq!(result["error"]["code"], INVALID_PARAMS);
        assert!(result["error"]["message"].as_str().unwrap().contains("Missing params"));
    }

    #[tokio::test]
    async fn test_handle_open_caller() {
        let nav = make_nav();
        let text = "Callers of method f\n\nui/button.js:\n  40: submitOrder(cart);\n\nFound 1 caller in 1 file\n";
        let result = handle_request(&nav, "openCaller", Some(json!({ "text": text, "row": 3, "selection": [6, 17] })), json!(5)).await;
        assert_eq!(result["result"]["path"], "ui/button.js");
        assert_eq!(result["result"]["line"], 40);
        assert_eq!(result["result"]["startColumn"], 0);
        assert_eq!(result["result"]["endColumn"], 11);

        let result = handle_request(&nav, "openCaller", Some(json!({ "text": text, "row": 0 })), json!(6)).await;
        assert!(result["result"].is_null());
    }

    #[tokio::test]
    async fn test_handle_info() {
        let nav = make_nav();
        let result = handle_request(&nav, "info", Some(json!({ "project": "Shop" })), json!(7)).await;
        assert_eq!(result["result"]["stats"]["entries"], 2);
        assert_eq!(result["result"]["residentProjects"][0], "Shop");
    }

    #[tokio::test]
    async fn test_handle_info_rejects_bad_project_name() {
        let nav = make_nav();
        for bad in ["", "../x"] {
            let result = handle_request(&nav, "info", Some(json!({ "project": bad })), json!(8)).await;
            assert_eq!(result["error"]["code"], SERVER_ERROR);
            assert_eq!(result["error"]["data"]["retryable"], false);
        }
        assert_eq!(nav.loader().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_ping_and_unknown() {
        let nav = make_nav();
        let result = handle_request(&nav, "ping", None, json!(42)).await;
        assert!(result["result"].is_object());
        let result = handle_request(&nav, "unknown/method", None, json!(99)).await;
        assert_eq!(result["error"]["code"], METHOD_NOT_FOUND);
        assert!(result["error"]["message"].as_str().unwrap().contains("Method not found"));
    }

    #[tokio::test]
    async fn test_serve_lines_end_to_end() {
        let nav = Arc::new(make_nav());
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"resolve","params":{"path":"/ws/Shop/project/src/cart/checkout.js","line":20,"identifier":"submitOrder"}}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","method":"cancel"}"#, "\n",
            "not json\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"resolve","params":{"path":"/ws/Shop/project/src/ui/button.js","line":41,"identifier":"submitOrder"}}"#, "\n",
        );

        let out = serve_lines(Arc::clone(&nav), input.as_bytes(), Vec::new()).await.unwrap();
        let responses: Vec<Value> = String::from_utf8(out).unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses.len(), 3, "notification must not get a response");
        assert!(responses.iter().any(|r| r["error"]["code"] == PARSE_ERROR));
        assert!(responses.iter().any(|r| r["id"] == 1 && r["result"]["resolution"]["kind"] == "callers"));
        assert!(responses.iter().any(|r| r["id"] == 2 && r["result"]["resolution"]["kind"] == "definition"));
        assert_eq!(nav.loader().fetch_count(), 1);
    }
}
