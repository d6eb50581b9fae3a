use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use color_eyre::Result;
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;

use nook_domain::ttl;
use nook_service::{ForgetRequest, MemoryService, RecallRequest, RememberRequest};

#[derive(Clone)]
struct NookMcp {
	service: Arc<MemoryService>,
	tool_router: ToolRouter<Self>,
}
impl NookMcp {
	fn new(service: Arc<MemoryService>) -> Self {
		Self { service, tool_router: Self::tool_router() }
	}
}

#[rmcp::tool_router]
impl NookMcp {
	#[rmcp::tool(
		name = "memory_remember",
		description = "Persist a fact as a memory with a category, an importance from 1 to 5, and an optional time to live.",
		input_schema = remember_schema()
	)]
	async fn memory_remember(&self, mut params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let req = remember_request(&mut params)?;
		let memory = self.service.remember(req).await.map_err(service_error)?;

		structured(&memory)
	}

	#[rmcp::tool(
		name = "memory_recall",
		description = "Find memories related to a query. The method field reports whether semantic or keyword search produced the results.",
		input_schema = recall_schema()
	)]
	async fn memory_recall(&self, mut params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let req = recall_request(&mut params)?;
		let response = self.service.recall(req).await.map_err(service_error)?;

		structured(&response)
	}

	#[rmcp::tool(
		name = "memory_forget",
		description = "Delete memories by id or by age, importance, category, and text filters. Without any filter nothing is deleted and the matches are only previewed.",
		input_schema = forget_schema()
	)]
	async fn memory_forget(&self, mut params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let req = forget_request(&mut params)?;
		let response = self.service.forget(req).await.map_err(service_error)?;

		structured(&response)
	}
}

#[rmcp::tool_handler]
impl ServerHandler for NookMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"Nook memory tools: remember facts, recall them by query, and forget stale ones."
					.to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(bind_addr: SocketAddr, service: Arc<MemoryService>) -> Result<()> {
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let mcp = StreamableHttpService::new(
		move || Ok(NookMcp::new(service.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);
	let router = Router::new().fallback_service(mcp);
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, "MCP server listening.");

	axum::serve(listener, router).await?;

	Ok(())
}

fn remember_request(params: &mut JsonObject) -> Result<RememberRequest, ErrorData> {
	let ttl = match take_optional_string(params, "ttl")? {
		Some(raw) => Some(ttl::parse_ttl(&raw).ok_or_else(|| {
			ErrorData::invalid_params(
				"ttl must be a positive amount with a unit, such as 30m, 24h, or 7d.",
				None,
			)
		})?),
		None => None,
	};
	let importance = take_optional_integer(params, "importance")?
		.map(|value| {
			i32::try_from(value).map_err(|_| {
				ErrorData::invalid_params("importance is out of range.".to_string(), None)
			})
		})
		.transpose()?;

	Ok(RememberRequest {
		content: take_required_string(params, "content")?,
		title: take_optional_string(params, "title")?,
		category: take_optional_string(params, "category")?,
		importance,
		ttl,
		source: take_optional_string(params, "source")?,
		source_ref: take_optional_string(params, "source_ref")?,
	})
}

fn recall_request(params: &mut JsonObject) -> Result<RecallRequest, ErrorData> {
	let limit = take_optional_integer(params, "limit")?
		.map(|value| {
			u32::try_from(value).map_err(|_| {
				ErrorData::invalid_params("limit must be a non-negative integer.".to_string(), None)
			})
		})
		.transpose()?;

	Ok(RecallRequest {
		query: take_required_string(params, "query")?,
		limit,
		category: take_optional_string(params, "category")?,
		use_semantic: take_optional_bool(params, "use_semantic")?,
	})
}

fn forget_request(params: &mut JsonObject) -> Result<ForgetRequest, ErrorData> {
	Ok(ForgetRequest {
		older_than_days: take_optional_number(params, "older_than_days")?,
		importance_below: take_optional_integer(params, "importance_below")?
			.map(|value| {
				i32::try_from(value).map_err(|_| {
					ErrorData::invalid_params("importance_below is out of range.".to_string(), None)
				})
			})
			.transpose()?,
		category: take_optional_string(params, "category")?,
		query: take_optional_string(params, "query")?,
		id: take_optional_integer(params, "id")?,
		dry_run: take_optional_bool(params, "dry_run")?.unwrap_or(false),
	})
}

fn service_error(err: nook_service::Error) -> ErrorData {
	if err.is_caller_error() {
		ErrorData::invalid_params(err.to_string(), None)
	} else {
		tracing::error!(error = %err, "Memory tool call failed.");

		ErrorData::internal_error(err.to_string(), None)
	}
}

fn structured<T>(value: &T) -> Result<CallToolResult, ErrorData>
where
	T: Serialize,
{
	let value = serde_json::to_value(value).map_err(|err| {
		ErrorData::internal_error(format!("Failed to encode tool result: {err}"), None)
	})?;

	Ok(CallToolResult::structured(value))
}

/// Removes `key`, treating an explicit `null` as absent.
fn take_present(params: &mut JsonObject, key: &str) -> Option<Value> {
	params.remove(key).filter(|value| !value.is_null())
}

fn take_required_string(params: &mut JsonObject, key: &str) -> Result<String, ErrorData> {
	let value = take_present(params, key)
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} is required."), None))?;
	let text = value
		.as_str()
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} must be a string."), None))?;

	if text.trim().is_empty() {
		return Err(ErrorData::invalid_params(format!("{key} must be non-empty."), None));
	}

	Ok(text.to_string())
}

fn take_optional_string(params: &mut JsonObject, key: &str) -> Result<Option<String>, ErrorData> {
	let Some(value) = take_present(params, key) else { return Ok(None) };
	let text = value
		.as_str()
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} must be a string."), None))?
		.trim();

	if text.is_empty() {
		return Err(ErrorData::invalid_params(format!("{key} must be non-empty."), None));
	}

	Ok(Some(text.to_string()))
}

fn take_optional_integer(params: &mut JsonObject, key: &str) -> Result<Option<i64>, ErrorData> {
	let Some(value) = take_present(params, key) else { return Ok(None) };

	value
		.as_i64()
		.map(Some)
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} must be an integer."), None))
}

fn take_optional_number(params: &mut JsonObject, key: &str) -> Result<Option<f64>, ErrorData> {
	let Some(value) = take_present(params, key) else { return Ok(None) };

	value
		.as_f64()
		.map(Some)
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} must be a number."), None))
}

fn take_optional_bool(params: &mut JsonObject, key: &str) -> Result<Option<bool>, ErrorData> {
	let Some(value) = take_present(params, key) else { return Ok(None) };

	value
		.as_bool()
		.map(Some)
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} must be a boolean."), None))
}

fn remember_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["content"],
		"properties": {
			"content": { "type": "string" },
			"title": { "type": ["string", "null"] },
			"category": {
				"type": ["string", "null"],
				"description": "One of user-pref, project, decision, fact, todo. Defaults to fact."
			},
			"importance": {
				"type": ["integer", "null"],
				"description": "1 to 5. Other values fall back to 3."
			},
			"ttl": {
				"type": ["string", "null"],
				"description": "Time to live such as 30m, 24h, or 7d."
			},
			"source": { "type": ["string", "null"] },
			"source_ref": { "type": ["string", "null"] }
		}
	}))
}

fn recall_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["query"],
		"properties": {
			"query": { "type": "string" },
			"limit": { "type": ["integer", "null"], "minimum": 0 },
			"category": { "type": ["string", "null"] },
			"use_semantic": { "type": ["boolean", "null"] }
		}
	}))
}

fn forget_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {
			"older_than_days": { "type": ["number", "null"] },
			"importance_below": { "type": ["integer", "null"] },
			"category": { "type": ["string", "null"] },
			"query": { "type": ["string", "null"] },
			"id": { "type": ["integer", "null"] },
			"dry_run": { "type": ["boolean", "null"] }
		}
	}))
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use rmcp::model::JsonObject;
	use time::Duration;

	use crate::server::{NookMcp, forget_request, recall_request, remember_request};

	fn params(value: serde_json::Value) -> JsonObject {
		value.as_object().cloned().expect("Params must be a JSON object.")
	}

	#[test]
	fn registers_memory_tools() {
		let names = NookMcp::tool_router()
			.list_all()
			.into_iter()
			.map(|tool| tool.name.to_string())
			.collect::<BTreeSet<_>>();
		let expected = ["memory_forget", "memory_recall", "memory_remember"]
			.into_iter()
			.map(str::to_string)
			.collect::<BTreeSet<_>>();

		assert_eq!(names, expected);
	}

	#[test]
	fn remember_params_map_to_request() {
		let mut raw = params(serde_json::json!({
			"content": "  Always use snake_case  ",
			"category": "fact",
			"importance": 4,
			"ttl": "7d",
			"source": null
		}));
		let req = remember_request(&mut raw).expect("Failed to parse params.");

		assert_eq!(req.content, "  Always use snake_case  ");
		assert_eq!(req.category.as_deref(), Some("fact"));
		assert_eq!(req.importance, Some(4));
		assert_eq!(req.ttl, Some(Duration::days(7)));
		assert_eq!(req.source, None);
	}

	#[test]
	fn remember_requires_content_and_valid_ttl() {
		let err = remember_request(&mut params(serde_json::json!({ "title": "t" })))
			.expect_err("expected error");

		assert!(err.message.contains("content is required"), "unexpected error: {err:?}");

		let err = remember_request(&mut params(serde_json::json!({ "content": "x", "ttl": "0m" })))
			.expect_err("expected error");

		assert!(err.message.contains("ttl"), "unexpected error: {err:?}");
	}

	#[test]
	fn recall_params_map_to_request() {
		let mut raw = params(serde_json::json!({
			"query": " snake_case\n",
			"limit": 3,
			"use_semantic": false
		}));
		let req = recall_request(&mut raw).expect("Failed to parse params.");

		assert_eq!(req.query, " snake_case\n");
		assert_eq!(req.limit, Some(3));
		assert_eq!(req.use_semantic, Some(false));

		let err = recall_request(&mut params(serde_json::json!({ "query": "q", "limit": -1 })))
			.expect_err("expected error");

		assert!(err.message.contains("limit"), "unexpected error: {err:?}");
	}

	#[test]
	fn forget_defaults_to_not_dry_run() {
		let req = forget_request(&mut params(serde_json::json!({ "importance_below": 3 })))
			.expect("Failed to parse params.");

		assert_eq!(req.importance_below, Some(3));
		assert!(!req.dry_run);

		let req = forget_request(&mut params(serde_json::json!({
			"older_than_days": 30,
			"id": 12,
			"dry_run": true
		})))
		.expect("Failed to parse params.");

		assert_eq!(req.older_than_days, Some(30.0));
		assert_eq!(req.id, Some(12));
		assert!(req.dry_run);
	}

	#[test]
	fn rejects_mistyped_params() {
		let err = forget_request(&mut params(serde_json::json!({ "dry_run": "yes" })))
			.expect_err("expected error");

		assert!(err.message.contains("dry_run must be a boolean"), "unexpected error: {err:?}");
	}
}
