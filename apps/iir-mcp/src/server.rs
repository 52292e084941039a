use std::{net::SocketAddr, sync::Arc};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, Request, StatusCode},
	middleware::{self, Next},
	response::IntoResponse,
};
use color_eyre::Result;
use reqwest::Client;
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use crate::McpAuthState;

pub const TOOL_SEARCH_VECTORIZED_PRODUCT: &str = "search_vectorized_product";
pub const TOOL_RESOLVE_EAN: &str = "resolve_ean";
pub const TOOL_SEARCH_INVOICES_BY_CRITERIA: &str = "search_invoices_by_criteria";

const HEADER_AUTHORIZATION: &str = "Authorization";

#[derive(Clone)]
struct IirMcp {
	api_base: String,
	client: Client,
	tool_router: ToolRouter<Self>,
}
impl IirMcp {
	fn new(api_base: String) -> Self {
		Self { api_base, client: Client::new(), tool_router: Self::tool_router() }
	}

	async fn forward_post(&self, path: &str, body: Value) -> Result<CallToolResult, ErrorData> {
		let url = format!("{}{}", self.api_base, path);
		let response = self.client.post(url).json(&body).send().await.map_err(|err| {
			ErrorData::internal_error(format!("IIR API request failed: {err}"), None)
		})?;

		handle_response(response).await
	}
}

#[rmcp::tool_router]
impl IirMcp {
	#[rmcp::tool(
		name = "search_vectorized_product",
		description = "Search the product catalog by free-text description. Returns semantic and fuzzy candidate lists with scores from 0 to 100, plus whether semantic search ran.",
		input_schema = description_schema()
	)]
	async fn search_vectorized_product(
		&self,
		mut params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		let description = take_required_string(&mut params, "description")?;

		self.forward_post("/v1/products/search", serde_json::json!({ "description": description }))
			.await
	}

	#[rmcp::tool(
		name = "resolve_ean",
		description = "Resolve a product description to its single best EAN code. Fails with not_found when no candidate reaches the confidence threshold.",
		input_schema = description_schema()
	)]
	async fn resolve_ean(&self, mut params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let description = take_required_string(&mut params, "description")?;

		self.forward_post(
			"/v1/products/resolve_ean",
			serde_json::json!({ "description": description }),
		)
		.await
	}

	#[rmcp::tool(
		name = "search_invoices_by_criteria",
		description = "Find invoice lines matching a customer name, region code, EAN code and unit price within an absolute margin. At least one criterion is required.",
		input_schema = invoice_criteria_schema()
	)]
	async fn search_invoices_by_criteria(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		let body = invoice_criteria_body(params)?;

		self.forward_post("/v1/invoices/search", body).await
	}
}

#[rmcp::tool_handler]
impl ServerHandler for IirMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"Invoice item resolver tools. Resolve a returned product to its EAN, then search invoice lines by criteria."
					.to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(bind_addr: &str, api_base: &str, auth_state: McpAuthState) -> Result<()> {
	let bind_addr: SocketAddr = bind_addr.parse()?;
	let api_base = normalize_api_base(api_base);
	let session_manager: Arc<LocalSessionManager> = Default::default();

	tracing::info!(%bind_addr, api_base = %api_base, "MCP server listening.");

	let service = StreamableHttpService::new(
		move || Ok(IirMcp::new(api_base.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);
	let router = Router::new()
		.fallback_service(service)
		.layer(middleware::from_fn_with_state(auth_state, mcp_auth_middleware));
	let listener = TcpListener::bind(bind_addr).await?;

	axum::serve(listener, router).await?;

	Ok(())
}

fn is_authorized(headers: &HeaderMap, auth_state: &McpAuthState) -> bool {
	match auth_state {
		McpAuthState::Off => true,
		McpAuthState::Bearer { token: expected } =>
			read_bearer_token(headers).is_some_and(|token| token == expected),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(HEADER_AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.trim().strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|token| !token.is_empty())
}

/// Turns `service.api_base` or `service.http_bind` into a base URL iir-mcp can reach.
fn normalize_api_base(raw: &str) -> String {
	let raw = raw.trim().trim_end_matches('/');
	let (scheme, authority) = match raw.split_once("://") {
		Some((scheme, authority)) => (scheme, authority),
		None => ("http", raw),
	};
	// A wildcard bind is reached through loopback on the same host.
	let authority = ["0.0.0.0:", "[::]:"]
		.iter()
		.find_map(|wildcard| authority.strip_prefix(wildcard))
		.map(|port| format!("127.0.0.1:{port}"))
		.unwrap_or_else(|| authority.to_string());

	format!("{scheme}://{authority}")
}

/// Builds the iir-api request body, accepting `state` for `region` and `ean` for `ean_code`.
fn invoice_criteria_body(mut params: JsonObject) -> Result<Value, ErrorData> {
	let customer = take_optional_string(&mut params, "customer")?;
	let region = take_aliased_string(&mut params, "region", "state")?;
	let ean_code = take_aliased_string(&mut params, "ean_code", "ean")?;
	let price = take_optional_number(&mut params, "price")?;
	let margin = take_optional_number(&mut params, "margin")?;

	if customer.is_none() && region.is_none() && ean_code.is_none() && price.is_none() {
		return Err(ErrorData::invalid_params(
			"At least one of customer, region, ean_code or price is required.",
			None,
		));
	}

	let mut body = Map::new();

	for (key, value) in [
		("customer", customer.map(Value::from)),
		("region", region.map(Value::from)),
		("ean_code", ean_code.map(Value::from)),
		("price", price.map(Value::from)),
		("margin", margin.map(Value::from)),
	] {
		if let Some(value) = value {
			body.insert(key.to_string(), value);
		}
	}

	Ok(Value::Object(body))
}

fn take_required_string(params: &mut JsonObject, key: &str) -> Result<String, ErrorData> {
	take_optional_string(params, key)?
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} is required."), None))
}

/// Blank strings and nulls count as absent.
fn take_optional_string(params: &mut JsonObject, key: &str) -> Result<Option<String>, ErrorData> {
	match params.remove(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(text)) => {
			let text = text.trim();

			Ok((!text.is_empty()).then(|| text.to_string()))
		},
		Some(_) => Err(ErrorData::invalid_params(format!("{key} must be a string."), None)),
	}
}

fn take_aliased_string(
	params: &mut JsonObject,
	key: &str,
	alias: &str,
) -> Result<Option<String>, ErrorData> {
	let primary = take_optional_string(params, key)?;
	let aliased = take_optional_string(params, alias)?;

	match (primary, aliased) {
		(Some(primary), Some(aliased)) if primary != aliased => Err(ErrorData::invalid_params(
			format!("{key} and {alias} must match when both are given."),
			None,
		)),
		(Some(value), _) | (None, Some(value)) => Ok(Some(value)),
		(None, None) => Ok(None),
	}
}

/// Accepts JSON numbers and numeric strings such as `"139.55"`.
fn take_optional_number(params: &mut JsonObject, key: &str) -> Result<Option<f64>, ErrorData> {
	let invalid = || ErrorData::invalid_params(format!("{key} must be a number."), None);

	match params.remove(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Number(number)) => number.as_f64().map(Some).ok_or_else(invalid),
		Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
		Some(Value::String(text)) => {
			let number = text.trim().replace(',', ".").parse::<f64>().map_err(|_| invalid())?;

			if number.is_finite() { Ok(Some(number)) } else { Err(invalid()) }
		},
		Some(_) => Err(invalid()),
	}
}

fn description_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["description"],
		"properties": {
			"description": { "type": "string", "description": "Free-text product description." }
		}
	}))
}

fn invoice_criteria_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": true,
		"properties": {
			"customer": { "type": ["string", "null"], "description": "Customer name. Typos are tolerated." },
			"region": { "type": ["string", "null"], "description": "Region code, for example RJ." },
			"state": { "type": ["string", "null"], "description": "Alias of region." },
			"ean_code": { "type": ["string", "null"], "description": "Exact EAN code." },
			"ean": { "type": ["string", "null"], "description": "Alias of ean_code." },
			"price": { "type": ["number", "string", "null"], "description": "Unit price." },
			"margin": {
				"type": ["number", "string", "null"],
				"description": "Absolute price tolerance. Defaults to 0.01."
			}
		}
	}))
}

async fn handle_response(response: reqwest::Response) -> Result<CallToolResult, ErrorData> {
	let status = response.status();
	let bytes = response
		.bytes()
		.await
		.map_err(|err| ErrorData::internal_error(format!("IIR API response error: {err}"), None))?;
	let parsed = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| {
		let raw = String::from_utf8_lossy(&bytes).to_string();

		serde_json::json!({ "raw": raw })
	});

	if status.is_success() {
		// Structured content must be an object; invoice search returns a list.
		let parsed = match parsed {
			Value::Array(items) => serde_json::json!({ "candidates": items }),
			other => other,
		};

		Ok(CallToolResult::structured(parsed))
	} else {
		tracing::debug!(%status, "IIR API returned an error.");

		Ok(CallToolResult::structured_error(parsed))
	}
}

async fn mcp_auth_middleware(
	State(auth_state): State<McpAuthState>,
	req: Request<Body>,
	next: Next,
) -> axum::response::Response {
	if !is_authorized(req.headers(), &auth_state) {
		return (StatusCode::UNAUTHORIZED, "A Bearer token is required.").into_response();
	}

	next.run(req).await
}
