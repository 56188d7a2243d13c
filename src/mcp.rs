use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{self, Error},
    normalize::NormalizedTitle,
    rank::DEFAULT_RANK_LIMIT,
    tools::{self, PageTools},
};

#[derive(Clone)]
pub struct SpacefindMcpServer {
    tools: Arc<PageTools>,
    tool_router: ToolRouter<Self>,
}

impl SpacefindMcpServer {
    fn new(tools: Arc<PageTools>) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Run a store call off the async workers; the HTTP client blocks.
    async fn run_blocking<T, F>(
        &self,
        call: F,
    ) -> Result<error::Result<T>, rmcp::ErrorData>
    where
        T: Send + 'static,
        F: FnOnce(&PageTools) -> error::Result<T> + Send + 'static,
    {
        let tools = Arc::clone(&self.tools);
        tokio::task::spawn_blocking(move || call(&tools))
            .await
            .map_err(|e| mcp_error("tool task failed", e))
    }
}

#[tool_router(router = tool_router)]
impl SpacefindMcpServer {
    #[tool(
        name = "page_get",
        description = "Get a page's content by space name and a loosely typed title. Handles typos, accents and different word orders."
    )]
    pub async fn page_get(
        &self,
        params: Parameters<PageParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let PageParams { space, title } = params.0;
        let outcome = self
            .run_blocking(move |tools| tools.page_content(&space, &title))
            .await?;
        tool_result(outcome, tools::format_page)
    }

    #[tool(
        name = "page_get_by_slug",
        description = "Get a page's content by its URL slug (e.g. q3+planning+notes) or title."
    )]
    pub async fn page_get_by_slug(
        &self,
        params: Parameters<SlugParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let SlugParams { space, slug } = params.0;
        let outcome = self
            .run_blocking(move |tools| tools.page_by_slug(&space, &slug))
            .await?;
        tool_result(outcome, tools::format_page)
    }

    #[tool(
        name = "page_find",
        description = "Find the pages in a space that best match a partial or misspelled title, best first."
    )]
    pub async fn page_find(
        &self,
        params: Parameters<FindParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let FindParams {
            space,
            query,
            limit,
        } = params.0;
        let limit = limit.unwrap_or(DEFAULT_RANK_LIMIT);
        let summary_query = query.clone();
        let outcome = self
            .run_blocking(move |tools| tools.find_pages(&space, &query, limit))
            .await?;
        tool_result(outcome, |matches| {
            tools::format_matches(matches, &summary_query)
        })
    }

    #[tool(
        name = "space_key",
        description = "Look up the key of a space from its name."
    )]
    pub async fn space_key(
        &self,
        params: Parameters<SpaceParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let SpaceParams { space } = params.0;
        let name = space.clone();
        let outcome = self
            .run_blocking(move |tools| tools.space_key(&space))
            .await?
            .map(|key| SpaceKeyResponse { name, key });
        tool_result(outcome, |found| {
            format!("Space '{}' has key {}", found.name, found.key)
        })
    }

    #[tool(name = "space_list", description = "List every visible space.")]
    pub async fn space_list(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        let outcome = self.run_blocking(|tools| tools.spaces()).await?;
        tool_result(outcome, |spaces| tools::format_spaces(spaces))
    }

    #[tool(
        name = "space_pages",
        description = "List every page title in a space."
    )]
    pub async fn space_pages(
        &self,
        params: Parameters<SpaceParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let SpaceParams { space } = params.0;
        let name = space.clone();
        let outcome = self
            .run_blocking(move |tools| tools.pages(&space))
            .await?;
        tool_result(outcome, |pages| tools::format_pages(pages, &name))
    }

    #[tool(
        name = "page_create",
        description = "Create a page in a space. The body is storage-format HTML."
    )]
    pub async fn page_create(
        &self,
        params: Parameters<CreateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let CreateParams {
            space,
            title,
            body,
            parent_id,
        } = params.0;
        let outcome = self
            .run_blocking(move |tools| {
                tools.create_page(&space, &title, &body, parent_id.as_deref())
            })
            .await?;
        tool_result(outcome, |link| tools::format_link(link, "created"))
    }

    #[tool(
        name = "page_update",
        description = "Replace a page's title and body. The body is storage-format HTML."
    )]
    pub async fn page_update(
        &self,
        params: Parameters<UpdateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let UpdateParams {
            page_id,
            title,
            body,
        } = params.0;
        let outcome = self
            .run_blocking(move |tools| {
                tools.update_page(&page_id, &title, &body)
            })
            .await?;
        tool_result(outcome, |link| tools::format_link(link, "updated"))
    }

    #[tool(
        name = "title_normalize",
        description = "Show the URL slug and normalized key a title reduces to."
    )]
    pub async fn title_normalize(
        &self,
        params: Parameters<NormalizeParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let title = params.0.title;
        let normalized = NormalizedTitle::new(&title);
        let response = NormalizeResponse {
            slug: normalized.slug,
            norm_key: normalized.norm_key,
            title,
        };
        tool_result(Ok(response), |r| {
            format!("slug: {}\nkey: {}", r.slug, r.norm_key)
        })
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SpacefindMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation::new("spacefind", env!("CARGO_PKG_VERSION"))
            .with_title("spacefind MCP");
        info.instructions = Some(
            "Use page_get to read a page when you only roughly know its title, and page_find to list close matches. Spaces may be given by name or key."
                .to_string(),
        );
        info
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Space name or key.
    pub space: String,
    /// Page title, typos allowed.
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlugParams {
    /// Space name or key.
    pub space: String,
    /// URL slug or title of the page.
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindParams {
    /// Space name or key.
    pub space: String,
    /// Partial or approximate title.
    pub query: String,
    /// Maximum number of matches (default: 5).
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpaceParams {
    /// Space name or key.
    pub space: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParams {
    /// Space name or key.
    pub space: String,
    pub title: String,
    /// Storage-format HTML body.
    pub body: String,
    /// Id of the parent page, if any.
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub page_id: String,
    pub title: String,
    /// Storage-format HTML body.
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeParams {
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpaceKeyResponse {
    name: String,
    key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizeResponse {
    title: String,
    slug: String,
    norm_key: String,
}

/// Text plus structured content on success. A missing space or page is a
/// tool-level error the model can read; anything else fails the call.
fn tool_result<T: Serialize>(
    outcome: error::Result<T>,
    summarize: impl FnOnce(&T) -> String,
) -> Result<CallToolResult, rmcp::ErrorData> {
    match outcome {
        Ok(value) => {
            let summary = summarize(&value);
            let structured = serde_json::to_value(&value)
                .map_err(|e| mcp_error("failed to serialize result", e))?;
            let mut result = CallToolResult::success(vec![Content::text(summary)]);
            result.structured_content = Some(structured);
            Ok(result)
        }
        Err(e @ Error::NotFound { .. }) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        Err(e) => Err(mcp_error("wiki request failed", e)),
    }
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(tools: PageTools) -> error::Result<()> {
    // Held outside the runtime so the blocking HTTP client is dropped there.
    let tools = Arc::new(tools);
    let server = SpacefindMcpServer::new(Arc::clone(&tools));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    let served = runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            Error::Config(format!("MCP server initialization failed: {e}"))
        })?;
        running
            .waiting()
            .await
            .map_err(|e| Error::Config(format!("MCP server error: {e}")))?;
        Ok(())
    });

    drop(runtime);
    drop(tools);
    served
}
