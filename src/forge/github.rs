//! forge::github
//!
//! GitHub forge implementation using REST and GraphQL APIs.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. It uses:
//! - GraphQL for paged ref listing (`repository.refs` with a cursor)
//! - REST for the git refs endpoints (`matching-refs`, create, update)
//!
//! Annotated tags are peeled in the GraphQL query, so listed refs always
//! carry the commit they point to.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not retry; every error is returned to the caller
//!
//! # Example
//!
//! ```ignore
//! use tagtrack::core::types::Repository;
//! use tagtrack::forge::github::GitHubForge;
//!
//! let forge = GitHubForge::new("ghp_xxx", Repository::new("octocat", "hello-world"));
//! let refs = forge.matching_refs("tags/v1").await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{Forge, ForgeError, RefPage, RefPageRequest, RemoteRef};
use crate::core::types::{Oid, RefName, RefRecord, Repository};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "tagtrack";

/// Paged ref listing. Annotated tags are peeled to their commit.
const REFS_QUERY: &str = r#"query($owner: String!, $repo: String!, $prefix: String!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $repo) {
    refs(refPrefix: $prefix, first: $first, after: $after) {
      pageInfo { endCursor hasNextPage }
      nodes {
        name
        target {
          oid
          ... on Tag { target { oid } }
        }
      }
    }
  }
}"#;

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Installation or personal access token
    token: String,
    repository: Repository,
    /// REST API base URL (configurable for GitHub Enterprise)
    api_base: String,
    graphql_url: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("repository", &self.repository)
            .field("api_base", &self.api_base)
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

impl GitHubForge {
    /// Create a forge for `repository` on github.com.
    pub fn new(token: impl Into<String>, repository: Repository) -> Self {
        Self::with_api_base(token, repository, DEFAULT_API_BASE)
    }

    /// Create a forge against a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`).
    /// The GraphQL endpoint is derived from the base; see [`graphql_url_for`].
    pub fn with_api_base(
        token: impl Into<String>,
        repository: Repository,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            token: token.into(),
            repository,
            graphql_url: graphql_url_for(&api_base),
            api_base,
        }
    }

    /// Override the GraphQL endpoint.
    pub fn with_graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url = url.into();
        self
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.repository.owner, self.repository.name, path
        )
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // GitHub Apps report missing permissions in this header.
        let required_permissions = response
            .headers()
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let rate_exhausted = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if rate_exhausted => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Execute a GraphQL query and return its `data` member.
    async fn graphql<T: for<'de> Deserialize<'de>>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ForgeError> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = self
            .client
            .post(&self.graphql_url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let result: GraphQLResponse<T> = self.handle_response(response).await?;

        if let Some(error) = result.errors.and_then(|errors| errors.into_iter().next()) {
            return Err(match error.kind.as_deref() {
                Some("NOT_FOUND") => ForgeError::NotFound(error.message),
                Some("RATE_LIMITED") => ForgeError::RateLimited,
                Some("FORBIDDEN") => ForgeError::AuthFailed(error.message),
                _ => ForgeError::ApiError {
                    status: 200,
                    message: error.message,
                },
            });
        }

        result.data.ok_or_else(|| ForgeError::ApiError {
            status: 200,
            message: "GraphQL response has no data".into(),
        })
    }
}

/// Derive the GraphQL endpoint from a REST API base.
///
/// `https://api.github.com` maps to `https://api.github.com/graphql`;
/// an Enterprise base ending in `/api/v3` maps to `/api/graphql`.
pub fn graphql_url_for(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    match base.strip_suffix("/api/v3") {
        Some(host) => format!("{}/api/graphql", host),
        None => format!("{}/graphql", base),
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_refs_page(&self, request: RefPageRequest) -> Result<RefPage, ForgeError> {
        tracing::debug!(
            namespace = %request.namespace,
            cursor = request.cursor.as_deref().unwrap_or(""),
            "querying ref page"
        );

        let variables = serde_json::json!({
            "owner": self.repository.owner,
            "repo": self.repository.name,
            "prefix": request.namespace.prefix(),
            "first": request.page_size,
            "after": request.cursor,
        });

        let data: RefsData = self.graphql(REFS_QUERY, variables).await?;
        let repository = data
            .repository
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", self.repository)))?;

        Ok(repository.refs.into())
    }

    async fn matching_refs(&self, prefix: &str) -> Result<Vec<RefRecord>, ForgeError> {
        let url = self.repo_url(&format!("git/matching-refs/{}", prefix));
        tracing::debug!(%url, "looking up matching refs");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let refs: Vec<GitHubRef> = self.handle_response(response).await?;
        refs.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_ref(
        &self,
        name: &RefName,
        oid: &Oid,
        force: bool,
    ) -> Result<RefRecord, ForgeError> {
        let url = self.repo_url(&format!("git/refs/{}", name.relative()));

        let body = UpdateRefBody {
            sha: oid.as_str(),
            force,
        };

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let record: GitHubRef = self.handle_response(response).await?;
        record.try_into()
    }

    async fn create_ref(&self, name: &RefName, oid: &Oid) -> Result<RefRecord, ForgeError> {
        let url = self.repo_url("git/refs");

        let body = CreateRefBody {
            git_ref: name.as_str(),
            sha: oid.as_str(),
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let record: GitHubRef = self.handle_response(response).await?;
        record.try_into()
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a ref.
#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    sha: &'a str,
}

/// Request body for moving a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GitHub git ref format (REST).
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubObject,
}

#[derive(Deserialize)]
struct GitHubObject {
    sha: String,
}

impl TryFrom<GitHubRef> for RefRecord {
    type Error = ForgeError;

    fn try_from(gh: GitHubRef) -> Result<Self, Self::Error> {
        let invalid = |e: crate::core::types::TypeError| ForgeError::ApiError {
            status: 200,
            message: format!("unexpected ref in response: {}", e),
        };
        Ok(RefRecord {
            name: RefName::new(gh.ref_name).map_err(invalid)?,
            oid: Oid::new(gh.object.sha).map_err(invalid)?,
        })
    }
}

/// GraphQL response wrapper.
#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error format.
#[derive(Deserialize)]
struct GraphQLError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct RefsData {
    repository: Option<RefsRepository>,
}

#[derive(Deserialize)]
struct RefsRepository {
    refs: RefConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefConnection {
    page_info: PageInfo,
    nodes: Vec<RefNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Deserialize)]
struct RefNode {
    name: String,
    target: RefTarget,
}

#[derive(Deserialize)]
struct RefTarget {
    oid: Oid,
    /// Present when the target is an annotated tag
    target: Option<PeeledTarget>,
}

#[derive(Deserialize)]
struct PeeledTarget {
    oid: Oid,
}

impl From<RefConnection> for RefPage {
    fn from(conn: RefConnection) -> Self {
        RefPage {
            refs: conn
                .nodes
                .into_iter()
                .map(|node| RemoteRef {
                    name: node.name,
                    oid: node.target.target.map(|t| t.oid).unwrap_or(node.target.oid),
                })
                .collect(),
            end_cursor: conn.page_info.end_cursor,
            has_next_page: conn.page_info.has_next_page,
        }
    }
}
