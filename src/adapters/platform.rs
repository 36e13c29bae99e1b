use crate::domain::model::{
    Domain, Environment, PaymentMethod, ServiceLevel, Site, User, Workflow, WorkflowRequest,
    WorkflowState,
};
use crate::domain::ports::PlatformApi;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::OnceCell;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://terminus.pantheon.io/api/";
pub const DEFAULT_PLATFORM_DOMAIN: &str = "pantheonsite.io";
const CLIENT_NAME: &str = "site-cdn";

#[derive(Debug, Serialize)]
struct MachineTokenRequest<'a> {
    machine_token: &'a str,
    client: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct Session {
    session: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    firstname: Option<String>,
    lastname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: String,
    profile: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct SiteNameResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SiteResponse {
    id: String,
    name: String,
    owner: String,
    service_level: ServiceLevel,
}

#[derive(Debug, Deserialize)]
struct DomainResponse {
    id: String,
    #[serde(default)]
    dns_zone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowResponse {
    result: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// reqwest client for the hosting platform's REST API.
///
/// Authenticates lazily: the machine token is exchanged for a session on
/// the first call and the session is reused afterwards.
pub struct HttpPlatformClient {
    client: Client,
    base_url: Url,
    machine_token: String,
    platform_domain: String,
    session: OnceCell<Session>,
}

impl HttpPlatformClient {
    pub fn new(base_url: &str, machine_token: impl Into<String>) -> Result<Self> {
        // 統一以 / 結尾
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| ProvisionError::InvalidConfigValueError {
            field: "api_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            base_url,
            machine_token: machine_token.into(),
            platform_domain: DEFAULT_PLATFORM_DOMAIN.to_string(),
            session: OnceCell::new(),
        })
    }

    pub fn with_platform_domain(mut self, platform_domain: impl Into<String>) -> Self {
        self.platform_domain = platform_domain.into();
        self
    }

    /// Appends `segments` to the base URL, percent-encoding each one so a
    /// name can never step outside its own path segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProvisionError::ConfigError {
                message: format!("API URL '{}' cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn session(&self) -> Result<&Session> {
        self.session
            .get_or_try_init(|| async {
                let url = self.url(&["authorize", "machine-token"])?;
                tracing::debug!("Authenticating against {}", url);
                let response = self
                    .client
                    .post(url)
                    .json(&MachineTokenRequest {
                        machine_token: &self.machine_token,
                        client: CLIENT_NAME,
                    })
                    .send()
                    .await?;
                let session: Session = check_status(response, "session", "machine token")
                    .await?
                    .json()
                    .await?;
                tracing::debug!("Authenticated as user {}", session.user_id);
                Ok::<_, ProvisionError>(session)
            })
            .await
    }

    async fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder> {
        let session = self.session().await?;
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);
        Ok(self.client.request(method, url).bearer_auth(&session.session))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &[&str], resource: &str, id: &str) -> Result<T> {
        let response = self.request(Method::GET, path).await?.send().await?;
        Ok(check_status(response, resource, id).await?.json().await?)
    }

    fn environment_domain(&self, site_name: &str, env_id: &str) -> String {
        format!("{}-{}.{}", env_id, site_name, self.platform_domain)
    }
}

async fn check_status(response: Response, resource: &str, id: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ProvisionError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        });
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("API error {} from {}: {}", status, url, body);
    Err(ProvisionError::ApiStatus {
        status: status.as_u16(),
        url,
        body,
    })
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn current_user(&self) -> Result<User> {
        let user_id = self.session().await?.user_id.clone();
        let user: UserResponse = self
            .get_json(&["users", user_id.as_str()], "user", &user_id)
            .await?;

        let name = user.profile.and_then(|p| {
            let full = [p.firstname, p.lastname]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            (!full.is_empty()).then_some(full)
        });

        Ok(User {
            id: user.id,
            email: user.email,
            name,
        })
    }

    async fn site(&self, name: &str) -> Result<Site> {
        let lookup: SiteNameResponse = self
            .get_json(&["site-names", name], "site", name)
            .await?;
        let site: SiteResponse = self
            .get_json(&["sites", lookup.id.as_str()], "site", name)
            .await?;

        Ok(Site {
            id: site.id,
            name: site.name,
            owner: site.owner,
            service_level: site.service_level,
        })
    }

    async fn environment(&self, site: &Site, env_id: &str) -> Result<Environment> {
        let environments: HashMap<String, serde_json::Value> = self
            .get_json(&["sites", site.id.as_str(), "environments"], "site", &site.name)
            .await?;

        if !environments.contains_key(env_id) {
            return Err(ProvisionError::NotFound {
                resource: "environment".to_string(),
                id: format!("{}.{}", site.name, env_id),
            });
        }

        Ok(Environment {
            id: env_id.to_string(),
            domain: self.environment_domain(&site.name, env_id),
        })
    }

    async fn domains(&self, site: &Site, env: &Environment) -> Result<Vec<Domain>> {
        let domains: Vec<DomainResponse> = self
            .get_json(
                &["sites", site.id.as_str(), "environments", env.id.as_str(), "domains"],
                "environment",
                &env.id,
            )
            .await?;

        Ok(domains
            .into_iter()
            .map(|d| Domain {
                name: d.id,
                dns_zone_name: d.dns_zone_name,
            })
            .collect())
    }

    async fn create_domain(&self, site: &Site, env: &Environment, domain: &str) -> Result<()> {
        let response = self
            .request(
                Method::PUT,
                &[
                    "sites",
                    site.id.as_str(),
                    "environments",
                    env.id.as_str(),
                    "domains",
                    domain,
                ],
            )
            .await?
            .send()
            .await?;
        check_status(response, "environment", &env.id).await?;
        Ok(())
    }

    async fn payment_methods(&self, user: &User) -> Result<Vec<PaymentMethod>> {
        self.get_json(&["users", user.id.as_str(), "instruments"], "user", &user.id)
            .await
    }

    async fn submit_workflow(&self, site: &Site, request: &WorkflowRequest) -> Result<Workflow> {
        let response = self
            .request(Method::POST, &["sites", site.id.as_str(), "workflows"])
            .await?
            .json(request)
            .send()
            .await?;
        let created: IdResponse = check_status(response, "site", &site.name).await?.json().await?;
        tracing::debug!("Submitted {} workflow {}", request.kind(), created.id);

        Ok(Workflow {
            id: created.id,
            kind: request.kind().to_string(),
        })
    }

    async fn workflow_state(&self, site: &Site, workflow: &Workflow) -> Result<WorkflowState> {
        let status: WorkflowResponse = self
            .get_json(
                &["sites", site.id.as_str(), "workflows", workflow.id.as_str()],
                "workflow",
                &workflow.id,
            )
            .await?;

        Ok(WorkflowState::from_result(
            status.result.as_deref(),
            status.reason.as_deref(),
        ))
    }
}
