//! HTTP implementation of the control-plane client.
//!
//! Speaks the Kubernetes API directly:
//! `/apis/kubevirt.io/v1/namespaces/{ns}/virtualmachines` and
//! `.../virtualmachineinstances`. Authentication and TLS trust come from
//! the established [`Session`]. Requests carry no retry logic; a dropped
//! future aborts the in-flight request.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::debug;

use vmfleet_core::{ProviderError, ProviderResult};

use crate::client::VirtClient;
use crate::resources::{VirtualMachine, VirtualMachineInstance, VirtualMachineList};
use crate::session::{AuthMethod, Session};

/// Control-plane client over HTTPS, scoped to one namespace.
#[derive(Debug)]
pub struct HttpVirtClient {
    http: reqwest::Client,
    base: String,
    namespace: String,
    auth: AuthMethod,
}

impl HttpVirtClient {
    /// Build a client from an established session.
    pub fn new(session: &Session, namespace: &str) -> ProviderResult<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(ca_pem) = &session.ca_pem {
            let cert = reqwest::Certificate::from_pem(ca_pem).map_err(|e| {
                ProviderError::Connectivity(format!("invalid cluster CA certificate: {e}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }
        if session.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|e| {
            ProviderError::Connectivity(format!("failed creating kubevirt client: {e}"))
        })?;

        Ok(Self {
            http,
            base: session.server.clone(),
            namespace: namespace.to_string(),
            auth: session.auth.clone(),
        })
    }

    fn resource_url(&self, kind: &str, name: Option<&str>) -> String {
        let mut url = format!(
            "{}/apis/kubevirt.io/v1/namespaces/{}/{kind}",
            self.base, self.namespace
        );
        if let Some(name) = name {
            url.push('/');
            url.push_str(name);
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, url);
        match &self.auth {
            AuthMethod::BearerToken(token) => req.bearer_auth(token),
            AuthMethod::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    /// Send a request and surface a non-success response as a remote
    /// error naming the resource and carrying the API server's message.
    async fn send(
        &self,
        resource: &str,
        req: reqwest::RequestBuilder,
    ) -> ProviderResult<reqwest::Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::remote(resource.to_string(), e))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        debug!(%resource, %status, "control plane rejected request");
        Err(ProviderError::remote(
            resource.to_string(),
            anyhow::anyhow!("{status}: {}", api_message(&body, status)),
        ))
    }
}

/// Pull the human-readable message out of a Kubernetes `Status` body,
/// falling back to the canonical reason for the HTTP status.
fn api_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

#[async_trait]
impl VirtClient for HttpVirtClient {
    async fn list_machines(&self, selector: &str) -> ProviderResult<Vec<VirtualMachine>> {
        let url = self.resource_url("virtualmachines", None);
        let req = self
            .request(Method::GET, &url)
            .query(&[("labelSelector", selector)]);
        let resp = self.send("virtualmachines", req).await?;
        let list: VirtualMachineList = resp
            .json()
            .await
            .map_err(|e| ProviderError::remote("virtualmachines", e))?;
        Ok(list.items)
    }

    async fn create_machine(&self, machine: &VirtualMachine) -> ProviderResult<VirtualMachine> {
        let url = self.resource_url("virtualmachines", None);
        let req = self.request(Method::POST, &url).json(machine);
        let resp = self.send("virtualmachines", req).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::remote("virtualmachines", e))
    }

    async fn delete_machine(&self, name: &str) -> ProviderResult<()> {
        let resource = format!("virtualmachines/{name}");
        let url = self.resource_url("virtualmachines", Some(name));
        let req = self.request(Method::DELETE, &url);
        self.send(&resource, req).await?;
        Ok(())
    }

    async fn delete_machines(&self, selector: &str) -> ProviderResult<()> {
        let url = self.resource_url("virtualmachines", None);
        let req = self
            .request(Method::DELETE, &url)
            .query(&[("labelSelector", selector)]);
        self.send("virtualmachines", req).await?;
        Ok(())
    }

    async fn get_instance(&self, name: &str) -> ProviderResult<VirtualMachineInstance> {
        let resource = format!("virtualmachineinstances/{name}");
        let url = self.resource_url("virtualmachineinstances", Some(name));
        let req = self.request(Method::GET, &url);
        let resp = self.send(&resource, req).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::remote(resource, e))
    }
}
