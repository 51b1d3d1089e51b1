//! Session establishment against the Kubernetes control plane.
//!
//! The two credential-acquisition paths are one capability with two
//! variants: the ambient in-cluster service account, or an explicit
//! kubeconfig blob supplied in the group configuration. The variant is
//! chosen once at init; nothing downstream branches on the flag again.
//!
//! Kubeconfig support covers server URL, certificate-authority-data,
//! bearer token, basic auth, and insecure-skip-tls-verify. Exec credential
//! plugins and client certificates are rejected as configuration errors.

use std::env;
use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use vmfleet_core::{ProviderError, ProviderResult};

use crate::config::GroupConfig;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// How credentials for the control plane are acquired.
#[derive(Debug, Clone)]
pub enum SessionSource {
    /// Ambient in-cluster service account.
    InCluster,
    /// Explicit kubeconfig YAML blob.
    Kubeconfig { raw: String },
}

impl SessionSource {
    /// Select the acquisition path from the group configuration.
    pub fn from_config(config: &GroupConfig) -> Self {
        if config.use_in_cluster_config {
            SessionSource::InCluster
        } else {
            SessionSource::Kubeconfig {
                raw: config.kubeconfig.clone(),
            }
        }
    }
}

/// Authentication applied to every control-plane request.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    BearerToken(String),
    Basic { username: String, password: String },
}

/// An established control-plane session: where to connect and how to
/// authenticate. Shared by all operations for the life of the provider.
#[derive(Debug, Clone)]
pub struct Session {
    /// API server base URL, without a trailing slash.
    pub server: String,
    pub auth: AuthMethod,
    /// PEM bundle to trust as the cluster CA, when provided.
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_verify: bool,
    /// Active kubeconfig context name; empty for the ambient path.
    pub context_name: String,
}

impl Session {
    /// Establish a session from the selected source.
    pub fn establish(source: &SessionSource) -> ProviderResult<Session> {
        match source {
            SessionSource::InCluster => Self::in_cluster(Path::new(SERVICE_ACCOUNT_DIR)),
            SessionSource::Kubeconfig { raw } => Self::from_kubeconfig(raw),
        }
    }

    /// Ambient path: service-account token mounted by the kubelet plus the
    /// API server address from the pod environment.
    fn in_cluster(sa_dir: &Path) -> ProviderResult<Session> {
        let host = env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            ProviderError::Connectivity(
                "failed getting in-cluster config: KUBERNETES_SERVICE_HOST is not set".into(),
            )
        })?;
        let port = env::var("KUBERNETES_SERVICE_PORT").map_err(|_| {
            ProviderError::Connectivity(
                "failed getting in-cluster config: KUBERNETES_SERVICE_PORT is not set".into(),
            )
        })?;

        let token = fs::read_to_string(sa_dir.join("token")).map_err(|e| {
            ProviderError::Connectivity(format!(
                "failed getting in-cluster config: reading service account token: {e}"
            ))
        })?;
        // The CA bundle is optional; without it the cluster must present a
        // publicly trusted certificate.
        let ca_pem = fs::read(sa_dir.join("ca.crt")).ok();

        Ok(Session {
            server: format!("https://{host}:{port}"),
            auth: AuthMethod::BearerToken(token.trim().to_string()),
            ca_pem,
            insecure_skip_verify: false,
            context_name: String::new(),
        })
    }

    /// Explicit path: parse the kubeconfig blob and resolve its current
    /// context to a cluster and user.
    fn from_kubeconfig(raw: &str) -> ProviderResult<Session> {
        let config: Kubeconfig = serde_yaml::from_str(raw).map_err(|e| {
            ProviderError::Configuration(format!("failed parsing kubeconfig: {e}"))
        })?;

        if config.current_context.is_empty() {
            return Err(ProviderError::Configuration(
                "kubeconfig has no current-context".into(),
            ));
        }

        let context = config
            .contexts
            .iter()
            .find(|c| c.name == config.current_context)
            .map(|c| &c.context)
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "kubeconfig context '{}' not found",
                    config.current_context
                ))
            })?;

        let cluster = config
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "kubeconfig cluster '{}' not found",
                    context.cluster
                ))
            })?;

        let user = config
            .users
            .iter()
            .find(|u| u.name == context.user)
            .map(|u| &u.user)
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "kubeconfig user '{}' not found",
                    context.user
                ))
            })?;

        if cluster.server.is_empty() {
            return Err(ProviderError::Configuration(format!(
                "kubeconfig cluster '{}' has no server",
                context.cluster
            )));
        }

        let auth = if let Some(token) = user.token.as_deref().filter(|t| !t.is_empty()) {
            AuthMethod::BearerToken(token.to_string())
        } else if let (Some(username), Some(password)) =
            (user.username.as_deref(), user.password.as_deref())
        {
            AuthMethod::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }
        } else {
            return Err(ProviderError::Configuration(format!(
                "kubeconfig user '{}' has no supported credentials (token or basic auth)",
                context.user
            )));
        };

        let ca_pem = match cluster.certificate_authority_data.as_deref() {
            Some(data) => Some(BASE64.decode(data).map_err(|e| {
                ProviderError::Configuration(format!(
                    "kubeconfig certificate-authority-data is not valid base64: {e}"
                ))
            })?),
            None => None,
        };

        Ok(Session {
            server: cluster.server.trim_end_matches('/').to_string(),
            auth,
            ca_pem,
            insecure_skip_verify: cluster.insecure_skip_tls_verify.unwrap_or(false),
            context_name: config.current_context,
        })
    }
}

/// Derive the stable group identity reported through `ProviderInfo`.
///
/// Empty context segments (the ambient path) collapse, matching path-join
/// semantics: `kubevirt/<namespace>` instead of `kubevirt//<namespace>`.
pub fn group_identity(context_name: &str, namespace: &str) -> String {
    if context_name.is_empty() {
        format!("kubevirt/{namespace}")
    } else {
        format!("kubevirt/{context_name}/{namespace}")
    }
}

// ── Kubeconfig wire format (subset) ────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Kubeconfig {
    #[serde(rename = "current-context")]
    current_context: String,
    clusters: Vec<NamedCluster>,
    contexts: Vec<NamedContext>,
    users: Vec<NamedUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedCluster {
    name: String,
    cluster: ClusterEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClusterEntry {
    server: String,
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: Option<String>,
    #[serde(rename = "insecure-skip-tls-verify")]
    insecure_skip_tls_verify: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedContext {
    name: String,
    context: ContextEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContextEntry {
    cluster: String,
    user: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedUser {
    name: String,
    user: UserEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserEntry {
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
}
