use std::process::Command;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Environment variables consulted for the project id, in order
pub const PROJECT_ENV_VARS: [&str; 2] = ["GOOGLE_CLOUD_PROJECT", "CLOUDSDK_CORE_PROJECT"];

/// Source of the project id and bearer token
pub trait CredentialProvider {
    fn project_id(&self) -> Result<String>;
    fn access_token(&self) -> Result<String>;
}

/// Resolved credentials, obtained once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub project_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project_id", &self.project_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn resolve<P: CredentialProvider + ?Sized>(provider: &P) -> Result<Self> {
        let project_id = provider.project_id()?;
        let access_token = provider.access_token()?;
        info!("Using project: {}", project_id);
        Ok(Self {
            project_id,
            access_token,
        })
    }
}

/// Credentials from the environment and the `gcloud` CLI
#[derive(Debug, Clone)]
pub struct GcloudCredentials {
    gcloud: String,
    project_override: Option<String>,
}

impl Default for GcloudCredentials {
    fn default() -> Self {
        Self::from_env()
    }
}

impl GcloudCredentials {
    /// Capture the project id from the environment, if set.
    pub fn from_env() -> Self {
        let project_override = PROJECT_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());
        Self {
            gcloud: "gcloud".to_string(),
            project_override,
        }
    }

    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_override = project_id;
        self
    }

    /// Use a different `gcloud` executable.
    pub fn with_gcloud(mut self, program: impl Into<String>) -> Self {
        self.gcloud = program.into();
        self
    }

    fn gcloud_output(&self, args: &[&str], what: &str) -> Result<String> {
        debug!("Running {} {}", self.gcloud, args.join(" "));
        let output = Command::new(&self.gcloud)
            .args(args)
            .output()
            .map_err(|e| Error::Credentials(format!("cannot run {}: {}", self.gcloud, e)))?;
        if !output.status.success() {
            return Err(Error::Credentials(format!(
                "{} failed: {}",
                what,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() || value == "(unset)" {
            return Err(Error::Credentials(format!("{} returned nothing", what)));
        }
        Ok(value)
    }
}

impl CredentialProvider for GcloudCredentials {
    fn project_id(&self) -> Result<String> {
        match &self.project_override {
            Some(p) => Ok(p.clone()),
            None => self
                .gcloud_output(&["config", "get-value", "project"], "project lookup")
                .map_err(|e| {
                    Error::Credentials(format!(
                        "no project configured; set GOOGLE_CLOUD_PROJECT ({})",
                        e
                    ))
                }),
        }
    }

    fn access_token(&self) -> Result<String> {
        self.gcloud_output(&["auth", "print-access-token"], "access token lookup")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_TOOL: &str = "veogen-test-no-such-gcloud";

    #[test]
    fn explicit_project_skips_gcloud() {
        let creds = GcloudCredentials::from_env()
            .with_gcloud(MISSING_TOOL)
            .with_project(Some("my-project".into()));
        assert_eq!(creds.project_id().unwrap(), "my-project");
    }

    #[test]
    fn missing_tool_is_a_credential_error() {
        let creds = GcloudCredentials::from_env()
            .with_gcloud(MISSING_TOOL)
            .with_project(Some("p".into()));
        let err = creds.access_token().unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
        assert!(Credentials::resolve(&creds).is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let c = Credentials {
            project_id: "p".into(),
            access_token: "ya29.secret".into(),
        };
        assert!(!format!("{c:?}").contains("secret"));
    }
}
