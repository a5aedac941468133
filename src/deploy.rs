//! One-shot submission of a serving `Configuration` to the AI Core
//! deployment API. Runs out of process via the `deploy` binary; the chat
//! service never calls into this.

use clap::Parser;
use log::info;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const CONFIGURATION_API_VERSION: &str = "ai.sap.com/v1alpha1";
const CONFIGURATION_NAME: &str = "sustainability-chatbot-config";
const SCENARIO_ANNOTATION: &str = "scenarios.ai.sap.com/name";
const SCENARIO_NAME: &str = "sustainability-chatbot-scenario";
const EXECUTABLE_ANNOTATION: &str = "executables.ai.sap.com/name";
const EXECUTABLE_NAME: &str = "sustainability-chatbot-executable";
const RESOURCE_GROUP_LABEL: &str = "ai.sap.com/resourceGroup";
const SERVING_TEMPLATE_NAME: &str = "sustainability-chatbot-serving";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct DeployArgs {
    /// OAuth2 token endpoint (client-credentials grant)
    #[arg(long, env = "AUTH_URL")]
    pub auth_url: String,

    /// OAuth2 client id
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    /// OAuth2 client secret
    #[arg(long, env = "CLIENT_SECRET")]
    pub client_secret: String,

    /// Base URL of the AI API
    #[arg(long, env = "AI_API_URL")]
    pub ai_api_url: String,

    /// Resource group the configuration is filed under
    #[arg(long, env = "RESOURCE_GROUP", default_value = "default")]
    pub resource_group: String,

    /// DockerHub account the chatbot image is published under
    #[arg(long, env = "DOCKERHUB_USERNAME")]
    pub dockerhub_username: String,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deploy request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned status {status}: {body}")]
    TokenRejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("configuration submission returned status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ManifestMetadata,
    pub spec: ManifestSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ManifestMetadata {
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ManifestSpec {
    pub template: TemplateRef,
    pub inputs: SpecInputs,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TemplateRef {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SpecInputs {
    pub parameters: Vec<Parameter>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub fn build_manifest(args: &DeployArgs) -> ConfigurationManifest {
    let mut annotations = BTreeMap::new();
    annotations.insert(SCENARIO_ANNOTATION.to_string(), SCENARIO_NAME.to_string());
    annotations.insert(EXECUTABLE_ANNOTATION.to_string(), EXECUTABLE_NAME.to_string());

    let mut labels = BTreeMap::new();
    labels.insert(RESOURCE_GROUP_LABEL.to_string(), args.resource_group.clone());

    ConfigurationManifest {
        api_version: CONFIGURATION_API_VERSION.to_string(),
        kind: "Configuration".to_string(),
        metadata: ManifestMetadata {
            name: CONFIGURATION_NAME.to_string(),
            annotations,
            labels,
        },
        spec: ManifestSpec {
            template: TemplateRef {
                name: SERVING_TEMPLATE_NAME.to_string(),
            },
            inputs: SpecInputs {
                parameters: vec![
                    Parameter {
                        name: "image".to_string(),
                        value: format!(
                            "docker.io/{}/sustainability-chatbot:latest",
                            args.dockerhub_username
                        ),
                    },
                    Parameter {
                        name: "resourceGroup".to_string(),
                        value: args.resource_group.clone(),
                    },
                ],
            },
        },
    }
}

pub async fn fetch_access_token(
    client: &reqwest::Client,
    args: &DeployArgs,
) -> Result<String, DeployError> {
    let resp = client
        .post(&args.auth_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", args.client_id.as_str()),
            ("client_secret", args.client_secret.as_str()),
        ])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DeployError::TokenRejected { status, body });
    }

    let token: TokenResponse = resp.json().await?;
    Ok(token.access_token)
}

pub async fn submit_configuration(
    client: &reqwest::Client,
    token: &str,
    args: &DeployArgs,
    manifest: &ConfigurationManifest,
) -> Result<String, DeployError> {
    let url = format!(
        "{}/v2/lm/configurations",
        args.ai_api_url.trim_end_matches('/')
    );

    let resp = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header("AI-Resource-Group", &args.resource_group)
        .query(&[("resourceGroup", args.resource_group.as_str())])
        .json(manifest)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !(status == reqwest::StatusCode::OK || status == reqwest::StatusCode::CREATED) {
        return Err(DeployError::Rejected { status, body });
    }

    Ok(body)
}

pub async fn run(args: &DeployArgs) -> Result<(), DeployError> {
    let client = reqwest::Client::new();

    info!("Resource Group: {}", args.resource_group);
    info!("DockerHub Username: {}", args.dockerhub_username);
    info!("AI API URL: {}", args.ai_api_url);

    info!("Requesting access token...");
    let token = fetch_access_token(&client, args).await?;
    info!("Access token obtained");

    let manifest = build_manifest(args);
    info!("Submitting configuration '{}'...", manifest.metadata.name);
    let body = submit_configuration(&client, &token, args, &manifest).await?;
    info!("Configuration deployed: {}", body);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_args() -> DeployArgs {
        DeployArgs {
            auth_url: "https://auth.example.com/oauth/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            ai_api_url: "https://api.example.com".to_string(),
            resource_group: "default".to_string(),
            dockerhub_username: "acme".to_string(),
        }
    }

    #[test]
    fn manifest_serializes_to_the_platform_shape() {
        let manifest = build_manifest(&test_args());
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(
            value,
            json!({
                "apiVersion": "ai.sap.com/v1alpha1",
                "kind": "Configuration",
                "metadata": {
                    "name": "sustainability-chatbot-config",
                    "annotations": {
                        "executables.ai.sap.com/name": "sustainability-chatbot-executable",
                        "scenarios.ai.sap.com/name": "sustainability-chatbot-scenario"
                    },
                    "labels": {
                        "ai.sap.com/resourceGroup": "default"
                    }
                },
                "spec": {
                    "template": {
                        "name": "sustainability-chatbot-serving"
                    },
                    "inputs": {
                        "parameters": [
                            { "name": "image", "value": "docker.io/acme/sustainability-chatbot:latest" },
                            { "name": "resourceGroup", "value": "default" }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn resource_group_flows_into_label_and_parameter() {
        let mut args = test_args();
        args.resource_group = "green-team".to_string();
        let manifest = build_manifest(&args);

        assert_eq!(
            manifest.metadata.labels.get("ai.sap.com/resourceGroup"),
            Some(&"green-team".to_string())
        );
        assert!(manifest
            .spec
            .inputs
            .parameters
            .iter()
            .any(|p| p.name == "resourceGroup" && p.value == "green-team"));
    }
}
