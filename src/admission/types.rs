//! Wire types for the `AdmissionReview` envelope and the subset of workload
//! payload fields the engine reads: `metadata.namespace`,
//! `metadata.annotations`, `spec.containers[].image`,
//! `spec.initContainers[].image`, and (for Deployment/ReplicaSet)
//! `spec.template.spec.*`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionRequest {
    pub uid: String,
    #[serde(default)]
    pub kind: GroupVersionKind,
    #[serde(default)]
    pub namespace: String,
    pub operation: Operation,
    pub object: Value,
    #[serde(default, rename = "oldObject")]
    pub old_object: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionReview {
    pub request: Option<AdmissionRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdmissionReviewResponse {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub response: crate::types::AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn wrap(response: crate::types::AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: "admission.k8s.io/v1".to_string(),
            kind: "AdmissionReview".to_string(),
            response,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl ObjectMeta {
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default, rename = "initContainers")]
    pub init_containers: Vec<Container>,
}

/// A bare Pod payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PodWorkload {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatedSpec {
    #[serde(default)]
    pub template: PodTemplate,
}

/// A Deployment or ReplicaSet payload: pod fields live under
/// `spec.template.*` rather than directly under `spec`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatedWorkload {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TemplatedSpec,
}

/// The workload kinds this controller classifies and reviews. Any other
/// `kind` passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Pod,
    Deployment,
    ReplicaSet,
}

impl WorkloadKind {
    pub fn from_kind_str(kind: &str) -> Option<Self> {
        match kind {
            "Pod" => Some(WorkloadKind::Pod),
            "Deployment" => Some(WorkloadKind::Deployment),
            "ReplicaSet" => Some(WorkloadKind::ReplicaSet),
            _ => None,
        }
    }
}
