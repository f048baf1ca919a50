//! Admission Pipeline.
//!
//! `review_admission_request` is the single entry point the HTTP layer
//! calls for every `POST /validate`. It owns the decode,
//! classify, update-skip, and breakglass steps; only a malformed workload
//! payload escapes as [`PipelineError`] (the caller maps that to `500`),
//! everything else resolves to an `AdmissionReviewResponse` the caller
//! serializes straight back to the webhook.

use thiserror::Error;
use tracing::{info, warn};

use crate::admission::types::{
    AdmissionReview, AdmissionReviewResponse, PodWorkload, TemplatedWorkload, WorkloadKind,
};
use crate::admission::types::Operation;
use crate::api::Metrics;
use crate::extractor;
use crate::reviewer::Reviewer;
use crate::types::AdmissionResponse;
use crate::BREAKGLASS_ANNOTATION_KEY;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed workload payload: {0}")]
    Decode(serde_json::Error),
}

/// Decode, classify, and review one `AdmissionReview` request body.
///
/// Malformed envelope bodies, unrecognized workload kinds, update requests
/// that add no new image, and breakglass-annotated objects are all resolved
/// directly to an `allowed`/`denied` response without ever reaching the
/// [`Reviewer`]. A malformed `request.object` is a handler bug, not a policy
/// outcome, and surfaces as [`PipelineError`] instead. Every error the
/// [`Reviewer`] itself returns — policy fetch, digest resolution, metadata
/// fetch, attestation, evaluation, or an outright denial — is fail-closed and
/// resolves to `allowed=false` here, never a [`PipelineError`].
pub async fn review_admission_request(
    raw_body: &[u8],
    reviewer: &Reviewer,
    metrics: &Metrics,
) -> Result<AdmissionReviewResponse, PipelineError> {
    let review: AdmissionReview = match serde_json::from_slice(raw_body) {
        Ok(r) => r,
        Err(err) => {
            warn!(error = %err, "malformed AdmissionReview body");
            return Ok(AdmissionReviewResponse::wrap(AdmissionResponse::deny(
                "",
                format!("malformed admission review: {err}"),
            )));
        }
    };

    let Some(request) = review.request else {
        warn!("AdmissionReview body carried no request");
        return Ok(AdmissionReviewResponse::wrap(AdmissionResponse::deny(
            "",
            "admission review carried no request",
        )));
    };

    let uid = request.uid.clone();

    let Some(workload_kind) = WorkloadKind::from_kind_str(&request.kind.kind) else {
        info!(kind = %request.kind.kind, "workload kind is not reviewed, allowing");
        return Ok(AdmissionReviewResponse::wrap(AdmissionResponse::allow(uid)));
    };

    let (namespace, annotations_hit, new_images) = decode_images(workload_kind, &request.object)
        .map_err(|err| {
            warn!(error = %err, "malformed workload payload");
            PipelineError::Decode(err)
        })?;

    if request.operation == Operation::Update && workload_kind != WorkloadKind::Pod {
        if let Some(old_object) = &request.old_object {
            if let Ok((_, _, old_images)) = decode_images(workload_kind, old_object) {
                if !extractor::has_new_image(&new_images, &old_images) {
                    info!(namespace, "update introduces no new image, skipping review");
                    metrics.inc_update_skipped();
                    return Ok(AdmissionReviewResponse::wrap(AdmissionResponse::allow(uid)));
                }
            }
        }
    }

    if annotations_hit {
        info!(namespace, "breakglass annotation present, skipping review");
        metrics.inc_breakglass();
        return Ok(AdmissionReviewResponse::wrap(AdmissionResponse::allow(uid)));
    }

    match reviewer.review(&namespace, &new_images, None).await {
        Ok(()) => Ok(AdmissionReviewResponse::wrap(AdmissionResponse::allow(uid))),
        Err(err) => {
            warn!(error = %err, "review failed, denying (fail-closed)");
            Ok(AdmissionReviewResponse::wrap(AdmissionResponse::deny(uid, err.to_string())))
        }
    }
}

/// Extract `(namespace, has_breakglass_annotation, images)` for the given
/// workload kind, reading through `spec.template.*` for Deployment/ReplicaSet.
fn decode_images(
    kind: WorkloadKind,
    object: &serde_json::Value,
) -> Result<(String, bool, Vec<String>), serde_json::Error> {
    match kind {
        WorkloadKind::Pod => {
            let pod: PodWorkload = serde_json::from_value(object.clone())?;
            let has_breakglass = pod.metadata.has_annotation(BREAKGLASS_ANNOTATION_KEY);
            Ok((pod.metadata.namespace, has_breakglass, extractor::images_of(&pod.spec)))
        }
        WorkloadKind::Deployment | WorkloadKind::ReplicaSet => {
            let workload: TemplatedWorkload = serde_json::from_value(object.clone())?;
            let has_breakglass = workload.metadata.has_annotation(BREAKGLASS_ANNOTATION_KEY)
                || workload.spec.template.metadata.has_annotation(BREAKGLASS_ANNOTATION_KEY);
            Ok((
                workload.metadata.namespace,
                has_breakglass,
                extractor::images_of(&workload.spec.template.spec),
            ))
        }
    }
}
