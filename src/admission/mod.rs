//! Admission Pipeline: decodes the `AdmissionReview` envelope,
//! classifies the workload, applies the update-skip and breakglass
//! shortcuts, and otherwise hands the candidate images to the [`Reviewer`](crate::reviewer::Reviewer).

pub mod pipeline;
pub mod types;

pub use pipeline::{review_admission_request, PipelineError};
