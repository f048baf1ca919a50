//! Image Extractor.
//!
//! Pulls image references out of workload payloads and detects whether an
//! update introduced a genuinely new image, so the pipeline can skip
//! re-review on updates that only scale replicas or otherwise leave every
//! container image unchanged.

use std::collections::HashSet;

use crate::admission::types::PodSpec;

/// Ordered, de-duplicated list of image references across all containers
/// and init containers of a pod spec.
pub fn images_of(spec: &PodSpec) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for container in spec.init_containers.iter().chain(spec.containers.iter()) {
        if seen.insert(container.image.clone()) {
            images.push(container.image.clone());
        }
    }
    images
}

/// True iff `new` contains at least one image absent from `old`.
pub fn has_new_image(new: &[String], old: &[String]) -> bool {
    let old_set: HashSet<&String> = old.iter().collect();
    new.iter().any(|image| !old_set.contains(image))
}
