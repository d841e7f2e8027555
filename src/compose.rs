//! Deterministic composition of a project's enabled-API set and label set.
//!
//! Every provisioning run passes through these two pure transforms before
//! anything reaches the resource layer: the caller's service list is merged
//! with the baseline stack a Firebase project needs, and the label map is
//! stamped with the marker that makes the project show up in Firebase
//! project listings.
//!
//! Both functions are synchronous, infallible, and free of side effects,
//! so they are safe to call any number of times with the same or different
//! inputs.

use indexmap::{IndexMap, IndexSet};

/// Label key that marks a project as Firebase-enabled.
pub const FIREBASE_LABEL_KEY: &str = "firebase";

/// Required value for [`FIREBASE_LABEL_KEY`]. The Firebase console only
/// lists projects carrying this exact pair.
pub const FIREBASE_LABEL_VALUE: &str = "enabled";

/// Services every Firebase-enabled project needs activated.
///
/// Changing this list changes what every composed project enables and must
/// be called out in release notes.
pub const FIREBASE_BASELINE_SERVICES: &[&str] = &[
    // base
    "cloudbilling.googleapis.com",
    "cloudresourcemanager.googleapis.com",
    // Service Usage must be on before the project can accept quota-project
    // checks, i.e. before any call billed to the project itself.
    "serviceusage.googleapis.com",
    // firebase services
    "firebase.googleapis.com",
    "fcm.googleapis.com",
    "fcmregistrations.googleapis.com",
    "firebaseappdistribution.googleapis.com",
    "firebaseextensions.googleapis.com",
    "firebasedynamiclinks.googleapis.com",
    "firebasehosting.googleapis.com",
    "firebaseinstallations.googleapis.com",
    "firebaseremoteconfig.googleapis.com",
    "firebaseremoteconfigrealtime.googleapis.com",
    "firebaserules.googleapis.com",
    // functions pipeline and its build/runtime dependencies
    "cloudfunctions.googleapis.com",
    "cloudbuild.googleapis.com",
    "artifactregistry.googleapis.com",
    "run.googleapis.com",
    "eventarc.googleapis.com",
    "pubsub.googleapis.com",
    "storage.googleapis.com",
];

/// Merge requested service identifiers with [`FIREBASE_BASELINE_SERVICES`].
///
/// Requested entries come first, the baseline follows, and duplicates keep
/// their first occurrence and position. The result is always a superset of
/// the baseline with no duplicates; an empty input is valid. Composing an
/// already-composed list yields the same sequence.
pub fn compose_apis(requested: &[String]) -> Vec<String> {
    let mut apis: IndexSet<String> =
        IndexSet::with_capacity(requested.len() + FIREBASE_BASELINE_SERVICES.len());
    apis.extend(requested.iter().cloned());
    apis.extend(FIREBASE_BASELINE_SERVICES.iter().map(|s| (*s).to_string()));
    apis.into_iter().collect()
}

/// Stamp a label map with `firebase: enabled`.
///
/// The key is forced to [`FIREBASE_LABEL_VALUE`] whenever it is absent or
/// carries any other value; all other entries pass through untouched and in
/// order. Takes the map by value and returns it, so the caller keeps sole
/// ownership of the result.
pub fn compose_labels(mut requested: IndexMap<String, String>) -> IndexMap<String, String> {
    match requested.get(FIREBASE_LABEL_KEY) {
        Some(value) if value == FIREBASE_LABEL_VALUE => {}
        _ => {
            requested.insert(
                FIREBASE_LABEL_KEY.to_string(),
                FIREBASE_LABEL_VALUE.to_string(),
            );
        }
    }
    requested
}
