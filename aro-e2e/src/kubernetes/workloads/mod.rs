//! Workloads created by the suite: StatefulSets and Deployments

pub mod deployments;
pub mod statefulsets;

use k8s_openapi::api::core::v1::Container;
use std::collections::BTreeMap;

/// Shell loop that keeps a container alive without doing anything
pub const SLEEP_FOREVER: [&str; 3] = ["/bin/sh", "-c", "while true; do sleep 1; done"];

/// `app={app}` label set shared by selectors and pod templates
pub(crate) fn labels(app: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), app.to_string())])
}

/// Container that runs `image` and idles
pub(crate) fn sleep_container(name: &str, image: &str) -> Container {
    Container {
        name: name.to_string(),
        image: Some(image.to_string()),
        command: Some(SLEEP_FOREVER.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    }
}
