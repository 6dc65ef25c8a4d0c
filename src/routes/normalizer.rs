use super::{HttpMethod, RawRoute, RouteEntry};
use indexmap::IndexSet;
use log::debug;

const FORMAT_SUFFIX: &str = "(.:format)";

/// Normalizes the raw routes of one controller.
///
/// Format suffixes are stripped from paths and action annotations, multi-verb routes are
/// expanded, and the result is deduplicated on `(method, path, action)` keeping first
/// occurrence order. Path parameters stay in `:param` form.
pub fn normalize(raw_routes: &[RawRoute]) -> Vec<RouteEntry> {
    let mut entries: IndexSet<RouteEntry> = IndexSet::new();

    for raw in raw_routes {
        let path = strip_format_suffix(&raw.path);
        let action = action_name(&raw.action);
        if action.is_empty() {
            debug!("Skipping route without action: {} {}", raw.verb, raw.path);
            continue;
        }

        for verb in raw.verb.split('|') {
            match HttpMethod::parse(verb) {
                Some(method) => {
                    entries.insert(RouteEntry::new(method, &path, &action));
                }
                None => debug!("Skipping unsupported verb {:?} for {}", verb, raw.path),
            }
        }
    }

    debug!(
        "Normalized {} raw routes into {} entries",
        raw_routes.len(),
        entries.len()
    );
    entries.into_iter().collect()
}

pub fn strip_format_suffix(path: &str) -> String {
    path.replace(FORMAT_SUFFIX, "")
}

/// Extracts the bare action from descriptors like `admin/users#show {:format=>:json}`.
pub fn action_name(descriptor: &str) -> String {
    let without_annotation = match descriptor.find(" {") {
        Some(index) => &descriptor[..index],
        None => descriptor,
    };
    let action = match without_annotation.find('#') {
        Some(index) => &without_annotation[index + 1..],
        None => without_annotation,
    };
    action.trim().to_string()
}
