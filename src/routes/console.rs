use super::{HttpMethod, RawRoute};
use log::debug;

/// Parses the router's console route listing into raw routes.
///
/// Each row looks like `[prefix] VERB PATH controller#action [{annotation}]`. The header
/// row and rows without a recognised verb (mounted engines, redirects) are skipped.
///
/// # Example
///
/// ```
/// use openapi_from_models::routes::console::parse_routes_table;
///
/// let table = "\
///    Prefix Verb URI Pattern             Controller#Action
///  articles GET  /api/articles(.:format) articles#index {:format=>:json}
///           POST /api/articles(.:format) articles#create {:format=>:json}
/// ";
/// let routes = parse_routes_table(table);
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes[1].controller, "articles");
/// ```
pub fn parse_routes_table(table: &str) -> Vec<RawRoute> {
    table.lines().filter_map(parse_row).collect()
}

fn parse_row(row: &str) -> Option<RawRoute> {
    let tokens: Vec<&str> = row.split_whitespace().collect();
    // anchor on controller#action; the verb and path are the two tokens before it
    let Some(target_index) =
        (2..tokens.len()).find(|&i| tokens[i].contains('#') && is_verb(tokens[i - 2]))
    else {
        if !tokens.is_empty() {
            debug!("Skipping route row without VERB PATH controller#action: {}", row.trim());
        }
        return None;
    };
    let (controller, _) = tokens[target_index].split_once('#')?;

    Some(RawRoute {
        controller: controller.to_string(),
        verb: tokens[target_index - 2].to_string(),
        path: tokens[target_index - 1].to_string(),
        action: tokens[target_index..].join(" "),
    })
}

/// Verbs are listed in upper case, so route prefixes such as `options` never match.
fn is_verb(token: &str) -> bool {
    !token.is_empty()
        && token.split('|').all(|verb| {
            verb.chars().all(|c| c.is_ascii_uppercase()) && HttpMethod::parse(verb).is_some()
        })
}
