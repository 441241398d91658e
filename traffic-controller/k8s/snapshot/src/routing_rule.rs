use crate::{object_name, Skip};
use mesh_traffic_controller_core::{
    MatchBlock, MatchPredicate, RouteEntry, RouteTarget, RoutingRule, StringMatch,
};
use mesh_traffic_controller_k8s_api::{Document, DynamicObject, ResourceExt};

/// Shapes a `VirtualService` into a routing rule.
///
/// Only HTTP routes are read; `tcp` and `tls` routes are ignored. A rule must
/// name at least one host.
pub fn routing_rule(obj: &DynamicObject) -> Result<RoutingRule, Skip> {
    let name = object_name(obj)?;
    let spec = Document::new(&obj.data).get("spec");
    if !spec.is_present() {
        return Err(Skip::Missing("spec"));
    }

    let hosts = spec
        .get("hosts")
        .items()
        .filter_map(Document::as_non_empty_str)
        .map(String::from)
        .collect::<Vec<_>>();
    if hosts.is_empty() {
        return Err(Skip::Missing("spec.hosts"));
    }

    let entries = spec.get("http").items().map(route_entry).collect();

    Ok(RoutingRule {
        name,
        namespace: obj.namespace(),
        hosts,
        entries,
    })
}

fn route_entry(http: Document<'_>) -> RouteEntry {
    RouteEntry {
        predicate: predicate(http.get("match")),
        targets: http.get("route").items().filter_map(route_target).collect(),
    }
}

/// An empty match list applies to every request, so it is no predicate. A
/// match that is present but not a list still gates the entry, though none
/// of its conditions can be described.
fn predicate(matches: Document<'_>) -> Option<MatchPredicate> {
    if !matches.is_present() {
        return None;
    }
    let Some(items) = matches.as_seq() else {
        return Some(MatchPredicate { blocks: Vec::new() });
    };
    let blocks = items.map(match_block).collect::<Vec<_>>();
    if blocks.is_empty() {
        return None;
    }
    Some(MatchPredicate { blocks })
}

fn match_block(m: Document<'_>) -> MatchBlock {
    MatchBlock {
        uri: string_match(m.get("uri")),
        method: string_match(m.get("method")),
        authority: string_match(m.get("authority")),
        headers: named_matches(m.get("headers")),
        query_params: named_matches(m.get("queryParams")),
    }
}

fn string_match(doc: Document<'_>) -> Option<StringMatch> {
    if let Some(v) = doc.get("exact").as_str() {
        return Some(StringMatch::Exact(v.to_string()));
    }
    if let Some(v) = doc.get("prefix").as_str() {
        return Some(StringMatch::Prefix(v.to_string()));
    }
    if let Some(v) = doc.get("regex").as_str() {
        return Some(StringMatch::Regex(v.to_string()));
    }
    None
}

fn named_matches(doc: Document<'_>) -> Vec<(String, StringMatch)> {
    doc.entries()
        .filter_map(|(name, m)| Some((name.to_string(), string_match(m)?)))
        .collect()
}

fn route_target(route: Document<'_>) -> Option<RouteTarget> {
    let dst = route.get("destination");
    let host = dst.get("host").as_non_empty_str()?;
    Some(RouteTarget {
        host: host.to_string(),
        subset: dst.get("subset").as_non_empty_str().map(String::from),
    })
}
