use std::fmt;

/// Describes how a configured host relates to a service name.
///
/// Mesh configuration names services loosely: a workload labeled `reviews`
/// may be referred to by a rule as `reviews` or by the FQDN
/// `reviews.bookinfo.svc.cluster.local`. Anything other than an exact match
/// is accepted when one name contains the other. This over-matches some
/// unrelated short names; callers always prefer an exact match when one
/// exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostMatch {
    /// The host and the service name are identical.
    Exact,

    /// One name contains the other.
    Loose,
}

// === impl HostMatch ===

impl HostMatch {
    /// Compares a host against a service name. Empty names never match.
    pub fn of(host: &str, service: &str) -> Option<Self> {
        if host.is_empty() || service.is_empty() {
            return None;
        }

        if host == service {
            return Some(Self::Exact);
        }

        if host.contains(service) || service.contains(host) {
            return Some(Self::Loose);
        }

        None
    }

    pub fn matches(host: &str, service: &str) -> bool {
        Self::of(host, service).is_some()
    }
}

impl fmt::Display for HostMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => "exact".fmt(f),
            Self::Loose => "loose".fmt(f),
        }
    }
}
