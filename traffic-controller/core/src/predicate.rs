use std::fmt;

/// A string condition on some attribute of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StringMatch {
    Exact(String),
    Prefix(String),
    Regex(String),
}

/// One block of conditions gating a route entry.
///
/// All conditions within a block must hold for the block to apply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchBlock {
    pub uri: Option<StringMatch>,
    pub method: Option<StringMatch>,
    pub authority: Option<StringMatch>,
    pub headers: Vec<(String, StringMatch)>,
    pub query_params: Vec<(String, StringMatch)>,
}

/// The condition under which a route entry applies.
///
/// A request satisfies the predicate when any of its blocks applies. The
/// predicate carries no matching semantics here; it is only described.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchPredicate {
    pub blocks: Vec<MatchBlock>,
}

// === impl StringMatch ===

impl StringMatch {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::Prefix(_) => "prefix",
            Self::Regex(_) => "regex",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Exact(v) | Self::Prefix(v) | Self::Regex(v) => v,
        }
    }

    /// Formats a condition whose key is the match kind, e.g. `URI prefix: /api`.
    fn describe_unkeyed(&self, attr: &str) -> String {
        format!("{attr} {}: {}", self.kind(), self.value())
    }

    /// Formats a condition keyed by a name, e.g. `Header end-user: jason`.
    /// Non-exact values are qualified by their match kind.
    fn describe_keyed(&self, attr: &str, name: &str) -> String {
        match self {
            Self::Exact(v) => format!("{attr} {name}: {v}"),
            Self::Prefix(v) | Self::Regex(v) => format!("{attr} {name}: {} {v}", self.kind()),
        }
    }
}

// === impl MatchBlock ===

impl MatchBlock {
    /// Renders each condition of the block in a fixed order: URI, method,
    /// authority, headers, query parameters.
    pub fn conditions(&self) -> Vec<String> {
        let mut conditions = Vec::new();
        if let Some(uri) = &self.uri {
            conditions.push(uri.describe_unkeyed("URI"));
        }
        if let Some(method) = &self.method {
            conditions.push(method.describe_unkeyed("Method"));
        }
        if let Some(authority) = &self.authority {
            conditions.push(authority.describe_unkeyed("Authority"));
        }
        for (name, m) in &self.headers {
            conditions.push(m.describe_keyed("Header", name));
        }
        for (name, m) in &self.query_params {
            conditions.push(m.describe_keyed("Query", name));
        }
        conditions
    }
}

// === impl MatchPredicate ===

impl MatchPredicate {
    /// Returns a human-readable description of the predicate.
    ///
    /// Conditions are joined with `, ` and blocks with `; `. Blocks with no
    /// describable condition are left out, so the description may be empty.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MatchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for block in &self.blocks {
            let conditions = block.conditions();
            if conditions.is_empty() {
                continue;
            }
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            f.write_str(&conditions.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_headers_and_uris() {
        let predicate = MatchPredicate {
            blocks: vec![
                MatchBlock {
                    headers: vec![("end-user".to_string(), StringMatch::Exact("jason".into()))],
                    ..Default::default()
                },
                MatchBlock {
                    uri: Some(StringMatch::Prefix("/api/v2".into())),
                    headers: vec![(
                        "x-canary".to_string(),
                        StringMatch::Regex("^(1|true)$".into()),
                    )],
                    ..Default::default()
                },
            ],
        };
        assert_eq!(
            predicate.describe(),
            "Header end-user: jason; URI prefix: /api/v2, Header x-canary: regex ^(1|true)$"
        );
    }

    #[test]
    fn describes_every_condition_kind() {
        let block = MatchBlock {
            uri: Some(StringMatch::Exact("/login".into())),
            method: Some(StringMatch::Exact("POST".into())),
            authority: Some(StringMatch::Prefix("shop.".into())),
            headers: vec![("cookie".to_string(), StringMatch::Prefix("user=".into()))],
            query_params: vec![("beta".to_string(), StringMatch::Exact("1".into()))],
        };
        assert_eq!(
            block.conditions(),
            vec![
                "URI exact: /login",
                "Method exact: POST",
                "Authority prefix: shop.",
                "Header cookie: prefix user=",
                "Query beta: 1",
            ]
        );
    }

    #[test]
    fn skips_empty_blocks() {
        let predicate = MatchPredicate {
            blocks: vec![
                MatchBlock::default(),
                MatchBlock {
                    uri: Some(StringMatch::Exact("/".into())),
                    ..Default::default()
                },
                MatchBlock::default(),
            ],
        };
        assert_eq!(predicate.describe(), "URI exact: /");

        let predicate = MatchPredicate {
            blocks: vec![MatchBlock::default()],
        };
        assert_eq!(predicate.describe(), "");
    }
}
