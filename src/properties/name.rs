use tracing::warn;

/// A parsed property identifier: slash-separated path, optional `-unit`
/// suffix on the last segment, optional trailing `[index]`.
///
/// The store key excludes the unit, so `aero/alpha-rad` and `aero/alpha-deg`
/// resolve to the same property; the unit tag is kept for scale lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropName {
    pub identifier: String,
    pub nodes: Vec<String>,
    pub unit: String,
    pub index: Option<usize>,
}

impl PropName {
    pub fn parse(identifier: &str) -> Self {
        let mut s = identifier;

        let index = match s.rfind('[') {
            Some(j) => {
                let raw = s[j + 1..].trim_end_matches(']');
                let idx = raw.parse::<usize>().unwrap_or_else(|_| {
                    warn!(identifier, "bad array index, defaulting to 0");
                    0
                });
                s = &s[..j];
                Some(idx)
            }
            None => None,
        };

        let mut nodes: Vec<String> = s.split('/').map(str::to_owned).collect();
        let last = nodes.last_mut().unwrap_or_else(|| unreachable!());
        let unit = match last.rfind('-') {
            Some(i) => {
                let u = last[i + 1..].to_owned();
                last.truncate(i);
                u
            }
            None => String::new(),
        };

        PropName {
            identifier: identifier.to_owned(),
            nodes,
            unit,
            index,
        }
    }

    fn indexer(&self) -> String {
        match self.index {
            Some(i) => format!("[{}]", i),
            None => String::new(),
        }
    }

    /// Canonical store key: path plus index, unit excluded.
    pub fn key(&self) -> String {
        format!("{}{}", self.nodes.join("/"), self.indexer())
    }

    /// The identifier re-tagged with the metric default unit.
    pub fn metric_identifier(&self) -> String {
        format!("{}-1?{}", self.nodes.join("/"), self.indexer())
    }

    pub fn root(&self) -> &str {
        &self.nodes[0]
    }
}
