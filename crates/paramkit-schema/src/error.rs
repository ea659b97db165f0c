use std::{collections::BTreeMap, fmt};

///
/// ErrorTree
///
/// Route-aware error aggregation. Messages hang off the node that raised
/// them; children are keyed by route segment (`ViewParams` > `UseVBO`).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    messages: Vec<String>,
    children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, message: impl ToString) {
        self.messages.push(message.to_string());
    }

    pub fn add_at(&mut self, route: impl Into<String>, message: impl ToString) {
        self.children
            .entry(route.into())
            .or_default()
            .add(message);
    }

    /// Attach a child tree under `route`; empty trees are dropped.
    pub fn merge(&mut self, route: impl Into<String>, tree: Self) {
        if tree.is_empty() {
            return;
        }

        let child = self.children.entry(route.into()).or_default();
        child.messages.extend(tree.messages);
        for (k, v) in tree.children {
            child.merge(k, v);
        }
    }

    pub fn merge_result(&mut self, route: impl Into<String>, result: Result<(), Self>) {
        if let Err(tree) = result {
            self.merge(route, tree);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// `(route, message)` pairs, routes joined with `.`.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for m in &self.messages {
            out.push((prefix.to_string(), m.clone()));
        }
        for (k, child) in &self.children {
            let route = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            child.flatten_into(&route, out);
        }
    }

    /// True if any message at any depth contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.flatten().iter().any(|(_, m)| m.contains(needle))
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.flatten();
        for (i, (route, msg)) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if route.is_empty() {
                write!(f, "{msg}")?;
            } else {
                write!(f, "{route}: {msg}")?;
            }
        }

        Ok(())
    }
}

impl From<String> for ErrorTree {
    fn from(message: String) -> Self {
        let mut tree = Self::new();
        tree.add(message);

        tree
    }
}

///
/// err!
/// format a message straight into an ErrorTree
///

#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_flatten_in_order() {
        let mut child = ErrorTree::new();
        child.add("bad default");

        let mut errs = ErrorTree::new();
        err!(errs, "class '{}' failed", "ViewParams");
        errs.merge("ViewParams", child);
        errs.add_at("Alpha", "duplicate");

        assert_eq!(
            errs.flatten(),
            vec![
                (String::new(), "class 'ViewParams' failed".to_string()),
                ("Alpha".to_string(), "duplicate".to_string()),
                ("ViewParams".to_string(), "bad default".to_string()),
            ]
        );
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn empty_children_do_not_count() {
        let mut errs = ErrorTree::new();
        errs.merge("Quiet", ErrorTree::new());
        errs.merge_result("AlsoQuiet", Ok(()));

        assert!(errs.result().is_ok());
    }

    #[test]
    fn display_prefixes_routes() {
        let mut errs = ErrorTree::new();
        errs.add_at("ViewParams", "empty store root");

        assert_eq!(errs.to_string(), "ViewParams: empty store root");
    }
}
