//! Compiled rule tables and the cleaning transform.

use crate::consts;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::instrument;

static BUILTIN: LazyLock<Rules> = LazyLock::new(|| {
    let removals = consts::TRACKING_KEYS.iter().map(|(key, prefixed)| consts::tracking_pattern(key, *prefixed));
    // Infallible: the builtin tables are covered by tests.
    Rules::new(removals, consts::REDIRECTS.iter().copied()).expect("builtin rules compile")
});

/// A rewrite of one URL shape into another, using `$n` capture references.
#[derive(Debug, Clone)]
struct Redirect {
    pattern: Regex,
    replacement: String,
}

/// Immutable, compiled-once set of canonicalization rules.
///
/// Removal rules delete every match (in list order, each applied to the
/// output of the previous one); redirect rules then rewrite the result, also
/// in list order. Nothing else is normalized: stray `?` or `&` characters left
/// behind by a deletion stay exactly where they are, because stored URLs are
/// compared byte for byte.
#[derive(Debug, Clone)]
pub struct Rules {
    removals: Vec<Regex>,
    redirects: Vec<Redirect>,
}

impl Rules {
    /// Compile a custom rule table.
    ///
    /// `removals` are full patterns (key, value and separator); `redirects`
    /// are `(pattern, replacement)` pairs.
    pub fn new<Q, P, R>(removals: impl IntoIterator<Item = Q>, redirects: impl IntoIterator<Item = (P, R)>) -> Result<Self>
    where
        Q: AsRef<str>,
        P: AsRef<str>,
        R: Into<String>,
    {
        let removals = removals.into_iter().map(|p| compile(p.as_ref())).collect::<Result<Vec<_>>>()?;
        let redirects = redirects
            .into_iter()
            .map(|(pattern, replacement)| {
                Ok(Redirect {
                    pattern: compile(pattern.as_ref())?,
                    replacement: replacement.into(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { removals, redirects })
    }

    /// The process-wide builtin rule table (ClearURLs tracking keys plus the
    /// known blog redirect shapes).
    pub fn builtin() -> &'static Rules {
        &BUILTIN
    }

    /// Number of removal rules, then number of redirect rules.
    pub fn counts(&self) -> (usize, usize) {
        (self.removals.len(), self.redirects.len())
    }

    /// Canonicalize a URL.
    ///
    /// One pass is removal followed by redirects. Passes are repeated until
    /// the output stops changing, so the result is always a fixed point.
    ///
    /// The builtin tables always converge: a removal only ever shortens the
    /// URL and no redirect matches its own output. A custom table that keeps
    /// growing the URL is cut off after [`pass_limit`] passes.
    #[instrument(level = "debug", skip(self))]
    pub fn clean(&self, url: &str) -> String {
        let limit = pass_limit(url);
        let mut current = url.to_string();
        for _ in 0..limit {
            let next = self.pass(&current);
            if next == current {
                tracing::debug!(cleaned = %current, "URL cleaned");
                return current;
            }
            current = next;
        }
        tracing::warn!(limit, "Rules did not converge, keeping the last pass");
        current
    }

    fn pass(&self, url: &str) -> String {
        let mut url = url.to_string();
        for rule in &self.removals {
            if let Cow::Owned(replaced) = rule.replace_all(&url, "") {
                url = replaced;
            }
        }
        for redirect in &self.redirects {
            if let Cow::Owned(replaced) = redirect.pattern.replace_all(&url, redirect.replacement.as_str()) {
                url = replaced;
            }
        }
        url
    }
}

/// Passes allowed for `url`: every pass that changes anything either
/// deletes at least one parameter or rewrites one redirect occurrence, and
/// there are fewer of those than bytes in the URL.
fn pass_limit(url: &str) -> usize {
    url.len().saturating_mul(2) + consts::PASS_SLACK
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))
}
