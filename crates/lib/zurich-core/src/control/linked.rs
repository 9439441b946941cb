use zurich_model::SparqlResultSet;

use super::{ControlError, OpenDataControlPlane};

/// Accepts queries whose trimmed text starts with `SELECT` or `PREFIX`,
/// ignoring case.
///
/// This is a prefix check only. A `PREFIX` header followed by an update
/// form passes, so the endpoint itself must stay read-only.
#[must_use]
pub fn is_read_query(query: &str) -> bool {
    let head = query.trim_start();
    ["SELECT", "PREFIX"].iter().any(|keyword| {
        head.get(..keyword.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(keyword))
    })
}

impl OpenDataControlPlane {
    /// Runs a read query on the linked data endpoint.
    ///
    /// # Errors
    /// Returns `ControlError::QueryRejected` without any request when the
    /// query fails [`is_read_query`], and `ControlError::Backend` if the
    /// request fails.
    pub async fn sparql(&self, query: &str) -> Result<SparqlResultSet, ControlError> {
        if !is_read_query(query) {
            return Err(ControlError::QueryRejected);
        }
        Ok(self.sparql.query(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_accepts_select_and_prefix() {
        assert!(is_read_query("SELECT * WHERE { ?s ?p ?o } LIMIT 10"));
        assert!(is_read_query("  \n select ?s WHERE { ?s ?p ?o }"));
        assert!(is_read_query("PREFIX schema: <http://schema.org/> SELECT * {}"));
    }

    #[test]
    fn guard_rejects_other_forms() {
        assert!(!is_read_query("INSERT DATA { <a> <b> <c> }"));
        assert!(!is_read_query("DELETE WHERE { ?s ?p ?o }"));
        assert!(!is_read_query("ASK { ?s ?p ?o }"));
        assert!(!is_read_query("SEL"));
        assert!(!is_read_query("ü"));
    }
}
