//! Request parameters for the grid editor endpoints.

use crate::config::DataSource;
use crate::sexpr::Operation;

/// Rows per page served by the grid editor endpoints.
pub const PAGING_SIZE: u64 = 50;

pub fn offset_for_page(page: u64) -> u64 {
    page.saturating_mul(PAGING_SIZE)
}

/// Everything needed for one fully specified fetch request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchParameters {
    pub paging_offset: u64,
    pub filter: Option<Operation>,
}

impl FetchParameters {
    pub fn new(filter: Option<Operation>, paging_offset: u64) -> Self {
        Self {
            paging_offset,
            filter,
        }
    }

    /// `filter=<sexpr>&offset=<n>`, with `filter` left out when there is none.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::with_capacity(2);
        if let Some(filter) = &self.filter {
            params.push(format!("filter={}", urlencoding::encode(&filter.to_sexpr())));
        }
        params.push(format!("offset={}", self.paging_offset));
        params.join("&")
    }
}

pub fn request_path(source: &DataSource, params: &FetchParameters) -> String {
    format!("{}?{}", source.endpoint, params.to_query_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::sexpr::{Atom, Symbol};

    #[test]
    fn test_without_filter() {
        let params = FetchParameters::new(None, offset_for_page(2));
        assert_eq!(params.to_query_string(), "offset=100");
    }

    #[test]
    fn test_offset_for_page() {
        assert_eq!(offset_for_page(0), 0);
        assert_eq!(offset_for_page(3), 150);
        assert_eq!(offset_for_page(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_filter_is_url_encoded() {
        let source = Settings::builtin().data_source("charts").unwrap();
        let symbol = Symbol::json_pointer("/title", &source.context).unwrap();
        let filter = Operation::contains(symbol, Atom::string("a&b"));
        let params = FetchParameters::new(Some(filter), 0);
        assert_eq!(
            request_path(&source, &params),
            "/api/chart-bulk-update?filter=%28CONTAINS%20%28JSON_EXTRACT%20config%20%22%2Ftitle%22%29%20%22a%26b%22%29&offset=0"
        );
    }

    #[test]
    fn test_encoded_filter_decodes_to_sexpr() {
        let source = Settings::builtin().data_source("variable-annotations").unwrap();
        let symbol = Symbol::column("variables.name", &source.context).unwrap();
        let filter = Operation::contains(symbol, Atom::string("ünï (x)"));
        let expected = filter.to_sexpr();
        let query = FetchParameters::new(Some(filter), 50).to_query_string();

        let encoded = query
            .strip_prefix("filter=")
            .and_then(|q| q.strip_suffix("&offset=50"))
            .unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), expected);
    }
}
