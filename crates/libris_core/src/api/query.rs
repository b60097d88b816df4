//! List query parameter parsing.

use crate::repo::book_repo::{BookListQuery, BookOrder, BookSortField};
use crate::repo::post_repo::PostListQuery;
use crate::validation::{normalize_tag, FieldErrors};
use std::collections::BTreeMap;

/// Raw query string parameters keyed by name.
pub type QueryParams = BTreeMap<String, String>;

/// Returns the trimmed parameter, treating blank values as absent.
fn param<'a>(params: &'a QueryParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Parses `ordering=title,-publication_year`. Unknown fields are dropped.
pub fn parse_ordering(value: &str) -> Vec<BookOrder> {
    value
        .split(',')
        .map(str::trim)
        .filter_map(|term| match term.strip_prefix('-') {
            Some(field) => BookSortField::parse(field).map(BookOrder::descending),
            None => BookSortField::parse(term).map(BookOrder::ascending),
        })
        .collect()
}

/// Book list filters, search, ordering and limit.
pub fn parse_book_list_query(params: &QueryParams) -> Result<BookListQuery, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut query = BookListQuery {
        title: param(params, "title").map(str::to_string),
        author: param(params, "author").map(str::to_string),
        search: param(params, "search").map(str::to_string),
        ordering: param(params, "ordering")
            .map(parse_ordering)
            .unwrap_or_default(),
        ..BookListQuery::default()
    };

    if let Some(year) = param(params, "publication_year") {
        match year.parse::<i32>() {
            Ok(year) => query.publication_year = Some(year),
            Err(_) => errors.add("publication_year", "Enter a number."),
        }
    }
    if let Some(limit) = param(params, "limit") {
        match limit.parse::<u32>() {
            Ok(limit) => query.limit = Some(limit),
            Err(_) => errors.add("limit", "A valid integer is required."),
        }
    }

    errors.into_result(|| query)
}

/// Post list search and tag filter.
pub fn parse_post_list_query(params: &QueryParams) -> PostListQuery {
    PostListQuery {
        search: param(params, "search").map(str::to_string),
        tag: param(params, "tag").and_then(normalize_tag),
        ..PostListQuery::default()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_book_list_query, parse_ordering, parse_post_list_query, QueryParams};
    use crate::repo::book_repo::{BookOrder, BookSortField};

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn ordering_accepts_descending_prefix_and_drops_unknown() {
        assert_eq!(
            parse_ordering("-publication_year, bogus ,title"),
            vec![
                BookOrder::descending(BookSortField::PublicationYear),
                BookOrder::ascending(BookSortField::Title),
            ]
        );
        assert!(parse_ordering("id").is_empty());
    }

    #[test]
    fn book_query_collects_filters() {
        let query = parse_book_list_query(&params(&[
            ("publication_year", "1937"),
            ("search", " Hobbit "),
            ("title", ""),
        ]))
        .expect("valid query");
        assert_eq!(query.publication_year, Some(1937));
        assert_eq!(query.search.as_deref(), Some("Hobbit"));
        assert_eq!(query.title, None);
    }

    #[test]
    fn invalid_year_filter_is_a_field_error() {
        let errors = parse_book_list_query(&params(&[("publication_year", "nineteen")]))
            .expect_err("year must be numeric");
        assert!(errors.contains("publication_year"));
    }

    #[test]
    fn post_tag_filter_is_normalized() {
        let query = parse_post_list_query(&params(&[("tag", " Rust ")]));
        assert_eq!(query.tag.as_deref(), Some("rust"));
    }
}
