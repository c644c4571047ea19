//! Relay-style cursor pagination
//!
//! Cursors are opaque base64 strings wrapping the absolute position of a row
//! in a stable ordering. Every page is bounded: callers can never ask for more
//! than [`MAX_PAGE_SIZE`] rows at once.

use std::borrow::Cow;

use async_graphql::{InputObject, Object, OutputType, SimpleObject, TypeName};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::SubgraphError;

/// Rows returned when neither `first` nor `last` is given
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound for `first` / `last`
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page information
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Edge in a connection
#[derive(Debug, Clone)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

impl<T: OutputType> TypeName for Edge<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Edge", <T as OutputType>::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Edge<T> {
    async fn cursor(&self) -> &str {
        &self.cursor
    }

    async fn node(&self) -> &T {
        &self.node
    }
}

/// Connection (paginated result)
#[derive(Debug, Clone)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T: OutputType> TypeName for Connection<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Connection", <T as OutputType>::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Connection<T> {
    async fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    async fn page_info(&self) -> &PageInfo {
        &self.page_info
    }
}

impl<T> Connection<T> {
    /// Create a connection from the rows of `window`
    ///
    /// `total` is the size of the whole ordered result, used to work out
    /// whether more rows follow the window.
    pub fn from_window(items: Vec<T>, window: PageWindow, total: u64) -> Self {
        let edges: Vec<Edge<T>> = items
            .into_iter()
            .enumerate()
            .map(|(idx, node)| Edge {
                cursor: CursorCodec::encode_offset(window.offset + idx as u64),
                node,
            })
            .collect();

        let start_cursor = edges.first().map(|e| e.cursor.clone());
        let end_cursor = edges.last().map(|e| e.cursor.clone());
        let end = window.offset + edges.len() as u64;

        Self {
            edges,
            page_info: PageInfo {
                has_next_page: end < total,
                has_previous_page: window.offset > 0,
                start_cursor,
                end_cursor,
            },
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }
}

/// Cursor encoding/decoding
pub struct CursorCodec;

impl CursorCodec {
    /// Encode cursor to base64
    pub fn encode(value: &str) -> String {
        BASE64.encode(value.as_bytes())
    }

    /// Decode cursor from base64
    pub fn decode(cursor: &str) -> crate::Result<String> {
        let bytes = BASE64
            .decode(cursor.as_bytes())
            .map_err(|e| SubgraphError::InvalidCursor(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| SubgraphError::InvalidCursor(e.to_string()))
    }

    /// Encode the absolute position of a row
    pub fn encode_offset(offset: u64) -> String {
        Self::encode(&format!("offset:{}", offset))
    }

    /// Decode a cursor produced by [`CursorCodec::encode_offset`]
    pub fn decode_offset(cursor: &str) -> crate::Result<u64> {
        let decoded = Self::decode(cursor)?;
        decoded
            .strip_prefix("offset:")
            .and_then(|raw| raw.parse::<u64>().ok())
            .ok_or_else(|| SubgraphError::InvalidCursor(format!("not an offset cursor: {}", cursor)))
    }
}

/// Slice of an ordered result: `limit` rows starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Pagination input for GraphQL queries
///
/// Follows the Relay Cursor Connections Specification:
/// https://relay.dev/graphql/connections.htm
#[derive(InputObject, Debug, Clone, Default)]
pub struct PaginationInput {
    /// Number of items to return (forward pagination)
    pub first: Option<i32>,

    /// Cursor to start from (forward pagination)
    pub after: Option<String>,

    /// Number of items to return (backward pagination)
    pub last: Option<i32>,

    /// Cursor to start from (backward pagination)
    pub before: Option<String>,
}

impl PaginationInput {
    pub fn forward(count: i32) -> Self {
        Self {
            first: Some(count),
            ..Self::default()
        }
    }

    /// Validate pagination input
    pub fn validate(&self) -> crate::Result<()> {
        if self.first.is_some() && self.last.is_some() {
            return Err(SubgraphError::Pagination(
                "Cannot specify both 'first' and 'last'".to_string(),
            ));
        }

        check_count("first", self.first)?;
        check_count("last", self.last)?;

        Ok(())
    }

    /// Work out which rows of a `total`-row result this input selects
    pub fn window(&self, total: u64) -> crate::Result<PageWindow> {
        self.validate()?;

        let mut lo = match &self.after {
            Some(cursor) => CursorCodec::decode_offset(cursor)?.saturating_add(1),
            None => 0,
        };
        let mut hi = match &self.before {
            Some(cursor) => CursorCodec::decode_offset(cursor)?,
            None => total,
        };
        hi = hi.min(total);
        lo = lo.min(hi);

        match (self.first, self.last) {
            (Some(first), _) => hi = hi.min(lo + first as u64),
            (None, Some(last)) => lo = lo.max(hi.saturating_sub(last as u64)),
            (None, None) => hi = hi.min(lo + DEFAULT_PAGE_SIZE),
        }

        Ok(PageWindow {
            offset: lo,
            limit: hi - lo,
        })
    }
}

fn check_count(name: &str, count: Option<i32>) -> crate::Result<()> {
    match count {
        Some(n) if n < 0 => Err(SubgraphError::Pagination(format!(
            "'{}' must be non-negative",
            name
        ))),
        Some(n) if n as u64 > MAX_PAGE_SIZE => Err(SubgraphError::Pagination(format!(
            "'{}' cannot exceed {}",
            name, MAX_PAGE_SIZE
        ))),
        _ => Ok(()),
    }
}
