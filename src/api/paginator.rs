use super::ApiClient;
use crate::{
    error::{Error, Result},
    http::HttpTransport,
};
use futures::{stream, Stream, TryStreamExt};
use serde_json::Value;

/// Walks a paged list resource using `offset`/`limit` query parameters.
///
/// Pages are fetched one at a time, only when asked for. A page shorter than
/// the limit marks the end of the collection. Once exhausted (or after a
/// failed fetch) a paginator stays exhausted; create a new one to start over.
#[derive(Debug)]
pub struct Paginator<'a, T: HttpTransport> {
    client: &'a mut ApiClient<T>,
    resource: String,
    params: Vec<(String, String)>,
    limit: usize,
    offset: usize,
    fetches: usize,
    done: bool,
}

impl<'a, T: HttpTransport> Paginator<'a, T> {
    pub fn new(
        client: &'a mut ApiClient<T>,
        resource: impl Into<String>,
        mut params: Vec<(String, String)>,
        limit: usize,
    ) -> Self {
        // The cursor owns these two.
        params.retain(|(key, _)| key != "offset" && key != "limit");
        Self {
            client,
            resource: resource.into(),
            params,
            limit: limit.max(1),
            offset: 0,
            fetches: 0,
            done: false,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The offset the next page will be requested from.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// How many requests have been issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Returns true if there may be more pages to fetch.
    pub fn has_next(&self) -> bool {
        !self.done
    }

    /// Fetches the next page of items, or `None` once the collection is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.done {
            return Ok(None);
        }

        let mut query = self.params.clone();
        query.push(("offset".to_string(), self.offset.to_string()));
        query.push(("limit".to_string(), self.limit.to_string()));

        self.fetches += 1;
        let items = match self.client.get(&self.resource, &query).await {
            Ok(response) => response.result().map(|model| page_items(model.as_value())),
            Err(error) => Err(error),
        };
        let items = match items {
            Ok(items) => items,
            Err(error) => {
                self.done = true;
                return Err(error);
            }
        };

        tracing::debug!(
            resource = %self.resource,
            offset = self.offset,
            items = items.len(),
            "fetched page"
        );

        self.offset += self.limit;
        if items.len() < self.limit {
            self.done = true;
        }

        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(items))
    }

    /// Collects all remaining items from all pages.
    pub async fn collect_all(&mut self) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();

        while let Some(page) = self.next_page().await? {
            all_items.extend(page);
        }

        Ok(all_items)
    }

    /// Turns the paginator into a stream of individual items.
    ///
    /// A failed fetch is yielded once and ends the stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value>> + 'a {
        stream::try_unfold(self, |mut pages| async move {
            let page = pages.next_page().await?;
            Ok::<_, Error>(page.map(|page| (page, pages)))
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<Value, Error>)))
        .try_flatten()
    }
}

/// Items live under `results`; some resources reply with a bare array instead.
fn page_items(body: &Value) -> Vec<Value> {
    body.get("results")
        .or(Some(body))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
