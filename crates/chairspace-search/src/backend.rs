//! The seam between the search form and the booking back-end.
//!
//! The transport itself lives outside this crate. [`Backend`] receives a
//! fully built [`SearchRequest`]; [`submit_search`] is the submit path the
//! UI runs: validate, build parameters, hand them over.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::calendar::DateArithmetic;
use crate::config::SearchConfig;
use crate::criteria::{ErrorMessages, SearchForm};
use crate::error::{Result, SearchError};
use crate::query::QueryParams;

/// A page of search parameters ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub params: QueryParams,
    /// 0-based page index.
    pub page: u32,
    pub items_per_page: Option<u32>,
}

impl SearchRequest {
    pub fn new(params: QueryParams) -> Self {
        SearchRequest {
            params,
            page: 0,
            items_per_page: None,
        }
    }

    pub fn with_page(self, page: u32) -> Self {
        SearchRequest { page, ..self }
    }

    pub fn with_items_per_page(self, items_per_page: Option<u32>) -> Self {
        SearchRequest {
            items_per_page,
            ..self
        }
    }

    /// The search parameters plus paging.
    pub fn query(&self) -> QueryParams {
        let mut query = self.params.clone();
        query.insert("page", self.page.to_string());
        query.insert_opt("items-per-page", self.items_per_page.map(|n| n.to_string()));
        query
    }

    /// The full GET URL against the configured search endpoint.
    pub fn to_url(&self, config: &SearchConfig) -> Result<Url> {
        let mut url = config.search_endpoint()?;
        url.set_query(Some(&self.query().to_query_string()));
        Ok(url)
    }
}

/// A space as listed in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area_type_id: Option<String>,
    #[serde(default)]
    pub area_feature_ids: BTreeSet<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub reservable: Option<bool>,
}

/// Something that can run a search request.
pub trait Backend {
    type Error;

    fn search(&self, request: &SearchRequest) -> std::result::Result<Vec<SpaceSummary>, Self::Error>;
}

/// What the submit path produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the back-end was not called.
    Invalid(ErrorMessages),
    Results(Vec<SpaceSummary>),
}

#[derive(Error, Debug)]
pub enum SubmitError<E> {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Backend error: {0}")]
    Backend(E),
}

/// Paging for [`submit_search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub items_per_page: Option<u32>,
}

/// Validate the form and, if it passes, send its parameters to `backend`.
pub fn submit_search<A, B>(
    form: &mut SearchForm<A>,
    backend: &B,
    today: NaiveDate,
    paging: PageRequest,
) -> std::result::Result<SubmitOutcome, SubmitError<B::Error>>
where
    A: DateArithmetic,
    B: Backend,
{
    if !form.validate() {
        debug!("search not submitted: criteria invalid");
        return Ok(SubmitOutcome::Invalid(form.error_messages().clone()));
    }

    let request = SearchRequest::new(form.create_query_params(today)?)
        .with_page(paging.page)
        .with_items_per_page(paging.items_per_page);
    let results = backend.search(&request).map_err(SubmitError::Backend)?;
    info!(page = paging.page, results = results.len(), "search completed");

    Ok(SubmitOutcome::Results(results))
}
