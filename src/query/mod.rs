//! Dimensional queries and their JAQL request form.
//!
//! ```text
//! QueryDescription ──to_jaql_query──▶ JaqlQuery
//!   dimensions  → panel "rows"      (+ in.selected for matching highlights)
//!   measures    → panel "measures"
//!   filters     → panel "scope"     (instanceid = filter guid)
//!   highlights  → panel "scope"     when no dimension matches
//! ```

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ModelResult, TranslatableError};
use crate::jaql::{DataSource, InJaql, JaqlElement, JaqlQuery, MetadataItem, Panel};
use crate::model::filter::{
    factory, filter_from_jaql, filter_from_metadata_item, new_guid, FilterRelations,
};
use crate::model::{Attribute, Filter, Measure};

/// Everything needed to run a query against a data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescription {
    pub data_source: DataSource,
    pub dimensions: Vec<Attribute>,
    pub measures: Vec<Measure>,
    pub filters: Vec<Filter>,
    pub filter_relations: Option<FilterRelations>,
    /// Filters that mark rows instead of removing them
    pub highlights: Vec<Filter>,
    pub count: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryDescription {
    pub fn new(data_source: DataSource) -> Self {
        Self {
            data_source,
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, dimension: Attribute) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_highlight(mut self, highlight: Filter) -> Self {
        self.highlights.push(highlight);
        self
    }

    pub fn with_relations(mut self, relations: FilterRelations) -> Self {
        self.filter_relations = Some(relations);
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Check the query can be sent.
    pub fn validate(&self) -> ModelResult<()> {
        if self.data_source.title.trim().is_empty() {
            return Err(TranslatableError::new("errors.query.missingDataSource"));
        }
        if self.dimensions.is_empty() && self.measures.is_empty() {
            return Err(TranslatableError::new("errors.query.empty"));
        }
        if let Some(relations) = &self.filter_relations {
            let known: HashSet<&str> = self.filters.iter().map(Filter::guid).collect();
            let missing = relations
                .guids()
                .into_iter()
                .find(|g| !known.contains(g.as_str()));
            if let Some(missing) = missing {
                return Err(TranslatableError::new("errors.filterRelations.unknownFilter")
                    .with_param("guid", missing));
            }
        }
        Ok(())
    }

    /// Build the JAQL request payload.
    pub fn to_jaql_query(&self) -> ModelResult<JaqlQuery> {
        self.validate()?;
        Ok(JaqlQuery {
            query_guid: new_guid(),
            ..self.jaql_query_unchecked()
        })
    }

    /// The request payload without validation and without a query guid.
    pub fn jaql_query_unchecked(&self) -> JaqlQuery {
        JaqlQuery {
            datasource: self.data_source.clone(),
            metadata: self.metadata(),
            count: self.count,
            offset: self.offset,
            filter_relations: self.filter_relations.as_ref().map(FilterRelations::to_jaql),
            query_guid: String::new(),
        }
    }

    /// Metadata items in panel order: rows, measures, scope.
    pub fn metadata(&self) -> Vec<MetadataItem> {
        let mut metadata = Vec::new();
        let mut used_highlights = HashSet::new();

        for dimension in &self.dimensions {
            let mut item = dimension.metadata_item().with_panel(Panel::Rows);
            let dim_id = dimension.id();
            let highlight = self.highlights.iter().enumerate().find(|(_, h)| {
                !h.is_disabled()
                    && h.attribute().map(Attribute::id).as_deref() == Some(dim_id.as_str())
            });
            if let Some((index, highlight)) = highlight {
                item.jaql.in_selection = Some(InJaql::selected(highlight.jaql_element()));
                used_highlights.insert(index);
            }
            metadata.push(item);
        }

        metadata.extend(
            self.measures
                .iter()
                .map(|m| m.metadata_item().with_panel(Panel::Measures)),
        );

        for filter in &self.filters {
            metadata.extend(scope_items(filter));
        }

        for (index, highlight) in self.highlights.iter().enumerate() {
            if used_highlights.contains(&index) || highlight.is_disabled() {
                continue;
            }
            debug!(guid = highlight.guid(), "highlight has no matching dimension, sent as filter");
            metadata.extend(scope_items(highlight));
        }

        metadata
    }

    /// Rebuild a description from a JAQL request.
    ///
    /// Scope items sharing an instanceid are read back as one cascading
    /// filter. Highlights sent as scope items come back as filters.
    pub fn from_jaql(query: &JaqlQuery) -> ModelResult<Self> {
        let mut description = QueryDescription::new(query.datasource.clone());
        description.count = query.count;
        description.offset = query.offset;

        let mut scope: Vec<&MetadataItem> = Vec::new();
        for item in &query.metadata {
            match item.panel {
                Some(Panel::Measures) => {
                    description.measures.push(Measure::from_jaql(&item.jaql)?)
                }
                Some(Panel::Scope) => scope.push(item),
                Some(Panel::Rows) | Some(Panel::Columns) => {
                    description.read_dimension(&item.jaql)?
                }
                None if item.jaql.is_measure() && item.jaql.filter.is_none() => {
                    description.measures.push(Measure::from_jaql(&item.jaql)?)
                }
                None if item.jaql.filter.is_some() => scope.push(item),
                None => description.read_dimension(&item.jaql)?,
            }
        }

        description.filters = group_scope_items(&scope);

        if let Some(relations) = &query.filter_relations {
            description.filter_relations =
                Some(FilterRelations::from_jaql(relations, &description.filters)?);
        }
        Ok(description)
    }

    fn read_dimension(&mut self, jaql: &JaqlElement) -> ModelResult<()> {
        let mut attr_el = jaql.clone();
        let selection = attr_el.in_selection.take();
        attr_el.filter = None;
        self.dimensions.push(Attribute::from_jaql(&attr_el)?);
        if let Some(selection) = selection {
            self.highlights.push(filter_from_jaql(&selection.selected.jaql, None));
        }
        Ok(())
    }
}

/// Scope items for a filter; every item carries the filter guid.
fn scope_items(filter: &Filter) -> Vec<MetadataItem> {
    filter
        .metadata_items()
        .into_iter()
        .map(|mut item| {
            item.panel = Some(Panel::Scope);
            item.instanceid = Some(filter.guid().to_string());
            item
        })
        .collect()
}

fn group_scope_items(items: &[&MetadataItem]) -> Vec<Filter> {
    let mut filters = Vec::new();
    let mut index = 0;
    while index < items.len() {
        let item = items[index];
        let mut end = index + 1;
        if let Some(id) = &item.instanceid {
            while end < items.len() && items[end].instanceid.as_ref() == Some(id) {
                end += 1;
            }
        }
        if end - index > 1 {
            let levels = items[index..end]
                .iter()
                .map(|level| filter_from_jaql(&level.jaql, None))
                .collect();
            let mut filter = factory::cascading(levels);
            if let Some(id) = &item.instanceid {
                filter = filter.with_guid(id.clone());
            }
            filters.push(filter);
        } else {
            filters.push(filter_from_metadata_item(item));
        }
        index = end;
    }
    filters
}
