//! Facility detail page parsing

use crate::config::{DetailConfig, FACILITY_NAME_LABEL};
use crate::extract::fields::{extract_field, read_labeled_rows};
use crate::extract::substances::{is_substance_table, parse_table};
use crate::extract::table::{compile_selector, element_text, read_table, TableSelectors};
use crate::model::SubstanceEntry;
use crate::ConfigResult;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

/// Information extracted from one facility detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// Identity fields found, keyed by configured label
    pub identity_fields: BTreeMap<String, String>,

    /// Substance rows from tables rendered directly in the page
    pub embedded_substances: Vec<SubstanceEntry>,
}

/// Parser for facility detail pages, with selectors compiled once
#[derive(Debug, Clone)]
pub struct DetailParser {
    identity_selectors: Vec<Selector>,
    title_selector: Selector,
    table_selector: Selector,
    structure: TableSelectors,
    labels: Vec<String>,
}

impl DetailParser {
    /// Compiles the configured selectors
    pub fn from_config(config: &DetailConfig) -> ConfigResult<Self> {
        Ok(Self {
            identity_selectors: config
                .identity_selectors
                .iter()
                .map(|s| compile_selector(s))
                .collect::<Result<_, _>>()?,
            title_selector: compile_selector(&config.title_selector)?,
            table_selector: compile_selector("table")?,
            structure: TableSelectors::new()?,
            labels: config
                .identity_labels
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        })
    }

    /// Parses a detail page
    ///
    /// The identity table is the first table matched by the identity
    /// selectors, tried in priority order. When the facility name is not in
    /// that table it is taken from the page title.
    ///
    /// # Errors
    ///
    /// Returns a message when the page has neither an identity table nor a
    /// title, which means it is not a detail page at all.
    pub fn parse(&self, html: &str) -> Result<DetailPage, String> {
        let document = Html::parse_document(html);

        let identity_table = self
            .identity_selectors
            .iter()
            .find_map(|selector| document.select(selector).next());

        let mut identity_fields = BTreeMap::new();
        if let Some(table) = &identity_table {
            let rows = read_labeled_rows(table, &self.structure);
            for label in &self.labels {
                if let Some(value) = extract_field(&rows, label).filter(|v| !v.is_empty()) {
                    identity_fields.insert(label.clone(), value.to_string());
                }
            }
        }

        let mut found_title = false;
        if !identity_fields.contains_key(FACILITY_NAME_LABEL) {
            if let Some(title) = document
                .select(&self.title_selector)
                .next()
                .map(|el| element_text(&el))
                .filter(|t| !t.is_empty())
            {
                identity_fields.insert(FACILITY_NAME_LABEL.to_string(), title);
                found_title = true;
            }
        }

        if identity_table.is_none() && !found_title {
            return Err("no identity table or title found in detail page".to_string());
        }

        let embedded_substances = document
            .select(&self.table_selector)
            .map(|table| read_table(&table, &self.structure))
            .filter(is_substance_table)
            .flat_map(|table| parse_table(&table))
            .collect();

        Ok(DetailPage {
            identity_fields,
            embedded_substances,
        })
    }
}
