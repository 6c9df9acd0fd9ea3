// src/services/selectors.rs

//! Ordered-fallback selector resolution.
//!
//! The board's markup has shipped several structural generations, so every
//! semantic field is located through an ordered list of selector candidates,
//! most specific first. The first candidate producing a plausible match wins
//! and later candidates are never evaluated. Exhausting the list is not an
//! error; callers treat it as "field unavailable".

use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};
use crate::utils::element_text;

/// Ordered CSS selector candidates for one semantic field.
pub struct SelectorChain {
    field: &'static str,
    candidates: Vec<Selector>,
}

impl SelectorChain {
    /// Parse the candidate list. Fails fast on an invalid selector literal.
    pub fn new(field: &'static str, specs: &[&str]) -> Result<Self> {
        let candidates = specs
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { field, candidates })
    }

    /// The semantic field this chain locates, for log messages.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// All matches from the first candidate that yields any.
    pub fn resolve_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for candidate in &self.candidates {
            let matches: Vec<_> = scope.select(candidate).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    /// First match across candidates, in candidate order.
    pub fn resolve_first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.resolve_where(scope, |_| true)
    }

    /// First match passing the plausibility predicate.
    ///
    /// A candidate whose matches all fail the predicate falls through to the
    /// next candidate.
    pub fn resolve_where<'a, F>(&self, scope: ElementRef<'a>, accept: F) -> Option<ElementRef<'a>>
    where
        F: Fn(&ElementRef<'a>) -> bool,
    {
        for candidate in &self.candidates {
            if let Some(found) = scope.select(candidate).find(|element| accept(element)) {
                return Some(found);
            }
        }
        None
    }

    /// Normalized text of the first match whose text passes the predicate.
    pub fn resolve_text<F>(&self, scope: ElementRef<'_>, accept: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        for candidate in &self.candidates {
            for element in scope.select(candidate) {
                let text = element_text(&element);
                if accept(&text) {
                    return Some(text);
                }
            }
        }
        None
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
