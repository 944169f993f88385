//! Effect token helpers
//!
//! Tokens stay plain strings in every artifact. This module holds the small
//! pieces shared by the grammar, the extractor and the graph builder: the
//! comparison operator, magnitude lookup, and the `[where=...]` filter clause.

use super::card::{Card, CardType};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Comparison operator of a magnitude token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    AtLeast,
    AtMost,
    Exactly,
}

impl Comparator {
    /// Parse `>=`, `<=` or `==`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            ">=" => Some(Comparator::AtLeast),
            "<=" => Some(Comparator::AtMost),
            "==" => Some(Comparator::Exactly),
            _ => None,
        }
    }

    /// Map an optional English qualifier ("or less", "or more") to an operator
    pub fn from_phrase(qualifier: Option<&str>) -> Self {
        match qualifier.map(|q| q.trim().to_lowercase()) {
            Some(q) if q.ends_with("less") => Comparator::AtMost,
            Some(q) if q.ends_with("more") => Comparator::AtLeast,
            _ => Comparator::Exactly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::AtLeast => ">=",
            Comparator::AtMost => "<=",
            Comparator::Exactly => "==",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn number_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"-?\d+").unwrap())
}

/// First (optionally negative) integer appearing in a token; `None` when
/// there is none or it does not fit an `i64`
pub fn first_number(token: &str) -> Option<i64> {
    number_regex()
        .find(token)
        .and_then(|m| m.as_str().parse().ok())
}

/// Filter clause attached to a token as `[where=...]`
///
/// Clauses are `;`-separated: `Category:{X}`, `CardName:{X}`, `Type:{X}`
/// (or `CardType:{X}`), `Attribute:{X}` and `Cost>=N`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereFilter {
    pub category: Option<String>,
    pub name: Option<String>,
    pub card_type: Option<String>,
    pub attribute: Option<String>,
    pub min_cost: Option<i64>,
}

fn braced_clause_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)^(Category|CardName|CardType|Type|Attribute):\{([^}]*)\}$").unwrap()
    })
}

fn min_cost_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)^Cost>=\s*(\d+)$").unwrap())
}

impl WhereFilter {
    /// Parse the body of a `[where=...]` clause, collecting every problem
    pub fn parse(body: &str) -> Result<Self, Vec<String>> {
        let mut filter = WhereFilter::default();
        let mut errors = Vec::new();

        for clause in body.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(caps) = braced_clause_regex().captures(clause) {
                let value = caps[2].trim().to_string();
                if value.is_empty() {
                    errors.push(format!("Empty value in filter clause '{}'", clause));
                    continue;
                }
                match caps[1].to_ascii_lowercase().as_str() {
                    "category" => filter.category = Some(value),
                    "cardname" => filter.name = Some(value),
                    "attribute" => filter.attribute = Some(value),
                    _ => filter.card_type = Some(value),
                }
            } else if let Some(caps) = min_cost_regex().captures(clause) {
                filter.min_cost = caps[1].parse().ok();
            } else {
                errors.push(format!("Unrecognized filter clause '{}'", clause));
            }
        }

        if errors.is_empty() && filter.is_empty() {
            errors.push("Filter must name at least one clause".to_string());
        }

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.name.is_none()
            && self.card_type.is_none()
            && self.attribute.is_none()
            && self.min_cost.is_none()
    }

    /// The most specific detail, used to label edges
    pub fn detail(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.category.as_deref())
            .or(self.card_type.as_deref())
            .or(self.attribute.as_deref())
    }

    /// Whether a card satisfies every clause of this filter
    pub fn matches(&self, card: &Card) -> bool {
        if !card.card_type.is_known() {
            return false;
        }
        if let Some(wanted) = &self.card_type {
            if card.card_type != CardType::parse(wanted) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !card.has_category(category) {
                return false;
            }
        }
        if let (Some(min), Some(cost)) = (self.min_cost, card.cost) {
            if cost < min {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !card.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(attribute) = &self.attribute {
            if !card.has_attribute(attribute) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for WhereFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses = Vec::new();
        if let Some(category) = &self.category {
            clauses.push(format!("Category:{{{}}}", category));
        }
        if let Some(name) = &self.name {
            clauses.push(format!("CardName:{{{}}}", name));
        }
        if let Some(card_type) = &self.card_type {
            clauses.push(format!("Type:{{{}}}", card_type));
        }
        if let Some(attribute) = &self.attribute {
            clauses.push(format!("Attribute:{{{}}}", attribute));
        }
        if let Some(min_cost) = self.min_cost {
            clauses.push(format!("Cost>={}", min_cost));
        }
        write!(f, "[where={}]", clauses.join("; "))
    }
}
