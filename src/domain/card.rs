//! Card metadata and the card database
//!
//! Cards are static inputs: the pipeline reads them, never mutates them.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separator that marks alternate-art variants (e.g. `OP01-001_p1`)
pub const ALT_ART_SEPARATOR: char = '_';

/// Alternate-art variants are excluded from tagging and from graph nodes
pub fn is_alt_art(card_id: &str) -> bool {
    card_id.contains(ALT_ART_SEPARATOR)
}

/// Printed card type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CardType {
    Leader,
    Character,
    Event,
    Stage,
    /// Anything the database spells differently (DON!! cards, blanks)
    #[default]
    Other,
}

impl CardType {
    /// Parse a card type case-insensitively; unknown strings become `Other`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LEADER" => CardType::Leader,
            "CHARACTER" => CardType::Character,
            "EVENT" => CardType::Event,
            "STAGE" => CardType::Stage,
            _ => CardType::Other,
        }
    }

    /// Character, Event and Stage cards are played from hand
    pub fn is_playable(&self) -> bool {
        matches!(self, CardType::Character | CardType::Event | CardType::Stage)
    }

    /// The four real card types (Leader plus the playable ones)
    pub fn is_known(&self) -> bool {
        !matches!(self, CardType::Other)
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Leader => "Leader",
            CardType::Character => "Character",
            CardType::Event => "Event",
            CardType::Stage => "Stage",
            CardType::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

impl Serialize for CardType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string().to_uppercase())
    }
}

impl<'de> Deserialize<'de> for CardType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| CardType::parse(&s)).unwrap_or_default())
    }
}

/// One entry of the card database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cost: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub power: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attribute: String,
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub card_set_code: Option<String>,
}

impl Card {
    pub fn new(id: &str, name: &str, card_type: CardType) -> Self {
        Card {
            id: id.to_string(),
            name: name.to_string(),
            card_type,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_trigger(mut self, trigger: &str) -> Self {
        self.trigger = Some(trigger.to_string());
        self
    }

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_colors(mut self, colors: &[&str]) -> Self {
        self.color = colors.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.category = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attribute = attribute.to_string();
        self
    }

    /// Trigger text when present and not blank
    pub fn trigger_text(&self) -> Option<&str> {
        self.trigger
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.category
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(category.trim()))
    }

    /// Attributes are stored slash-separated (`Slash/Strike`)
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attribute
            .split('/')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .any(|a| a.eq_ignore_ascii_case(attribute.trim()))
    }

    /// Every colour of this card appears (case-insensitively) in `palette`
    pub fn colors_within(&self, palette: &[String]) -> bool {
        self.color
            .iter()
            .all(|c| palette.iter().any(|p| p.trim().eq_ignore_ascii_case(c.trim())))
    }
}

/// Card database keyed by card id, in id order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardDatabase {
    cards: BTreeMap<String, Card>,
}

impl CardDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card under its own id
    pub fn insert(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    pub fn get(&self, card_id: &str) -> Option<&Card> {
        self.cards.get(card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards, alternate arts included
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Card)> {
        self.cards.iter().map(|(id, card)| (id.as_str(), card))
    }

    /// Cards that take part in tagging and the graph
    pub fn regular_cards(&self) -> impl Iterator<Item = (&str, &Card)> {
        self.iter().filter(|(id, _)| !is_alt_art(id))
    }

    /// Fill in ids from the map keys where the record omits them
    pub fn normalize_ids(&mut self) {
        for (id, card) in self.cards.iter_mut() {
            if card.id.is_empty() {
                card.id = id.clone();
            }
        }
    }
}

impl FromIterator<Card> for CardDatabase {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut db = CardDatabase::new();
        for card in iter {
            db.insert(card);
        }
        db
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Costs and powers arrive as numbers, numeric strings, or `"-"`
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alt_art_detection() {
        assert!(is_alt_art("OP01-001_p1"));
        assert!(!is_alt_art("OP01-001"));
    }

    #[test]
    fn test_card_type_parse_case_insensitive() {
        assert_eq!(CardType::parse("LEADER"), CardType::Leader);
        assert_eq!(CardType::parse("character"), CardType::Character);
        assert_eq!(CardType::parse(" Event "), CardType::Event);
        assert_eq!(CardType::parse("DON!!"), CardType::Other);
    }

    #[test]
    fn test_deserialize_database_record() {
        let json = r#"{
            "OP01-004": {
                "name": "Usopp",
                "text": "[DON!! x1] [Your Turn] ...",
                "cardType": "CHARACTER",
                "cost": "2",
                "power": "3000",
                "color": ["Red"],
                "category": ["Straw Hat Crew"],
                "attribute": "Ranged",
                "trigger": null,
                "cardSetCode": "OP01"
            }
        }"#;
        let mut db: CardDatabase = serde_json::from_str(json).unwrap();
        db.normalize_ids();

        let card = db.get("OP01-004").unwrap();
        assert_eq!(card.id, "OP01-004");
        assert_eq!(card.card_type, CardType::Character);
        assert_eq!(card.cost, Some(2));
        assert_eq!(card.power, Some(3000));
        assert!(card.has_category("straw hat crew"));
        assert_eq!(card.trigger_text(), None);
    }

    #[test]
    fn test_lenient_number_rejects_dash() {
        let card: Card = serde_json::from_str(r#"{"cost": "-", "power": 5000}"#).unwrap();
        assert_eq!(card.cost, None);
        assert_eq!(card.power, Some(5000));
    }

    #[test]
    fn test_null_text_reads_as_empty() {
        let card: Card = serde_json::from_str(r#"{"text": null, "cardType": null}"#).unwrap();
        assert_eq!(card.text, "");
        assert_eq!(card.card_type, CardType::Other);
    }

    #[test]
    fn test_attribute_split_on_slash() {
        let card = Card::new("X", "X", CardType::Character).with_attribute("Slash/Strike");
        assert!(card.has_attribute("strike"));
        assert!(card.has_attribute("Slash"));
        assert!(!card.has_attribute("Ranged"));
    }

    #[test]
    fn test_colors_within_palette() {
        let card = Card::new("X", "X", CardType::Event).with_colors(&["Red"]);
        assert!(card.colors_within(&["red".to_string(), "Green".to_string()]));
        let card = Card::new("X", "X", CardType::Event).with_colors(&["Red", "Green"]);
        assert!(!card.colors_within(&["Red".to_string()]));
    }

    #[test]
    fn test_blank_trigger_is_none() {
        let card = Card::new("X", "X", CardType::Character).with_trigger("   ");
        assert_eq!(card.trigger_text(), None);
    }
}
