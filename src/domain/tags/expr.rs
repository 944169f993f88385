//! Tag expression grammar for manually authored tokens
//!
//! Every accepted expression parses into a typed [`TagExpr`] whose `Display`
//! is the canonical token stored in the tag store.
//!
//! # Examples
//!
//! ```
//! use synergy::domain::tags::TagExpr;
//!
//! let expr = TagExpr::parse("NeedsDON:2").unwrap();
//! assert_eq!(expr.to_string(), "NeedsDON:>=2");
//!
//! let errors = TagExpr::parse("NeedsDON:abc").unwrap_err();
//! assert!(!errors.is_empty());
//! ```

use crate::domain::effects::EffectCategory;
use crate::domain::token::{Comparator, WhereFilter};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Every problem found in one expression; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    fn single(message: impl Into<String>) -> Self {
        ValidationErrors(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

/// Stat a K.O. window is measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KoStat {
    Cost,
    Power,
}

/// Removal actions gated on the target's cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostAction {
    Bounce,
    BottomDeck,
    RestTarget,
}

/// Ways of adding DON!! to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonSupply {
    AddActive,
    AddRested,
    AttachRested,
}

/// Life-area producers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEffect {
    FaceUp,
    Taken,
}

/// A validated manual tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExpr {
    /// `NeedsLifeTaken`
    NeedsLifeTaken,
    /// `NeedsLifeChange`
    NeedsLifeChange,
    /// `NeedsTarget:HasCounter:N`
    NeedsCounterTarget(u32),
    /// `NeedsDON:>=N`
    NeedsDon(Comparator, u32),
    /// `NeedsLeaderType:{Category}`
    NeedsLeaderType(String),
    /// `WantsCurve:{Category}:>=N`
    WantsCurve(String, Comparator, u32),
    /// `Curve:{Category}:>=N`
    Curve(String, Comparator, u32),
    /// `KO:Cost<=N`, `KO:Power<=N`
    Ko(KoStat, Comparator, u32),
    /// `CostMod:-N`, optionally followed by a `[where=...]` filter
    CostMod(i64, Option<WhereFilter>),
    /// `Bounce:Cost<=N` and friends
    CostGated(CostAction, Comparator, u32),
    /// `DON:AddActive:+N` and friends
    DonSupply(DonSupply, u32),
    /// `DON:Consume:N`
    DonConsume(u32),
    /// `LifeFaceUp:+N`, `LifeTaken:+N`
    Life(LifeEffect, u32),
}

fn grammar_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

fn counter_target_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^NeedsTarget:HasCounter:(\d+)$")
}

fn needs_don_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^NeedsDON:(>=|<=|==)?\s*(\d+)$")
}

fn leader_type_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^NeedsLeaderType:\{([^}]*)\}$")
}

fn curve_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^(WantsCurve|Curve):\{([^}]*)\}:(>=|<=|==)?(\d+)$")
}

fn ko_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^KO:(Cost|Power)(>=|<=|==)(\d+)$")
}

fn cost_mod_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^CostMod:([+-]\d+|0)(?:\[where=(.*)\])?$")
}

fn cost_gated_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^(Bounce|BottomDeck|RestTarget):Cost(>=|<=|==)(\d+)$")
}

fn don_supply_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^DON:(AddActive|AddRested|AttachRested):\+(\d+)$")
}

fn don_consume_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^DON:Consume:(\d+)$")
}

fn life_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    grammar_regex(&REGEX, r"^(LifeFaceUp|LifeTaken):\+(\d+)$")
}

fn operand(raw: &str) -> Result<u32, ValidationErrors> {
    raw.parse()
        .map_err(|_| ValidationErrors::single(format!("Number out of range: {}", raw)))
}

fn comparator(raw: Option<&str>) -> Comparator {
    raw.and_then(Comparator::parse).unwrap_or(Comparator::AtLeast)
}

fn category(raw: &str, shape: &str) -> Result<String, ValidationErrors> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationErrors::single(format!(
            "Category must not be empty. Format: {}",
            shape
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

fn format_error(shape: &str) -> ValidationErrors {
    ValidationErrors::single(format!("Format: {}", shape))
}

impl TagExpr {
    /// Parse and validate a manual tag expression
    pub fn parse(input: &str) -> Result<TagExpr, ValidationErrors> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationErrors::single("Tag expression must not be empty"));
        }

        let kind = input.split(|c: char| c == ':' || c == '[').next().unwrap_or(input);
        match kind {
            "NeedsLifeTaken" if input == kind => Ok(TagExpr::NeedsLifeTaken),
            "NeedsLifeChange" if input == kind => Ok(TagExpr::NeedsLifeChange),
            "NeedsLifeTaken" | "NeedsLifeChange" => {
                Err(format_error(&format!("{} (takes no operand)", kind)))
            }
            "NeedsTarget" => {
                let caps = counter_target_regex()
                    .captures(input)
                    .ok_or_else(|| format_error("NeedsTarget:HasCounter:N"))?;
                Ok(TagExpr::NeedsCounterTarget(operand(&caps[1])?))
            }
            "NeedsDON" => {
                let caps = needs_don_regex()
                    .captures(input)
                    .ok_or_else(|| format_error("NeedsDON:>=N or NeedsDON:N"))?;
                let op = comparator(caps.get(1).map(|m| m.as_str()));
                Ok(TagExpr::NeedsDon(op, operand(&caps[2])?))
            }
            "NeedsLeaderType" => {
                let shape = "NeedsLeaderType:{Category}";
                let caps = leader_type_regex()
                    .captures(input)
                    .ok_or_else(|| format_error(shape))?;
                Ok(TagExpr::NeedsLeaderType(category(&caps[1], shape)?))
            }
            "WantsCurve" | "Curve" => {
                let shape = format!("{}:{{Category}}:>=N", kind);
                let caps = curve_regex()
                    .captures(input)
                    .ok_or_else(|| format_error(&shape))?;
                let name = category(&caps[2], &shape)?;
                let op = comparator(caps.get(3).map(|m| m.as_str()));
                let n = operand(&caps[4])?;
                if kind == "Curve" {
                    Ok(TagExpr::Curve(name, op, n))
                } else {
                    Ok(TagExpr::WantsCurve(name, op, n))
                }
            }
            "KO" => {
                let caps = ko_regex()
                    .captures(input)
                    .ok_or_else(|| format_error("KO:Cost<=N or KO:Power<=N"))?;
                let stat = if &caps[1] == "Cost" {
                    KoStat::Cost
                } else {
                    KoStat::Power
                };
                let op = comparator(Some(&caps[2]));
                Ok(TagExpr::Ko(stat, op, operand(&caps[3])?))
            }
            "CostMod" => {
                let caps = cost_mod_regex()
                    .captures(input)
                    .ok_or_else(|| format_error("CostMod:-N or CostMod:-N[where=Category:{X}]"))?;
                let delta: i64 = caps[1].parse().map_err(|_| {
                    ValidationErrors::single(format!("Number out of range: {}", &caps[1]))
                })?;
                let filter = match caps.get(2) {
                    Some(body) => Some(WhereFilter::parse(body.as_str()).map_err(ValidationErrors)?),
                    None => None,
                };
                Ok(TagExpr::CostMod(delta, filter))
            }
            "Bounce" | "BottomDeck" | "RestTarget" => {
                let caps = cost_gated_regex()
                    .captures(input)
                    .ok_or_else(|| format_error(&format!("{}:Cost<=N", kind)))?;
                let action = match &caps[1] {
                    "Bounce" => CostAction::Bounce,
                    "BottomDeck" => CostAction::BottomDeck,
                    _ => CostAction::RestTarget,
                };
                let op = comparator(Some(&caps[2]));
                Ok(TagExpr::CostGated(action, op, operand(&caps[3])?))
            }
            "DON" => {
                if let Some(caps) = don_consume_regex().captures(input) {
                    return Ok(TagExpr::DonConsume(operand(&caps[1])?));
                }
                let caps = don_supply_regex().captures(input).ok_or_else(|| {
                    format_error("DON:(AddActive|AddRested|AttachRested):+N or DON:Consume:N")
                })?;
                let supply = match &caps[1] {
                    "AddActive" => DonSupply::AddActive,
                    "AddRested" => DonSupply::AddRested,
                    _ => DonSupply::AttachRested,
                };
                Ok(TagExpr::DonSupply(supply, operand(&caps[2])?))
            }
            "LifeFaceUp" | "LifeTaken" => {
                let caps = life_regex()
                    .captures(input)
                    .ok_or_else(|| format_error(&format!("{}:+N", kind)))?;
                let effect = if &caps[1] == "LifeFaceUp" {
                    LifeEffect::FaceUp
                } else {
                    LifeEffect::Taken
                };
                Ok(TagExpr::Life(effect, operand(&caps[2])?))
            }
            _ => Err(ValidationErrors::single(format!(
                "Unrecognized tag expression: '{}'",
                input
            ))),
        }
    }

    /// The category this kind of tag belongs to
    pub fn side(&self) -> EffectCategory {
        match self {
            TagExpr::NeedsLifeTaken
            | TagExpr::NeedsLifeChange
            | TagExpr::NeedsCounterTarget(_)
            | TagExpr::NeedsDon(..)
            | TagExpr::NeedsLeaderType(_)
            | TagExpr::WantsCurve(..) => EffectCategory::Requires,
            _ => EffectCategory::Produces,
        }
    }
}

impl fmt::Display for TagExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagExpr::NeedsLifeTaken => write!(f, "NeedsLifeTaken"),
            TagExpr::NeedsLifeChange => write!(f, "NeedsLifeChange"),
            TagExpr::NeedsCounterTarget(n) => write!(f, "NeedsTarget:HasCounter:{}", n),
            TagExpr::NeedsDon(op, n) => write!(f, "NeedsDON:{}{}", op, n),
            TagExpr::NeedsLeaderType(name) => write!(f, "NeedsLeaderType:{{{}}}", name),
            TagExpr::WantsCurve(name, op, n) => write!(f, "WantsCurve:{{{}}}:{}{}", name, op, n),
            TagExpr::Curve(name, op, n) => write!(f, "Curve:{{{}}}:{}{}", name, op, n),
            TagExpr::Ko(stat, op, n) => {
                let stat = match stat {
                    KoStat::Cost => "Cost",
                    KoStat::Power => "Power",
                };
                write!(f, "KO:{}{}{}", stat, op, n)
            }
            TagExpr::CostMod(delta, filter) => {
                if *delta == 0 {
                    write!(f, "CostMod:0")?;
                } else {
                    write!(f, "CostMod:{:+}", delta)?;
                }
                if let Some(filter) = filter {
                    write!(f, "{}", filter)?;
                }
                Ok(())
            }
            TagExpr::CostGated(action, op, n) => {
                let action = match action {
                    CostAction::Bounce => "Bounce",
                    CostAction::BottomDeck => "BottomDeck",
                    CostAction::RestTarget => "RestTarget",
                };
                write!(f, "{}:Cost{}{}", action, op, n)
            }
            TagExpr::DonSupply(supply, n) => {
                let supply = match supply {
                    DonSupply::AddActive => "AddActive",
                    DonSupply::AddRested => "AddRested",
                    DonSupply::AttachRested => "AttachRested",
                };
                write!(f, "DON:{}:+{}", supply, n)
            }
            TagExpr::DonConsume(n) => write!(f, "DON:Consume:{}", n),
            TagExpr::Life(effect, n) => {
                let effect = match effect {
                    LifeEffect::FaceUp => "LifeFaceUp",
                    LifeEffect::Taken => "LifeTaken",
                };
                write!(f, "{}:+{}", effect, n)
            }
        }
    }
}

/// Catalogue entry describing one expression kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagKind {
    pub label: &'static str,
    pub template: &'static str,
    pub help: &'static str,
    pub side: EffectCategory,
}

/// Every expression kind the grammar accepts
pub const TAG_KINDS: &[TagKind] = &[
    TagKind {
        label: "Needs life taken",
        template: "NeedsLifeTaken",
        help: "Wants your Life to be taken",
        side: EffectCategory::Requires,
    },
    TagKind {
        label: "Needs life change",
        template: "NeedsLifeChange",
        help: "Wants either Life area to change",
        side: EffectCategory::Requires,
    },
    TagKind {
        label: "Needs counter target",
        template: "NeedsTarget:HasCounter:N",
        help: "Needs N targets that carry a Counter value",
        side: EffectCategory::Requires,
    },
    TagKind {
        label: "Needs DON!!",
        template: "NeedsDON:>=N",
        help: "DON!! threshold; the operator defaults to >=",
        side: EffectCategory::Requires,
    },
    TagKind {
        label: "Needs leader type",
        template: "NeedsLeaderType:{Category}",
        help: "Only works under a Leader of this type",
        side: EffectCategory::Requires,
    },
    TagKind {
        label: "Wants curve",
        template: "WantsCurve:{Category}:>=N",
        help: "Wants N or more cards of this type in the deck",
        side: EffectCategory::Requires,
    },
    TagKind {
        label: "Curve",
        template: "Curve:{Category}:>=N",
        help: "Contributes to a curve of this type",
        side: EffectCategory::Produces,
    },
    TagKind {
        label: "K.O. window",
        template: "KO:Cost<=N",
        help: "K.O. by cost or power (KO:Power<=N)",
        side: EffectCategory::Produces,
    },
    TagKind {
        label: "Cost modifier",
        template: "CostMod:-N[where=Category:{X}]",
        help: "Signed cost change; the filter is optional",
        side: EffectCategory::Produces,
    },
    TagKind {
        label: "Cost-gated removal",
        template: "Bounce:Cost<=N",
        help: "Bounce, BottomDeck or RestTarget a target by cost",
        side: EffectCategory::Produces,
    },
    TagKind {
        label: "DON!! supply",
        template: "DON:AddActive:+N",
        help: "AddActive, AddRested or AttachRested",
        side: EffectCategory::Produces,
    },
    TagKind {
        label: "DON!! cost",
        template: "DON:Consume:N",
        help: "Returns N DON!! to pay for an effect",
        side: EffectCategory::Produces,
    },
    TagKind {
        label: "Life producer",
        template: "LifeTaken:+N",
        help: "Takes Life (LifeTaken) or turns it face-up (LifeFaceUp)",
        side: EffectCategory::Produces,
    },
];
