//! The extraction rule table
//!
//! Each rule pairs a pattern with a builder that turns a match into tokens.
//! Rules are tried in table order against every clause and only ever add
//! tokens; they never see each other's output. Builders may look at the whole
//! clause for context the pattern alone cannot express (a trailing "and rest
//! it", the `{Category} type` filter of a cost modifier).

use crate::domain::effects::EffectCategory;
use crate::domain::token::{Comparator, WhereFilter};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// How many times a rule may fire per clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    First,
    All,
}

/// One token produced by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub category: EffectCategory,
    pub token: String,
    /// Ends in `:ThisTurn` and may be upgraded by a duration phrase
    pub durational: bool,
}

type Builder = fn(&Captures<'_>, &str) -> Vec<Emission>;

/// A rule descriptor
pub struct Rule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub mode: MatchMode,
    build: Builder,
}

/// A rule with its pattern compiled
pub struct CompiledRule {
    pub rule: &'static Rule,
    regex: Regex,
}

impl CompiledRule {
    pub fn name(&self) -> &'static str {
        self.rule.name
    }

    /// Run the rule against one clause
    pub fn apply(&self, clause: &str) -> Vec<Emission> {
        match self.rule.mode {
            MatchMode::First => self
                .regex
                .captures(clause)
                .map(|caps| (self.rule.build)(&caps, clause))
                .unwrap_or_default(),
            MatchMode::All => self
                .regex
                .captures_iter(clause)
                .flat_map(|caps| (self.rule.build)(&caps, clause))
                .collect(),
        }
    }
}

/// The compiled rule table, in application order
pub fn rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        RULE_TABLE
            .iter()
            .map(|rule| CompiledRule {
                rule,
                regex: Regex::new(rule.pattern).unwrap(),
            })
            .collect()
    })
}

/// Look up a rule by name
pub fn rule(name: &str) -> Option<&'static CompiledRule> {
    rules().iter().find(|r| r.name() == name)
}

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

fn produce(token: impl Into<String>) -> Emission {
    Emission {
        category: EffectCategory::Produces,
        token: token.into(),
        durational: false,
    }
}

fn lasting(token: impl Into<String>) -> Emission {
    Emission {
        durational: true,
        ..produce(token)
    }
}

fn require(token: impl Into<String>) -> Emission {
    Emission {
        category: EffectCategory::Requires,
        token: token.into(),
        durational: false,
    }
}

fn mechanic(token: impl Into<String>) -> Emission {
    Emission {
        category: EffectCategory::Mechanics,
        token: token.into(),
        durational: false,
    }
}

fn cap<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str().trim())
}

/// `N` of a "look at / reveal N cards from the top of your deck" in the clause
fn looked_at(clause: &str) -> Option<&str> {
    static LOOK: OnceLock<Regex> = OnceLock::new();
    cached(
        &LOOK,
        r"(?i)\b(?:look at|reveal)\s*(\d+)\s*cards? from the top of your deck",
    )
    .captures(clause)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

fn capitalize_singular(word: &str) -> String {
    let singular = word.trim().trim_end_matches(|c: char| c == 's' || c == 'S');
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn keyword(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![mechanic(cap(caps, 1).replace(' ', ""))]
}

fn once_per_turn(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require("OncePerTurn")]
}

fn your_turn_only(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require("OnlyYourTurn")]
}

fn opponents_turn_only(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require("OnlyOppTurn")]
}

fn don_gate(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require(format!("NeedsDON:>={}", cap(caps, 1)))]
}

fn ko_cost(caps: &Captures<'_>, clause: &str) -> Vec<Emission> {
    if matches_rule("ko_base_cost", clause) {
        return Vec::new();
    }
    let op = Comparator::from_phrase(caps.get(2).map(|m| m.as_str()));
    let mut out = vec![produce(format!("KO:Cost{}{}", op, cap(caps, 1)))];
    if op != Comparator::AtLeast {
        out.push(require("Enable:LowerCost"));
    }
    out
}

fn ko_base_cost(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![
        produce(format!("KO:BaseCost<={}", cap(caps, 1))),
        require("Enable:LowerCost"),
    ]
}

fn ko_power(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![
        produce(format!("KO:Power<={}", cap(caps, 1))),
        require("Enable:LowerPower"),
    ]
}

fn rest_target(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("RestTarget:Cost<={}", cap(caps, 1)))]
}

fn bounce(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("Bounce:Cost<={}", cap(caps, 1)))]
}

fn bottom_deck(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("BottomDeck:Cost<={}", cap(caps, 1)))]
}

fn reduce_cost(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![lasting(format!("ReduceCost:{}:ThisTurn", cap(caps, 1)))]
}

fn reduce_power(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![lasting(format!("ReducePower:{}:ThisTurn", cap(caps, 1)))]
}

/// `{Category} type` filter of a cost modifier, with the optional card type
/// that follows it and a "cost of N or more" floor
fn cost_mod_filter(clause: &str) -> Option<WhereFilter> {
    static CATEGORY: OnceLock<Regex> = OnceLock::new();
    static MIN_COST: OnceLock<Regex> = OnceLock::new();
    let caps = cached(
        &CATEGORY,
        r"(?i)\{([^}]+)\}\s*type(?:\s+(Character|Event|Stage))?",
    )
    .captures(clause)?;

    let mut filter = WhereFilter {
        category: Some(cap(&caps, 1).to_string()),
        card_type: caps.get(2).map(|m| capitalize_singular(m.as_str())),
        ..Default::default()
    };
    filter.min_cost = cached(&MIN_COST, r"(?i)\bcost of\s*(\d+)\s*or more")
        .captures(clause)
        .and_then(|c| c[1].parse().ok());
    Some(filter)
}

fn cost_mod(caps: &Captures<'_>, clause: &str) -> Vec<Emission> {
    let amount = cap(caps, 1);
    match cost_mod_filter(clause) {
        Some(filter) => vec![produce(format!("CostMod:-{}{}", amount, filter))],
        None => vec![produce(format!("CostMod:-{}", amount))],
    }
}

fn set_cost(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![lasting(format!("SetCost:{}:ThisTurn", cap(caps, 1)))]
}

fn don_add(caps: &Captures<'_>, clause: &str) -> Vec<Emission> {
    static RESTED: OnceLock<Regex> = OnceLock::new();
    let rested = cached(&RESTED, r"(?i)\band rest (?:it|them)\b").is_match(clause);
    let kind = if rested { "AddRested" } else { "AddActive" };
    vec![produce(format!("DON:{}:+{}", kind, cap(caps, 1)))]
}

fn don_set_active(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("DON:AddActive:+{}", cap(caps, 1)))]
}

fn don_attach_rested(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("DON:AttachRested:+{}", cap(caps, 1)))]
}

fn don_consume(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("DON:Consume:{}", cap(caps, 1)))]
}

fn life_damage(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("LifeTaken:+{}", cap(caps, 1)))]
}

fn life_removed(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce("LifeTaken:+1")]
}

fn life_face_up(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce("LifeFaceUp:+1")]
}

fn needs_life_taken(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require("NeedsLifeTaken")]
}

fn needs_life_change(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require("NeedsLifeChange")]
}

/// Watchers of life removal, with the draw they pay out when there is one
fn life_removed_watch(_: &Captures<'_>, clause: &str) -> Vec<Emission> {
    static DRAW: OnceLock<Regex> = OnceLock::new();
    let payoff = match cached(&DRAW, r"(?i)\bdraw\s*(\d+)\s*cards?\b").captures(clause) {
        Some(caps) => format!("OnLifeRemoved:Draw:{}", &caps[1]),
        None => "OnLifeRemoved:Effect".to_string(),
    };
    vec![mechanic("OnLifeRemoved"), produce(payoff)]
}

fn look_top(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("LookTop:{}", cap(caps, 1)))]
}

fn reveal_top(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("RevealTop:{}", cap(caps, 1)))]
}

fn arrange_top(_: &Captures<'_>, clause: &str) -> Vec<Emission> {
    vec![produce(format!("ArrangeTop:{}", looked_at(clause).unwrap_or("0")))]
}

fn place_rest_top(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce("PlaceRest:Top")]
}

fn place_rest_bottom(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce("PlaceRest:Bottom")]
}

fn play_from_top_cost(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![
        produce(format!("PlayFromTop:Cost<={}", cap(caps, 1))),
        require("NeedsTopDeckManipulation"),
    ]
}

fn play_from_top(_: &Captures<'_>, clause: &str) -> Vec<Emission> {
    if matches_rule("play_from_top_cost", clause) {
        return Vec::new();
    }
    vec![
        produce(format!("PlayFromTop:{}", looked_at(clause).unwrap_or("1"))),
        require("NeedsTopDeckManipulation"),
    ]
}

fn play_from_trash_range(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    let a: i64 = cap(caps, 1).parse().unwrap_or(0);
    let b: i64 = cap(caps, 2).parse().unwrap_or(0);
    vec![produce(format!(
        "PlayFromTrash:CostRange:{}-{}",
        a.min(b),
        a.max(b)
    ))]
}

fn play_from_trash_cost(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("PlayFromTrash:Cost<={}", cap(caps, 1)))]
}

fn play_from_trash(_: &Captures<'_>, clause: &str) -> Vec<Emission> {
    if matches_rule("play_from_trash_range", clause) || matches_rule("play_from_trash_cost", clause)
    {
        return Vec::new();
    }
    vec![produce("PlayFromTrash:Generic")]
}

fn return_from_trash(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce("ReturnFromTrashToHand:Generic")]
}

fn trash_trait_gate(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require(format!(
        "NeedsTrashTrait:{}>={}",
        cap(caps, 2),
        cap(caps, 1)
    ))]
}

fn trash_type_gate(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require(format!(
        "NeedsTrashType:{}>={}",
        capitalize_singular(cap(caps, 2)),
        cap(caps, 1)
    ))]
}

fn trigger_discard(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    let count = match cap(caps, 1) {
        "" => "1",
        n => n,
    };
    vec![
        require(format!("NeedsHand:HasTrigger>={}", count)),
        require(format!("CostDiscardFromHand:HasTrigger>={}", count)),
    ]
}

fn trigger_played_gate(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require("NeedsPlayedThisTurn:HasTrigger>=1")]
}

fn trigger_played_watch(_: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![
        require("NeedsPlayedThisTurn:HasTrigger>=1"),
        mechanic("OnPlayCardWithTrigger"),
    ]
}

fn leader_trait(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    match caps.get(2) {
        Some(second) => vec![require(format!(
            "LeaderIsTraitAnyOf:[{}, {}]",
            cap(caps, 1),
            second.as_str().trim()
        ))],
        None => vec![require(format!("LeaderIsTrait:{}", cap(caps, 1)))],
    }
}

fn ally_trait_cost(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![require(format!(
        "NeedsAllyTrait:{}:Cost>={}",
        cap(caps, 1),
        cap(caps, 2)
    ))]
}

fn ally_trait(caps: &Captures<'_>, clause: &str) -> Vec<Emission> {
    if matches_rule("ally_trait_cost", clause) {
        return Vec::new();
    }
    vec![require(format!("NeedsAllyTrait:{}", cap(caps, 1)))]
}

fn search_trait(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("SearchTrait:{}", cap(caps, 1)))]
}

fn play_trait_from_hand(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("PlayFromHand:Trait:{}", cap(caps, 1)))]
}

fn draw(caps: &Captures<'_>, _: &str) -> Vec<Emission> {
    vec![produce(format!("Draw:{}", cap(caps, 1)))]
}

fn matches_rule(name: &str, clause: &str) -> bool {
    rule(name).is_some_and(|r| r.regex.is_match(clause))
}

static RULE_TABLE: &[Rule] = &[
    Rule {
        name: "keyword",
        pattern: r"(?i)\[(Blocker|Rush|Double Attack|Banish)\]",
        mode: MatchMode::All,
        build: keyword,
    },
    Rule {
        name: "once_per_turn",
        pattern: r"(?i)\bonce per turn\b",
        mode: MatchMode::First,
        build: once_per_turn,
    },
    Rule {
        name: "your_turn_only",
        pattern: r"(?i)\[your turn\]",
        mode: MatchMode::First,
        build: your_turn_only,
    },
    Rule {
        name: "opponents_turn_only",
        pattern: r"(?i)\[opponent's turn\]|\bonly during your opponent's turn\b",
        mode: MatchMode::First,
        build: opponents_turn_only,
    },
    Rule {
        name: "don_gate",
        pattern: r"(?i)\[\s*DON!!\s*x\s*(\d+)\s*\]",
        mode: MatchMode::All,
        build: don_gate,
    },
    Rule {
        name: "ko_base_cost",
        pattern: r"(?i)\bk\.o\b\.?[^.]*?\bbase cost(?: of)?\s*(\d+)\s*or less",
        mode: MatchMode::First,
        build: ko_base_cost,
    },
    Rule {
        name: "ko_cost",
        pattern: r"(?i)\bk\.o\b\.?[^.]*?\bcost(?: of)?\s*(\d+)(\s*or (?:less|more))?",
        mode: MatchMode::First,
        build: ko_cost,
    },
    Rule {
        name: "ko_power",
        pattern: r"(?i)\bk\.o\b\.?[^.]*?(\d{3,5})\s*(?:base )?power\s*or less",
        mode: MatchMode::First,
        build: ko_power,
    },
    Rule {
        name: "rest_target",
        pattern: r"(?i)\brest up to\b[^.]*?\bcost(?: of)?\s*(\d+)\s*or less",
        mode: MatchMode::First,
        build: rest_target,
    },
    Rule {
        name: "bounce",
        pattern: r"(?i)\breturn\b[^.]*?\bcost(?: of)?\s*(\d+)\s*or less[^.]*?\bto (?:the |its )?owner's hand",
        mode: MatchMode::First,
        build: bounce,
    },
    Rule {
        name: "bottom_deck",
        pattern: r"(?i)\bplace\b[^.]*?\bcost(?: of)?\s*(\d+)\s*or less[^.]*?\bbottom of (?:the |its )?owner's deck",
        mode: MatchMode::First,
        build: bottom_deck,
    },
    Rule {
        name: "reduce_cost",
        pattern: r"(?i)\breduce\b[^.]*?\bcost\b[^.]*?\bby\s*(\d+)",
        mode: MatchMode::First,
        build: reduce_cost,
    },
    Rule {
        name: "give_minus_cost",
        pattern: r"(?i)\bgive\b[^.]*?[-−]\s*(\d+)\s*cost\b",
        mode: MatchMode::First,
        build: reduce_cost,
    },
    Rule {
        name: "give_minus_power",
        pattern: r"(?i)\bgive\b[^.]*?[-−]\s*(\d{3,5})\s*power\b",
        mode: MatchMode::First,
        build: reduce_power,
    },
    Rule {
        name: "reduce_power",
        pattern: r"(?i)\breduce\b[^.]*?\bpower\b[^.]*?\bby\s*(\d{3,5})",
        mode: MatchMode::First,
        build: reduce_power,
    },
    Rule {
        name: "cost_mod",
        pattern: r"(?i)\bcost\b[^.]*?\breduced by\s*(\d+)",
        mode: MatchMode::First,
        build: cost_mod,
    },
    Rule {
        name: "set_cost",
        pattern: r"(?i)\bset\b[^.]*?\bcost\b[^.]*?\b(?:to|as)\s*(\d+)\s*(?:during\b|until\b|for\b|[.,;]|$)",
        mode: MatchMode::First,
        build: set_cost,
    },
    Rule {
        name: "don_add",
        pattern: r"(?i)\badd up to\s*(\d+)\s*DON!!\s*cards?\b",
        mode: MatchMode::First,
        build: don_add,
    },
    Rule {
        name: "don_set_active",
        pattern: r"(?i)\bset up to\s*(\d+)\s*of your DON!!\s*cards? as active",
        mode: MatchMode::First,
        build: don_set_active,
    },
    Rule {
        name: "don_attach_rested",
        pattern: r"(?i)\bgive\b[^.]*?\bup to\s*(\d+)\s*rested\s*DON!!\s*cards?",
        mode: MatchMode::First,
        build: don_attach_rested,
    },
    Rule {
        name: "don_consume",
        pattern: r"(?i)DON!!\s*[-−]\s*(\d+)",
        mode: MatchMode::All,
        build: don_consume,
    },
    Rule {
        name: "life_damage",
        pattern: r"(?i)\bdeals?\s*(\d+)\s*damage\b",
        mode: MatchMode::First,
        build: life_damage,
    },
    Rule {
        name: "life_removed",
        pattern: r"(?i)\b(?:trash|add)\b[^.]*?\bfrom the top of your opponent's life",
        mode: MatchMode::First,
        build: life_removed,
    },
    Rule {
        name: "life_face_up",
        pattern: r"(?i)\blife cards?\b[^.]*?\bface[- ]up\b|\bface[- ]up\b[^.]*?\blife\b",
        mode: MatchMode::First,
        build: life_face_up,
    },
    Rule {
        name: "needs_life_taken",
        pattern: r"(?i)\b(?:when|if) your life (?:cards? )?(?:is|are) taken\b|\bwhen you take damage\b",
        mode: MatchMode::First,
        build: needs_life_taken,
    },
    Rule {
        name: "needs_life_change",
        pattern: r"(?i)\byour life (?:cards? )?(?:increases?|decreases?|changes?)\b|\bremoved from (?:either|any) player's life\b",
        mode: MatchMode::First,
        build: needs_life_change,
    },
    Rule {
        name: "life_removed_watch",
        pattern: r"(?i)\bremoved from (?:either|any) player's life\b|\bremoved from (?:your|their|the) life\b",
        mode: MatchMode::First,
        build: life_removed_watch,
    },
    Rule {
        name: "look_top",
        pattern: r"(?i)\blook at\s*(\d+)\s*cards? from the top of your deck",
        mode: MatchMode::First,
        build: look_top,
    },
    Rule {
        name: "reveal_top",
        pattern: r"(?i)\breveal\s*(\d+)\s*cards? from the top of your deck",
        mode: MatchMode::First,
        build: reveal_top,
    },
    Rule {
        name: "arrange_top",
        pattern: r"(?i)\b(?:put|place) (?:them|those cards)\b[^.]*?\btop of your deck",
        mode: MatchMode::First,
        build: arrange_top,
    },
    Rule {
        name: "place_rest_top",
        pattern: r"(?i)\bplace the rest\b[^.]*?\b(?:at|on) (?:the )?top of your deck",
        mode: MatchMode::First,
        build: place_rest_top,
    },
    Rule {
        name: "place_rest_bottom",
        pattern: r"(?i)\bplace the rest\b[^.]*?\b(?:at|on) the bottom of your deck",
        mode: MatchMode::First,
        build: place_rest_bottom,
    },
    Rule {
        name: "play_from_top_cost",
        pattern: r"(?i)\bplay\b[^.]*?\bfrom the top of your deck\b[^.]*?\bcost(?: of)?\s*(\d+)\s*or less",
        mode: MatchMode::First,
        build: play_from_top_cost,
    },
    Rule {
        name: "play_from_top",
        pattern: r"(?i)\bplay\b[^.]*?\bfrom the top of your deck",
        mode: MatchMode::First,
        build: play_from_top,
    },
    Rule {
        name: "play_from_trash_range",
        pattern: r"(?i)\bplay\b[^.]*?\bcost of\s*(\d+)\s*(?:to|-|–)\s*(\d+)\b[^.]*?\bfrom your trash",
        mode: MatchMode::First,
        build: play_from_trash_range,
    },
    Rule {
        name: "play_from_trash_cost",
        pattern: r"(?i)\bplay\b[^.]*?\bcost of\s*(\d+)\s*or less\b[^.]*?\bfrom your trash",
        mode: MatchMode::First,
        build: play_from_trash_cost,
    },
    Rule {
        name: "play_from_trash",
        pattern: r"(?i)\bplay\b[^.]*?\bfrom your trash",
        mode: MatchMode::First,
        build: play_from_trash,
    },
    Rule {
        name: "return_from_trash",
        pattern: r"(?i)\b(?:return|add)\b[^.]*?\bfrom your trash\b[^.]*?\bto your hand",
        mode: MatchMode::First,
        build: return_from_trash,
    },
    Rule {
        name: "trash_trait_gate",
        pattern: r"(?i)\bhave\s*(\d+)\s*or more\s*\{([^}]+)\}(?:\s*type)?(?:\s*cards?)?\s*in your trash",
        mode: MatchMode::First,
        build: trash_trait_gate,
    },
    Rule {
        name: "trash_type_gate",
        pattern: r"(?i)\bhave\s*(\d+)\s*or more\s*(events?|characters?|stages?)\s*in your trash",
        mode: MatchMode::First,
        build: trash_type_gate,
    },
    Rule {
        name: "trigger_discard",
        pattern: r"(?i)\b(?:trash|discard)\s*(\d+)?\s*cards?\s*with\s*(?:a\s*)?\[?\s*trigger\s*\]?\s*from your hand",
        mode: MatchMode::First,
        build: trigger_discard,
    },
    Rule {
        name: "trigger_played_gate",
        pattern: r"(?i)\bif you (?:have )?played (?:a|1)\s*cards?\s*with\s*(?:a\s*)?\[?\s*trigger\s*\]?",
        mode: MatchMode::First,
        build: trigger_played_gate,
    },
    Rule {
        name: "trigger_played_watch",
        pattern: r"(?i)\bwhen you play (?:a|1)\s*cards?\s*with\s*(?:a\s*)?\[?\s*trigger\s*\]?",
        mode: MatchMode::First,
        build: trigger_played_watch,
    },
    Rule {
        name: "leader_trait",
        pattern: r"(?i)\byour leader (?:has|is)(?: the)?\s*\{([^}]+)\}(?:\s*or\s*\{([^}]+)\})?\s*type",
        mode: MatchMode::First,
        build: leader_trait,
    },
    Rule {
        name: "ally_trait_cost",
        pattern: r"(?i)\bif you have an?\s*\{([^}]+)\}\s*type Character\b[^.]*?\bcost(?: of)?\s*(\d+)\s*or more",
        mode: MatchMode::First,
        build: ally_trait_cost,
    },
    Rule {
        name: "ally_trait",
        pattern: r"(?i)\bif you have an?\s*\{([^}]+)\}\s*type Character\b",
        mode: MatchMode::First,
        build: ally_trait,
    },
    Rule {
        name: "search_trait",
        pattern: r"(?i)\breveal up to\s*\d+\s*\{([^}]+)\}\s*type",
        mode: MatchMode::First,
        build: search_trait,
    },
    Rule {
        name: "play_trait_from_hand",
        pattern: r"(?i)\bplay up to\s*\d+\s*\{([^}]+)\}\s*type\b[^.]*?\bfrom your hand",
        mode: MatchMode::First,
        build: play_trait_from_hand,
    },
    Rule {
        name: "draw",
        pattern: r"(?i)\bdraw\s*(\d+)\s*cards?\b",
        mode: MatchMode::All,
        build: draw,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(name: &str, clause: &str) -> Vec<String> {
        rule(name)
            .unwrap_or_else(|| panic!("no rule named {}", name))
            .apply(clause)
            .into_iter()
            .map(|e| e.token)
            .collect()
    }

    #[test]
    fn test_every_pattern_compiles_and_names_are_unique() {
        let names: std::collections::HashSet<_> = rules().iter().map(|r| r.name()).collect();
        assert_eq!(names.len(), RULE_TABLE.len());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokens("keyword", "[Blocker] [Double Attack]"),
            vec!["Blocker", "DoubleAttack"]
        );
    }

    #[test]
    fn test_don_gate() {
        assert_eq!(tokens("don_gate", "[DON!! x2] [When Attacking]"), vec!["NeedsDON:>=2"]);
    }

    #[test]
    fn test_ko_cost_operators() {
        assert_eq!(
            tokens(
                "ko_cost",
                "K.O. up to 1 of your opponent's Characters with a cost of 3 or less."
            ),
            vec!["KO:Cost<=3", "Enable:LowerCost"]
        );
        assert_eq!(
            tokens(
                "ko_cost",
                "K.O. up to 1 of your opponent's Characters with a cost of 6 or more."
            ),
            vec!["KO:Cost>=6"]
        );
        assert_eq!(
            tokens("ko_cost", "K.O. up to 1 of your opponent's Characters with a cost of 0."),
            vec!["KO:Cost==0", "Enable:LowerCost"]
        );
    }

    #[test]
    fn test_ko_does_not_match_names() {
        assert!(tokens("ko_cost", "Kozuki Oden has a cost of 3 or less").is_empty());
    }

    #[test]
    fn test_base_cost_is_not_also_plain_cost() {
        let clause = "K.O. up to 1 of your opponent's Characters with a base cost of 5 or less.";
        assert!(tokens("ko_cost", clause).is_empty());
    }

    #[test]
    fn test_ko_power_and_base_cost() {
        assert_eq!(
            tokens("ko_power", "K.O. up to 1 of your opponent's Characters with 4000 power or less."),
            vec!["KO:Power<=4000", "Enable:LowerPower"]
        );
        assert_eq!(
            tokens(
                "ko_base_cost",
                "K.O. up to 1 of your opponent's Characters with a base cost of 5 or less."
            ),
            vec!["KO:BaseCost<=5", "Enable:LowerCost"]
        );
    }

    #[test]
    fn test_rest_target_needs_a_target() {
        assert_eq!(
            tokens("rest_target", "Rest up to 1 of your opponent's Characters with a cost of 4 or less."),
            vec!["RestTarget:Cost<=4"]
        );
        assert!(tokens(
            "rest_target",
            "You may rest this Character: K.O. up to 1 Character with a cost of 2 or less."
        )
        .is_empty());
    }

    #[test]
    fn test_bounce_and_bottom_deck() {
        assert_eq!(
            tokens(
                "bounce",
                "Return up to 1 Character with a cost of 3 or less to the owner's hand."
            ),
            vec!["Bounce:Cost<=3"]
        );
        assert_eq!(
            tokens(
                "bottom_deck",
                "Place up to 1 Character with a cost of 2 or less at the bottom of the owner's deck."
            ),
            vec!["BottomDeck:Cost<=2"]
        );
    }

    #[test]
    fn test_reducers_are_durational() {
        let emissions = rule("reduce_cost")
            .unwrap()
            .apply("Reduce the cost of 1 of your Characters by 2 until the end of this turn.");
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].token, "ReduceCost:2:ThisTurn");
        assert!(emissions[0].durational);

        assert_eq!(
            tokens("give_minus_power", "Give up to 1 of your opponent's Characters −2000 power during this turn."),
            vec!["ReducePower:2000:ThisTurn"]
        );
        assert_eq!(
            tokens("give_minus_cost", "Give up to 1 of your opponent's Characters -3 cost during this turn."),
            vec!["ReduceCost:3:ThisTurn"]
        );
    }

    #[test]
    fn test_cost_mod_plain_and_filtered() {
        assert_eq!(
            tokens("cost_mod", "The cost of this card in your hand is reduced by 1."),
            vec!["CostMod:-1"]
        );
        assert_eq!(
            tokens(
                "cost_mod",
                "The cost of playing {Celestial Dragons} type Character cards with a cost of 2 or more from your hand is reduced by 1."
            ),
            vec!["CostMod:-1[where=Category:{Celestial Dragons}; Type:{Character}; Cost>=2]"]
        );
    }

    #[test]
    fn test_cost_mod_ignores_reduce_verb() {
        assert!(tokens("cost_mod", "Reduce the cost of 1 of your Characters by 2.").is_empty());
    }

    #[test]
    fn test_set_cost_is_a_durational_reducer() {
        let emissions = rule("set_cost")
            .unwrap()
            .apply("Set the cost of up to 1 of your Characters to 0 during this turn.");
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].token, "SetCost:0:ThisTurn");
        assert!(emissions[0].durational);

        assert_eq!(
            tokens("set_cost", "Set the cost of this Character to 5."),
            vec!["SetCost:5:ThisTurn"]
        );
        assert!(tokens("set_cost", "Set up to 2 of your DON!! cards as active.").is_empty());
    }

    #[test]
    fn test_don_supply() {
        assert_eq!(
            tokens("don_add", "Add up to 1 DON!! card from your DON!! deck and set it as active."),
            vec!["DON:AddActive:+1"]
        );
        assert_eq!(
            tokens("don_add", "Add up to 2 DON!! cards from your DON!! deck and rest them."),
            vec!["DON:AddRested:+2"]
        );
        assert_eq!(
            tokens("don_attach_rested", "Give your Leader or 1 Character up to 1 rested DON!! card."),
            vec!["DON:AttachRested:+1"]
        );
        assert_eq!(
            tokens("don_set_active", "Set up to 2 of your DON!! cards as active."),
            vec!["DON:AddActive:+2"]
        );
        assert_eq!(tokens("don_consume", "DON!! −2: Draw 1 card."), vec!["DON:Consume:2"]);
    }

    #[test]
    fn test_life_rules() {
        assert_eq!(tokens("life_damage", "Deal 1 damage to your opponent."), vec!["LifeTaken:+1"]);
        assert_eq!(
            tokens("life_face_up", "Turn 1 card from the top of your Life cards face-up."),
            vec!["LifeFaceUp:+1"]
        );
        assert_eq!(
            tokens("needs_life_taken", "When your Life is taken, draw 1 card."),
            vec!["NeedsLifeTaken"]
        );
    }

    #[test]
    fn test_deck_stacking() {
        let clause = "Look at 3 cards from the top of your deck and place them in any order on top of your deck.";
        assert_eq!(tokens("look_top", clause), vec!["LookTop:3"]);
        assert_eq!(tokens("arrange_top", clause), vec!["ArrangeTop:3"]);
        assert_eq!(
            tokens("place_rest_bottom", "Then, place the rest at the bottom of your deck in any order."),
            vec!["PlaceRest:Bottom"]
        );
    }

    #[test]
    fn test_reveal_top() {
        assert_eq!(
            tokens("reveal_top", "Reveal 1 card from the top of your deck and play it."),
            vec!["RevealTop:1"]
        );
        assert!(tokens("reveal_top", "Reveal up to 1 {Navy} type card from your hand.").is_empty());
    }

    #[test]
    fn test_life_removed_watchers() {
        assert_eq!(
            tokens(
                "life_removed_watch",
                "When a card is removed from either player's Life, draw 1 card."
            ),
            vec!["OnLifeRemoved", "OnLifeRemoved:Draw:1"]
        );
        let emissions = rule("life_removed_watch")
            .unwrap()
            .apply("When a card is removed from your Life, this Character gains +1000 power.");
        assert_eq!(emissions[0].category, EffectCategory::Mechanics);
        assert_eq!(emissions[1].token, "OnLifeRemoved:Effect");
        assert_eq!(emissions[1].category, EffectCategory::Produces);
    }

    #[test]
    fn test_play_from_top_variants() {
        assert_eq!(
            tokens(
                "play_from_top_cost",
                "You may play up to 1 Character card from the top of your deck with a cost of 4 or less."
            ),
            vec!["PlayFromTop:Cost<=4", "NeedsTopDeckManipulation"]
        );
        assert!(tokens(
            "play_from_top",
            "You may play up to 1 Character card from the top of your deck with a cost of 4 or less."
        )
        .is_empty());
        assert_eq!(
            tokens("play_from_top", "Play 1 card from the top of your deck."),
            vec!["PlayFromTop:1", "NeedsTopDeckManipulation"]
        );
    }

    #[test]
    fn test_trash_recursion() {
        assert_eq!(
            tokens(
                "play_from_trash_range",
                "Play up to 1 Character card with a cost of 5 to 3 from your trash."
            ),
            vec!["PlayFromTrash:CostRange:3-5"]
        );
        assert_eq!(
            tokens(
                "play_from_trash_cost",
                "Play up to 1 Character card with a cost of 4 or less from your trash."
            ),
            vec!["PlayFromTrash:Cost<=4"]
        );
        assert!(tokens(
            "play_from_trash",
            "Play up to 1 Character card with a cost of 4 or less from your trash."
        )
        .is_empty());
        assert_eq!(
            tokens("return_from_trash", "Return up to 1 Event from your trash to your hand."),
            vec!["ReturnFromTrashToHand:Generic"]
        );
    }

    #[test]
    fn test_trash_gates() {
        assert_eq!(
            tokens(
                "trash_trait_gate",
                "If you have 10 or more {Thriller Bark Pirates} type cards in your trash, draw 1 card."
            ),
            vec!["NeedsTrashTrait:Thriller Bark Pirates>=10"]
        );
        assert_eq!(
            tokens("trash_type_gate", "If you have 3 or more Events in your trash, draw 1 card."),
            vec!["NeedsTrashType:Event>=3"]
        );
    }

    #[test]
    fn test_trigger_gates() {
        assert_eq!(
            tokens("trigger_discard", "You may trash 1 card with a [Trigger] from your hand:"),
            vec!["NeedsHand:HasTrigger>=1", "CostDiscardFromHand:HasTrigger>=1"]
        );
        assert_eq!(
            tokens("trigger_played_watch", "When you play a card with a [Trigger], draw 1 card."),
            vec!["NeedsPlayedThisTurn:HasTrigger>=1", "OnPlayCardWithTrigger"]
        );
    }

    #[test]
    fn test_leader_and_ally_gates() {
        assert_eq!(
            tokens("leader_trait", "If your Leader has the {Straw Hat Crew} type, draw 1 card."),
            vec!["LeaderIsTrait:Straw Hat Crew"]
        );
        assert_eq!(
            tokens("leader_trait", "If your Leader has the {Navy} or {Impel Down} type"),
            vec!["LeaderIsTraitAnyOf:[Navy, Impel Down]"]
        );
        assert_eq!(
            tokens(
                "ally_trait_cost",
                "If you have a {Whitebeard Pirates} type Character with a cost of 5 or more, draw 1 card."
            ),
            vec!["NeedsAllyTrait:Whitebeard Pirates:Cost>=5"]
        );
        assert!(tokens(
            "ally_trait",
            "If you have a {Whitebeard Pirates} type Character with a cost of 5 or more"
        )
        .is_empty());
    }

    #[test]
    fn test_draw_fires_for_every_match() {
        assert_eq!(
            tokens("draw", "Draw 1 card. If you do, draw 2 cards."),
            vec!["Draw:1", "Draw:2"]
        );
    }
}
