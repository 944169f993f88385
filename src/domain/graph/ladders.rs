//! Ladder rules
//!
//! A ladder scans the postings keys for a producer family and a consumer
//! family and connects every producer card to every consumer card. Ladders
//! only emit candidates; filtering and deduplication happen afterwards.

use super::{Edge, GraphConfig};
use crate::domain::card::CardDatabase;
use crate::domain::index::{Postings, PostingsIndex};
use crate::domain::token::{first_number, WhereFilter};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Everything a ladder may read
pub struct LadderContext<'a> {
    pub index: &'a PostingsIndex,
    pub cards: &'a CardDatabase,
    pub config: &'a GraphConfig,
}

/// The ladder families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderKind {
    Resource,
    Cost,
    Power,
    Sequencing,
    Recycling,
    Category,
    Trigger,
    Ally,
}

impl LadderKind {
    pub const ALL: [LadderKind; 8] = [
        LadderKind::Resource,
        LadderKind::Cost,
        LadderKind::Power,
        LadderKind::Sequencing,
        LadderKind::Recycling,
        LadderKind::Category,
        LadderKind::Trigger,
        LadderKind::Ally,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LadderKind::Resource => "DON ladder",
            LadderKind::Cost => "Cost ladder",
            LadderKind::Power => "Power ladder",
            LadderKind::Sequencing => "Top-deck stack",
            LadderKind::Recycling => "Trash ladder",
            LadderKind::Category => "Cost reducer fan-out",
            LadderKind::Trigger => "Trigger ladder",
            LadderKind::Ally => "Ally trait gates",
        }
    }

    /// Run this ladder, appending candidate edges
    pub fn run(&self, ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
        match self {
            LadderKind::Resource => resource_ladder(ctx, edges),
            LadderKind::Cost => cost_ladder(ctx, edges),
            LadderKind::Power => power_ladder(ctx, edges),
            LadderKind::Sequencing => sequencing_ladder(ctx, edges),
            LadderKind::Recycling => recycling_ladder(ctx, edges),
            LadderKind::Category => category_ladder(ctx, edges),
            LadderKind::Trigger => trigger_ladder(ctx, edges),
            LadderKind::Ally => ally_ladder(ctx, edges),
        }
    }
}

fn family(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

fn don_supply_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^DON:(?:AddActive|AddRested|AttachRested):\+\d+$")
}

fn don_need_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^NeedsDON:>=\d+$")
}

fn cost_reducer_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^(?:(?:ReduceCost|SetCost):\d+:\w+|CostMod:-\d+)$")
}

fn cost_window_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^(?:KO:(?:Cost|BaseCost)|RestTarget:Cost)<=\d+$")
}

fn power_reducer_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^ReducePower:\d+:\w+$")
}

fn power_window_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^KO:Power<=\d+$")
}

fn stacker_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^(?:ArrangeTop:\d+|PlaceRest:Top)$")
}

fn play_from_top_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^PlayFromTop:")
}

fn reviver_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^(?:PlayFromTrash|ReturnFromTrashToHand):")
}

fn trash_gate_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^NeedsTrash(?:Trait|Type):.+>=\d+$")
}

fn filtered_cost_mod_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^CostMod:([+-]?\d+)\[where=(.+)\]$")
}

fn trait_mover_family() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    family(&REGEX, r"^(?:PlayFrom(?:Hand|Top|Trash)|SearchTrait):")
}

/// Postings keys of one family, in key order
fn keys_matching<'a>(
    postings: &'a Postings,
    regex: &Regex,
) -> Vec<(&'a str, &'a BTreeSet<String>)> {
    postings
        .iter()
        .filter(|(token, _)| regex.is_match(token))
        .map(|(token, ids)| (token.as_str(), ids))
        .collect()
}

fn magnitude(token: &str) -> f64 {
    first_number(token).map_or(0.0, |n| n.abs() as f64)
}

/// Connect every producer to every consumer, skipping self-pairs
fn connect(
    edges: &mut Vec<Edge>,
    producers: &BTreeSet<String>,
    consumers: &BTreeSet<String>,
    reason: &str,
    score: f64,
) {
    for from in producers {
        for to in consumers {
            if from != to {
                edges.push(Edge::new(from, to, reason, score));
            }
        }
    }
}

fn ratio(supplied: f64, needed: f64, fallback: f64) -> f64 {
    if needed > 0.0 {
        (supplied / needed).min(1.0)
    } else {
        fallback
    }
}

fn resource_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    let suppliers = keys_matching(&ctx.index.by_produces, don_supply_family());
    for (need, consumers) in keys_matching(&ctx.index.by_requires, don_need_family()) {
        let needed = magnitude(need).max(1.0);
        for (supply, producers) in &suppliers {
            let score = ratio(magnitude(supply), needed, 1.0);
            connect(edges, producers, consumers, "DON ladder", score);
        }
    }
}

/// Reducers against K.O./rest windows on other cards, and against cards that
/// ask for a lower cost
fn window_ladder(
    ctx: &LadderContext<'_>,
    edges: &mut Vec<Edge>,
    reducers: &Regex,
    windows: &Regex,
    enabler: &str,
    label: &str,
) {
    let config = ctx.config;
    let reducers = keys_matching(&ctx.index.by_produces, reducers);

    for (reducer, producers) in &reducers {
        let supplied = magnitude(reducer);
        for (window, owners) in keys_matching(&ctx.index.by_produces, windows) {
            let score = ratio(supplied, magnitude(window), config.window_fallback);
            connect(edges, producers, owners, &format!("{} (window)", label), score);
        }
        if let Some(consumers) = ctx.index.consumers(enabler) {
            let score = if supplied > 0.0 {
                config.enable_score
            } else {
                config.enable_score_weak
            };
            connect(edges, producers, consumers, &format!("{} (enable)", label), score);
        }
    }
}

fn cost_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    window_ladder(
        ctx,
        edges,
        cost_reducer_family(),
        cost_window_family(),
        "Enable:LowerCost",
        "Cost ladder",
    );
}

fn power_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    window_ladder(
        ctx,
        edges,
        power_reducer_family(),
        power_window_family(),
        "Enable:LowerPower",
        "Power ladder",
    );
}

fn sequencing_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    let players = keys_matching(&ctx.index.by_produces, play_from_top_family());
    for (_, stackers) in keys_matching(&ctx.index.by_produces, stacker_family()) {
        for (_, consumers) in &players {
            connect(
                edges,
                stackers,
                consumers,
                "Top-deck stack → PlayFromTop",
                ctx.config.sequencing_score,
            );
        }
    }
}

fn recycling_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    let gates = keys_matching(&ctx.index.by_requires, trash_gate_family());
    for (_, revivers) in keys_matching(&ctx.index.by_produces, reviver_family()) {
        for (_, consumers) in &gates {
            connect(
                edges,
                revivers,
                consumers,
                "Trash ladder",
                ctx.config.recycling_score,
            );
        }
    }
}

/// Filter-qualified cost modifiers fan out to every card the filter matches
fn category_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    let regex = filtered_cost_mod_family();
    for (token, producers) in keys_matching(&ctx.index.by_produces, regex) {
        let Some(caps) = regex.captures(token) else {
            continue;
        };
        let filter = match WhereFilter::parse(&caps[2]) {
            Ok(filter) => filter,
            Err(errors) => {
                log::debug!("Skipping {}: {}", token, errors.join("; "));
                continue;
            }
        };
        let amount = magnitude(&caps[1]);
        let score = (amount / ctx.config.fanout_divisor).min(1.0);
        let reason = match filter.detail() {
            Some(detail) => format!("Cost reducer: {}", detail),
            None => "Cost reducer".to_string(),
        };

        let targets: BTreeSet<String> = ctx
            .cards
            .regular_cards()
            .filter(|(_, card)| filter.matches(card))
            .map(|(id, _)| id.to_string())
            .collect();
        connect(edges, producers, &targets, &reason, score);
    }
}

fn trigger_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    let config = ctx.config;
    let sources: Vec<&BTreeSet<String>> = ["HasTrigger", "Character:HasTrigger"]
        .iter()
        .filter_map(|token| ctx.index.producers(token))
        .collect();
    if sources.is_empty() {
        return;
    }

    for (need, consumers) in &ctx.index.by_requires {
        let (reason, score) = if need.starts_with("NeedsPlayedThisTurn:HasTrigger>=") {
            (
                "Trigger ladder (played trigger enabler)",
                config.trigger_played_score,
            )
        } else if need.starts_with("CostDiscardFromHand:HasTrigger>=") {
            (
                "Trigger ladder (discard trigger enabler)",
                config.trigger_discard_score,
            )
        } else if need.starts_with("NeedsHand:HasTrigger>=") {
            (
                "Trigger ladder (hand contains trigger)",
                config.trigger_hand_score,
            )
        } else {
            continue;
        };
        for producers in &sources {
            connect(edges, producers, consumers, reason, score);
        }
    }
}

fn ally_ladder(ctx: &LadderContext<'_>, edges: &mut Vec<Edge>) {
    let config = ctx.config;
    let movers = keys_matching(&ctx.index.by_produces, trait_mover_family());
    let cost_enablers = keys_matching(&ctx.index.by_produces, cost_reducer_family());
    let don_enablers = keys_matching(&ctx.index.by_produces, don_supply_family());

    for (need, consumers) in &ctx.index.by_requires {
        let Some(rest) = need.strip_prefix("NeedsAllyTrait:") else {
            continue;
        };
        let ally = rest.split(':').next().unwrap_or(rest).trim();
        if ally.is_empty() {
            continue;
        }

        let direct = format!("Enable ally {} (direct)", ally);
        for (_, producers) in movers.iter().filter(|(token, _)| token.contains(ally)) {
            connect(edges, producers, consumers, &direct, config.ally_direct_score);
        }
        for (_, producers) in &cost_enablers {
            connect(
                edges,
                producers,
                consumers,
                "Enable ally (cost)",
                config.ally_indirect_score,
            );
        }
        for (_, producers) in &don_enablers {
            connect(
                edges,
                producers,
                consumers,
                "Enable ally (DON)",
                config.ally_indirect_score,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{Card, CardType};
    use crate::domain::effects::{EffectCategory, Effects};

    struct Fixture {
        effects: Vec<(String, Effects)>,
        cards: CardDatabase,
        config: GraphConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                effects: Vec::new(),
                cards: CardDatabase::new(),
                config: GraphConfig::default(),
            }
        }

        fn card(mut self, id: &str, produces: &[&str], requires: &[&str]) -> Self {
            let mut e = Effects::new();
            for p in produces {
                e.insert(EffectCategory::Produces, *p);
            }
            for r in requires {
                e.insert(EffectCategory::Requires, *r);
            }
            self.effects.push((id.to_string(), e));
            self
        }

        fn run(&self, kind: LadderKind) -> Vec<Edge> {
            let index =
                PostingsIndex::from_effects(self.effects.iter().map(|(id, e)| (id.as_str(), e)));
            let ctx = LadderContext {
                index: &index,
                cards: &self.cards,
                config: &self.config,
            };
            let mut edges = Vec::new();
            kind.run(&ctx, &mut edges);
            edges
        }
    }

    #[test]
    fn test_cost_window_full_score() {
        let edges = Fixture::new()
            .card("A", &["ReduceCost:5:ThisTurn"], &[])
            .card("B", &["KO:Cost<=5"], &[])
            .run(LadderKind::Cost);
        assert_eq!(edges, vec![Edge::new("A", "B", "Cost ladder (window)", 1.0)]);
    }

    #[test]
    fn test_cost_window_partial_and_fallback() {
        let edges = Fixture::new()
            .card("A", &["CostMod:-1"], &[])
            .card("B", &["RestTarget:Cost<=4"], &[])
            .card("C", &["KO:Cost<=0"], &[])
            .run(LadderKind::Cost);
        let to_b = edges.iter().find(|e| e.to == "B").unwrap();
        assert_eq!(to_b.score, 0.25);
        let to_c = edges.iter().find(|e| e.to == "C").unwrap();
        assert_eq!(to_c.score, 0.5);
    }

    #[test]
    fn test_cost_enable_edges() {
        let edges = Fixture::new()
            .card("A", &["ReduceCost:2:UntilEndOfTurn"], &[])
            .card("B", &["KO:Cost<=3"], &["Enable:LowerCost"])
            .run(LadderKind::Cost);
        assert!(edges.contains(&Edge::new("A", "B", "Cost ladder (enable)", 0.6)));
        assert!(edges
            .iter()
            .any(|e| e.reason == "Cost ladder (window)" && (e.score - 2.0 / 3.0).abs() < 1e-9));
    }

    #[test]
    fn test_cost_setter_is_a_reducer() {
        let edges = Fixture::new()
            .card("A", &["SetCost:2:ThisTurn"], &[])
            .card("B", &["KO:Cost<=4"], &["Enable:LowerCost"])
            .run(LadderKind::Cost);
        assert!(edges.contains(&Edge::new("A", "B", "Cost ladder (window)", 0.5)));
        assert!(edges.contains(&Edge::new("A", "B", "Cost ladder (enable)", 0.6)));

        let edges = Fixture::new()
            .card("A", &["SetCost:0:UntilEndOfOppNextTurn"], &[])
            .card("B", &[], &["Enable:LowerCost"])
            .run(LadderKind::Cost);
        assert_eq!(edges, vec![Edge::new("A", "B", "Cost ladder (enable)", 0.4)]);
    }

    #[test]
    fn test_self_pairs_are_skipped() {
        let edges = Fixture::new()
            .card("A", &["ReduceCost:2:ThisTurn", "KO:Cost<=2"], &["Enable:LowerCost"])
            .run(LadderKind::Cost);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_resource_ladder_ratio() {
        let edges = Fixture::new()
            .card("A", &["DON:AttachRested:+1"], &[])
            .card("B", &[], &["NeedsDON:>=2"])
            .run(LadderKind::Resource);
        assert_eq!(edges, vec![Edge::new("A", "B", "DON ladder", 0.5)]);
    }

    #[test]
    fn test_power_ladder() {
        let edges = Fixture::new()
            .card("A", &["ReducePower:2000:ThisTurn"], &[])
            .card("B", &["KO:Power<=4000"], &["Enable:LowerPower"])
            .run(LadderKind::Power);
        assert!(edges.contains(&Edge::new("A", "B", "Power ladder (window)", 0.5)));
        assert!(edges.contains(&Edge::new("A", "B", "Power ladder (enable)", 0.6)));
    }

    #[test]
    fn test_sequencing_and_recycling() {
        let edges = Fixture::new()
            .card("A", &["ArrangeTop:3"], &[])
            .card("B", &["PlayFromTop:Cost<=4"], &[])
            .run(LadderKind::Sequencing);
        assert_eq!(
            edges,
            vec![Edge::new("A", "B", "Top-deck stack → PlayFromTop", 1.0)]
        );

        let edges = Fixture::new()
            .card("A", &["PlayFromTrash:Cost<=4"], &[])
            .card("B", &[], &["NeedsTrashType:Event>=3"])
            .run(LadderKind::Recycling);
        assert_eq!(edges, vec![Edge::new("A", "B", "Trash ladder", 0.8)]);
    }

    #[test]
    fn test_category_fan_out() {
        let mut fixture = Fixture::new().card(
            "A",
            &["CostMod:-1[where=Category:{Celestial Dragons}; Cost>=2]"],
            &[],
        );
        fixture.cards = [
            Card::new("A", "Source", CardType::Character).with_categories(&["Celestial Dragons"]),
            Card::new("B", "Charlos", CardType::Character)
                .with_categories(&["Celestial Dragons"])
                .with_cost(3),
            Card::new("C", "Cheap", CardType::Character)
                .with_categories(&["Celestial Dragons"])
                .with_cost(1),
            Card::new("B_p1", "Charlos", CardType::Character)
                .with_categories(&["Celestial Dragons"])
                .with_cost(3),
            Card::new("D", "Navy", CardType::Character).with_categories(&["Navy"]),
        ]
        .into_iter()
        .collect();

        let edges = fixture.run(LadderKind::Category);
        assert_eq!(
            edges,
            vec![Edge::new("A", "B", "Cost reducer: Celestial Dragons", 0.2)]
        );
    }

    #[test]
    fn test_trigger_ladder_reasons() {
        let edges = Fixture::new()
            .card("A", &["HasTrigger", "Character:HasTrigger"], &[])
            .card("B", &[], &["NeedsPlayedThisTurn:HasTrigger>=1"])
            .card("C", &[], &["CostDiscardFromHand:HasTrigger>=1"])
            .run(LadderKind::Trigger);
        assert!(edges.contains(&Edge::new(
            "A",
            "B",
            "Trigger ladder (played trigger enabler)",
            0.9
        )));
        assert!(edges.contains(&Edge::new(
            "A",
            "C",
            "Trigger ladder (discard trigger enabler)",
            0.8
        )));
    }

    #[test]
    fn test_ally_ladder() {
        let edges = Fixture::new()
            .card("A", &["SearchTrait:Whitebeard Pirates"], &[])
            .card("B", &["DON:AddActive:+1"], &[])
            .card("C", &["SearchTrait:Navy"], &[])
            .card("D", &[], &["NeedsAllyTrait:Whitebeard Pirates:Cost>=5"])
            .run(LadderKind::Ally);
        assert!(edges.contains(&Edge::new(
            "A",
            "D",
            "Enable ally Whitebeard Pirates (direct)",
            1.0
        )));
        assert!(edges.contains(&Edge::new("B", "D", "Enable ally (DON)", 0.6)));
        assert!(!edges.iter().any(|e| e.from == "C"));
    }
}
