//! Trade link synchronizer
//!
//! Every active keeper trade is stored twice: the canonical record on the
//! original owner's roster (`trade = true`, `locked = false`) and a mirror on
//! the acquiring roster (`trade = true`, `locked = true`, `keep = true`,
//! `trade_roster_id` pointing back at the owner). Amount and note are copied
//! onto the mirror on every write.
//!
//! Edits run in two phases. [`plan_edit`] validates the request and computes
//! the canonical replacement plus the mirror removal/insertion without
//! touching the rosters. [`TradeLinkPlan::commit`] then applies both sides to
//! a copy of the roster set in one step, so no caller ever observes a trade
//! that is mirrored on one side only.

use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::rules::LeagueRules;
use crate::types::{PlayerId, Roster, RosterId, RosterPlayer};

/// A single edit to one player record on one roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEdit {
    ToggleKeep,
    /// Begin a trade to the default counterparty, or cancel an active one
    ToggleTrade,
    BeginTrade { counterparty: Option<RosterId> },
    CancelTrade,
    SetCounterparty(RosterId),
    SetAmount(Option<u32>),
    SetNote(Option<String>),
}

/// Why an otherwise valid edit was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Mirror records are edited only through their canonical record
    MirrorRecord,
    /// `years_kept` is past the league limit
    Ineligible,
    /// Keep cannot be toggled while the player is being traded
    TradeActive,
    AlreadyTrading,
    NotTrading,
    /// No other roster exists to trade with
    NoCounterparty,
}

/// Canonical + mirror deltas for one edit, computed before either is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeLinkPlan {
    source: RosterId,
    player_index: usize,
    canonical: RosterPlayer,
    remove_mirror_from: Option<RosterId>,
    upsert_mirror: Option<(RosterId, RosterPlayer)>,
}

/// Result of committing a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCommit {
    pub rosters: Vec<Roster>,
    /// Rosters whose records changed, source first
    pub affected: Vec<RosterId>,
}

/// Outcome of [`apply_edit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(LinkCommit),
    Rejected(RejectReason),
}

impl TradeLinkPlan {
    /// Rosters this plan writes to, source first, without duplicates
    pub fn affected(&self) -> Vec<RosterId> {
        let mut affected = vec![self.source];
        for roster_id in self
            .remove_mirror_from
            .into_iter()
            .chain(self.upsert_mirror.as_ref().map(|(roster_id, _)| *roster_id))
        {
            if !affected.contains(&roster_id) {
                affected.push(roster_id);
            }
        }
        affected
    }

    /// Apply canonical and mirror deltas to a copy of `rosters`
    pub fn commit(self, rosters: &[Roster]) -> LinkCommit {
        let affected = self.affected();
        let mut next = rosters.to_vec();
        let player_id = self.canonical.player_id.clone();

        if let Some(target) = self.remove_mirror_from {
            if let Some(roster) = next.iter_mut().find(|r| r.roster_id == target) {
                roster.players.retain(|p| !p.is_mirror_of(&player_id, self.source));
            }
        }

        if let Some(roster) = next.iter_mut().find(|r| r.roster_id == self.source) {
            if let Some(slot) = roster.players.get_mut(self.player_index) {
                *slot = self.canonical;
            }
        }

        if let Some((target, mirror)) = self.upsert_mirror {
            if let Some(roster) = next.iter_mut().find(|r| r.roster_id == target) {
                match roster.players.iter_mut().find(|p| p.is_mirror_of(&player_id, self.source)) {
                    Some(existing) => *existing = mirror,
                    None => roster.players.push(mirror),
                }
            }
        }

        for roster in next.iter_mut().filter(|r| affected.contains(&r.roster_id)) {
            roster.sort_players();
        }

        LinkCommit { rosters: next, affected }
    }
}

/// Validate `edit` against the current rosters and compute its deltas.
///
/// `Err` is a validation failure; `Ok(Err(_))` is a silent rejection.
pub fn plan_edit(
    rosters: &[Roster],
    source: RosterId,
    player_index: usize,
    edit: RosterEdit,
    rules: &LeagueRules,
) -> Result<std::result::Result<TradeLinkPlan, RejectReason>> {
    let roster = find_roster(rosters, source)?;
    let current = roster
        .players
        .get(player_index)
        .ok_or(LedgerError::PlayerIndexOutOfRange { roster_id: source, index: player_index })?;

    if current.locked {
        return Ok(Err(RejectReason::MirrorRecord));
    }
    if !rules.is_eligible(current.years_kept) {
        return Ok(Err(RejectReason::Ineligible));
    }

    let mut canonical = current.clone();

    match edit {
        RosterEdit::ToggleTrade => {
            let resolved = if current.trade {
                RosterEdit::CancelTrade
            } else {
                RosterEdit::BeginTrade { counterparty: None }
            };
            plan_edit(rosters, source, player_index, resolved, rules)
        }
        RosterEdit::ToggleKeep => {
            if current.trade {
                return Ok(Err(RejectReason::TradeActive));
            }
            if !current.keep && roster.kept_count() >= rules.max_keepers_per_roster {
                return Err(LedgerError::KeeperLimitExceeded {
                    roster_id: source,
                    max: rules.max_keepers_per_roster,
                });
            }
            canonical.keep = !current.keep;
            Ok(Ok(make_plan(source, player_index, canonical, None, None)))
        }
        RosterEdit::BeginTrade { counterparty } => {
            if current.trade {
                return Ok(Err(RejectReason::AlreadyTrading));
            }
            let target = match counterparty {
                Some(target) => validate_counterparty(rosters, source, target)?,
                None => match rosters.iter().find(|r| r.roster_id != source) {
                    Some(other) => other.roster_id,
                    None => return Ok(Err(RejectReason::NoCounterparty)),
                },
            };
            canonical.prev_keep = Some(current.keep);
            canonical.keep = false;
            canonical.trade = true;
            canonical.trade_roster_id = Some(target);
            canonical.trade_amount = None;
            canonical.trade_note = None;
            Ok(Ok(make_plan(source, player_index, canonical, None, Some(target))))
        }
        RosterEdit::CancelTrade => {
            if !current.trade {
                return Ok(Err(RejectReason::NotTrading));
            }
            canonical.keep = current.prev_keep.unwrap_or(false);
            canonical.prev_keep = None;
            canonical.trade = false;
            canonical.trade_roster_id = None;
            canonical.trade_amount = None;
            canonical.trade_note = None;
            Ok(Ok(make_plan(source, player_index, canonical, current.trade_roster_id, None)))
        }
        RosterEdit::SetCounterparty(target) => {
            if !current.trade {
                return Ok(Err(RejectReason::NotTrading));
            }
            let target = validate_counterparty(rosters, source, target)?;
            canonical.trade_roster_id = Some(target);
            Ok(Ok(make_plan(source, player_index, canonical, current.trade_roster_id, Some(target))))
        }
        RosterEdit::SetAmount(amount) => {
            if !current.trade {
                return Ok(Err(RejectReason::NotTrading));
            }
            canonical.trade_amount = amount;
            Ok(Ok(make_plan(source, player_index, canonical, None, current.trade_roster_id)))
        }
        RosterEdit::SetNote(note) => {
            if !current.trade {
                return Ok(Err(RejectReason::NotTrading));
            }
            if let Some(len) = note.as_ref().map(|n| n.chars().count()) {
                if len > rules.max_trade_note_len {
                    return Err(LedgerError::NoteTooLong { len, max: rules.max_trade_note_len });
                }
            }
            canonical.trade_note = note;
            Ok(Ok(make_plan(source, player_index, canonical, None, current.trade_roster_id)))
        }
    }
}

fn make_plan(
    source: RosterId,
    player_index: usize,
    canonical: RosterPlayer,
    remove_mirror_from: Option<RosterId>,
    upsert_to: Option<RosterId>,
) -> TradeLinkPlan {
    let upsert_mirror = upsert_to.map(|target| (target, build_mirror(&canonical, source)));
    TradeLinkPlan { source, player_index, canonical, remove_mirror_from, upsert_mirror }
}

/// Plan and commit in one call
pub fn apply_edit(
    rosters: &[Roster],
    source: RosterId,
    player_index: usize,
    edit: RosterEdit,
    rules: &LeagueRules,
) -> Result<EditOutcome> {
    Ok(match plan_edit(rosters, source, player_index, edit, rules)? {
        Ok(plan) => EditOutcome::Applied(plan.commit(rosters)),
        Err(reason) => EditOutcome::Rejected(reason),
    })
}

fn find_roster(rosters: &[Roster], roster_id: RosterId) -> Result<&Roster> {
    rosters
        .iter()
        .find(|r| r.roster_id == roster_id)
        .ok_or(LedgerError::UnknownRoster { roster_id })
}

fn validate_counterparty(rosters: &[Roster], source: RosterId, target: RosterId) -> Result<RosterId> {
    if target == source {
        return Err(LedgerError::SelfTrade { roster_id: source });
    }
    find_roster(rosters, target).map(|r| r.roster_id)
}

/// Mirror of `canonical` as seen by the acquiring roster
pub fn build_mirror(canonical: &RosterPlayer, source: RosterId) -> RosterPlayer {
    RosterPlayer {
        player_id: canonical.player_id.clone(),
        name: canonical.name.clone(),
        previous_cost: canonical.previous_cost,
        years_kept: canonical.years_kept,
        cost_to_keep: canonical.cost_to_keep,
        keep: true,
        trade: true,
        trade_roster_id: Some(source),
        trade_amount: canonical.trade_amount,
        trade_note: canonical.trade_note.clone(),
        locked: true,
        prev_keep: None,
    }
}

/// A broken link between canonical and mirror records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkViolation {
    /// Canonical trade without a counterparty that exists
    DanglingTrade { roster_id: RosterId, player_id: PlayerId },
    MissingMirror { source: RosterId, target: RosterId, player_id: PlayerId },
    DuplicateMirror { source: RosterId, target: RosterId, player_id: PlayerId, count: usize },
    DivergedMirror { source: RosterId, target: RosterId, player_id: PlayerId },
    OrphanMirror { roster_id: RosterId, player_id: PlayerId, claimed_source: Option<RosterId> },
    /// Ineligible player still marked keep or trade
    IneligibleSelection { roster_id: RosterId, player_id: PlayerId },
    /// Canonical record marked both keep and trade
    KeepAndTrade { roster_id: RosterId, player_id: PlayerId },
}

/// Audit every trade link in the roster set
pub fn check_trade_links(rosters: &[Roster], rules: &LeagueRules) -> Vec<LinkViolation> {
    let mut violations = Vec::new();
    let mut matched: HashMap<(RosterId, &str, RosterId), usize> = HashMap::new();

    for roster in rosters {
        for player in &roster.players {
            if !rules.is_eligible(player.years_kept) && (player.keep || player.trade) {
                violations.push(LinkViolation::IneligibleSelection {
                    roster_id: roster.roster_id,
                    player_id: player.player_id.clone(),
                });
            }
            if !player.is_canonical_trade() {
                continue;
            }
            if player.keep {
                violations.push(LinkViolation::KeepAndTrade {
                    roster_id: roster.roster_id,
                    player_id: player.player_id.clone(),
                });
            }
            let Some(target) = player
                .trade_roster_id
                .and_then(|target| rosters.iter().find(|r| r.roster_id == target))
            else {
                violations.push(LinkViolation::DanglingTrade {
                    roster_id: roster.roster_id,
                    player_id: player.player_id.clone(),
                });
                continue;
            };
            let mirrors: Vec<_> = target
                .players
                .iter()
                .filter(|p| p.is_mirror_of(&player.player_id, roster.roster_id))
                .collect();
            let source = roster.roster_id;
            let player_id = player.player_id.clone();
            match mirrors.as_slice() {
                [] => violations.push(LinkViolation::MissingMirror {
                    source,
                    target: target.roster_id,
                    player_id,
                }),
                [mirror] => {
                    if !(mirror.keep && mirror.trade)
                        || mirror.trade_amount != player.trade_amount
                        || mirror.trade_note != player.trade_note
                    {
                        violations.push(LinkViolation::DivergedMirror {
                            source,
                            target: target.roster_id,
                            player_id,
                        });
                    }
                }
                many => violations.push(LinkViolation::DuplicateMirror {
                    source,
                    target: target.roster_id,
                    player_id,
                    count: many.len(),
                }),
            }
            matched.insert((target.roster_id, player.player_id.as_str(), source), mirrors.len());
        }
    }

    for roster in rosters {
        for player in roster.players.iter().filter(|p| p.locked) {
            let linked = player.trade_roster_id.is_some_and(|source| {
                matched.contains_key(&(roster.roster_id, player.player_id.as_str(), source))
            });
            if !linked {
                violations.push(LinkViolation::OrphanMirror {
                    roster_id: roster.roster_id,
                    player_id: player.player_id.clone(),
                    claimed_source: player.trade_roster_id,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::cost_to_keep;

    fn player(id: &str, previous_cost: Option<u32>, years_kept: u32) -> RosterPlayer {
        RosterPlayer::new(id, id.to_uppercase(), previous_cost, years_kept, cost_to_keep(previous_cost, years_kept))
    }

    fn league() -> Vec<Roster> {
        vec![
            Roster::new(1, Some("m1".into()), Some("Alice".into()), None).with_players(vec![
                player("p", Some(100), 0),
                player("q", Some(30), 1),
                player("old", Some(60), 2),
            ]),
            Roster::new(2, Some("m2".into()), Some("Bob".into()), None)
                .with_players(vec![player("r", Some(50), 0)]),
            Roster::new(3, Some("m3".into()), Some("Carol".into()), None)
                .with_players(vec![player("s", Some(10), 0)]),
        ]
    }

    fn index_of(rosters: &[Roster], roster_id: RosterId, player_id: &str) -> usize {
        rosters
            .iter()
            .find(|r| r.roster_id == roster_id)
            .and_then(|r| r.players.iter().position(|p| p.player_id == player_id && !p.locked))
            .expect("player present")
    }

    fn roster(rosters: &[Roster], roster_id: RosterId) -> &Roster {
        rosters.iter().find(|r| r.roster_id == roster_id).expect("roster present")
    }

    fn applied(outcome: Result<EditOutcome>) -> LinkCommit {
        match outcome.expect("valid edit") {
            EditOutcome::Applied(commit) => commit,
            EditOutcome::Rejected(reason) => panic!("edit rejected: {reason:?}"),
        }
    }

    fn edit(rosters: &[Roster], roster_id: RosterId, player_id: &str, edit: RosterEdit) -> Vec<Roster> {
        let index = index_of(rosters, roster_id, player_id);
        applied(apply_edit(rosters, roster_id, index, edit, &LeagueRules::default())).rosters
    }

    fn mirrors_of(rosters: &[Roster], player_id: &str) -> Vec<(RosterId, RosterPlayer)> {
        rosters
            .iter()
            .flat_map(|r| {
                r.players
                    .iter()
                    .filter(|p| p.locked && p.player_id == player_id)
                    .map(move |p| (r.roster_id, p.clone()))
            })
            .collect()
    }

    #[test]
    fn test_toggle_keep() {
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleKeep);
        let p = &roster(&rosters, 1).players[index_of(&rosters, 1, "p")];
        assert!(p.keep);
        assert_eq!(p.cost_to_keep, Some(105));

        let rosters = edit(&rosters, 1, "p", RosterEdit::ToggleKeep);
        assert!(!roster(&rosters, 1).players[index_of(&rosters, 1, "p")].keep);
    }

    #[test]
    fn test_begin_trade_creates_mirror_on_default_counterparty() {
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleKeep);
        let commit = applied(apply_edit(
            &rosters,
            1,
            index_of(&rosters, 1, "p"),
            RosterEdit::ToggleTrade,
            &LeagueRules::default(),
        ));
        assert_eq!(commit.affected, vec![1, 2]);

        let p = &roster(&commit.rosters, 1).players[index_of(&commit.rosters, 1, "p")];
        assert!(p.trade);
        assert!(!p.keep);
        assert_eq!(p.prev_keep, Some(true));
        assert_eq!(p.trade_roster_id, Some(2));

        let mirrors = mirrors_of(&commit.rosters, "p");
        assert_eq!(mirrors.len(), 1);
        let (holder, mirror) = &mirrors[0];
        assert_eq!(*holder, 2);
        assert!(mirror.keep && mirror.trade && mirror.locked);
        assert_eq!(mirror.trade_roster_id, Some(1));
        assert!(check_trade_links(&commit.rosters, &LeagueRules::default()).is_empty());
    }

    #[test]
    fn test_cancel_trade_restores_keep_and_removes_mirror() {
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleKeep);
        let rosters = edit(&rosters, 1, "p", RosterEdit::ToggleTrade);
        let rosters = edit(&rosters, 1, "p", RosterEdit::SetAmount(Some(15)));
        let rosters = edit(&rosters, 1, "p", RosterEdit::ToggleTrade);

        let p = &roster(&rosters, 1).players[index_of(&rosters, 1, "p")];
        assert!(p.keep);
        assert!(!p.trade);
        assert_eq!(p.trade_roster_id, None);
        assert_eq!(p.trade_amount, None);
        assert!(mirrors_of(&rosters, "p").is_empty());
        assert_eq!(roster(&rosters, 2).players.len(), 1);
    }

    #[test]
    fn test_change_counterparty_moves_mirror_and_preserves_terms() {
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleTrade);
        let rosters = edit(&rosters, 1, "p", RosterEdit::SetAmount(Some(15)));
        let rosters = edit(&rosters, 1, "p", RosterEdit::SetNote(Some("2nd round swap".into())));
        let rosters = edit(&rosters, 1, "p", RosterEdit::SetCounterparty(3));

        let mirrors = mirrors_of(&rosters, "p");
        assert_eq!(mirrors.len(), 1);
        assert_eq!(mirrors[0].0, 3);
        assert_eq!(mirrors[0].1.trade_amount, Some(15));
        assert_eq!(mirrors[0].1.trade_note.as_deref(), Some("2nd round swap"));
        assert!(check_trade_links(&rosters, &LeagueRules::default()).is_empty());
    }

    #[test]
    fn test_amount_and_note_write_through_to_mirror() {
        let rosters = edit(&league(), 1, "p", RosterEdit::BeginTrade { counterparty: Some(3) });
        let rosters = edit(&rosters, 1, "p", RosterEdit::SetAmount(Some(20)));
        let rosters = edit(&rosters, 1, "p", RosterEdit::SetNote(Some("future".into())));
        let canonical = &roster(&rosters, 1).players[index_of(&rosters, 1, "p")];
        let (_, mirror) = &mirrors_of(&rosters, "p")[0];
        assert_eq!(canonical.trade_amount, mirror.trade_amount);
        assert_eq!(canonical.trade_note, mirror.trade_note);
    }

    #[test]
    fn test_mirror_records_are_not_editable() {
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleTrade);
        let mirror_index = roster(&rosters, 2).players.iter().position(|p| p.locked).expect("mirror");
        for attempt in [RosterEdit::ToggleKeep, RosterEdit::ToggleTrade, RosterEdit::SetAmount(Some(1))] {
            let outcome = apply_edit(&rosters, 2, mirror_index, attempt, &LeagueRules::default());
            assert_eq!(outcome, Ok(EditOutcome::Rejected(RejectReason::MirrorRecord)));
        }
    }

    #[test]
    fn test_ineligible_player_cannot_be_kept_or_traded() {
        let rosters = league();
        let index = index_of(&rosters, 1, "old");
        for attempt in [RosterEdit::ToggleKeep, RosterEdit::ToggleTrade] {
            let outcome = apply_edit(&rosters, 1, index, attempt, &LeagueRules::default());
            assert_eq!(outcome, Ok(EditOutcome::Rejected(RejectReason::Ineligible)));
        }
    }

    #[test]
    fn test_keep_toggle_rejected_while_trading() {
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleTrade);
        let outcome =
            apply_edit(&rosters, 1, index_of(&rosters, 1, "p"), RosterEdit::ToggleKeep, &LeagueRules::default());
        assert_eq!(outcome, Ok(EditOutcome::Rejected(RejectReason::TradeActive)));
    }

    #[test]
    fn test_validation_failures() {
        let rules = LeagueRules::default();
        let rosters = edit(&league(), 1, "p", RosterEdit::ToggleTrade);
        let index = index_of(&rosters, 1, "p");
        assert_eq!(
            apply_edit(&rosters, 1, index, RosterEdit::SetCounterparty(1), &rules),
            Err(LedgerError::SelfTrade { roster_id: 1 })
        );
        assert_eq!(
            apply_edit(&rosters, 1, index, RosterEdit::SetCounterparty(42), &rules),
            Err(LedgerError::UnknownRoster { roster_id: 42 })
        );
        assert_eq!(
            apply_edit(&rosters, 1, 99, RosterEdit::ToggleKeep, &rules),
            Err(LedgerError::PlayerIndexOutOfRange { roster_id: 1, index: 99 })
        );
        assert!(matches!(
            apply_edit(&rosters, 1, index, RosterEdit::SetNote(Some("x".repeat(501))), &rules),
            Err(LedgerError::NoteTooLong { len: 501, max: 500 })
        ));
    }

    #[test]
    fn test_keeper_limit() {
        let rules = LeagueRules { max_keepers_per_roster: 1, ..Default::default() };
        let rosters = league();
        let rosters = applied(apply_edit(&rosters, 1, index_of(&rosters, 1, "p"), RosterEdit::ToggleKeep, &rules)).rosters;
        assert_eq!(
            apply_edit(&rosters, 1, index_of(&rosters, 1, "q"), RosterEdit::ToggleKeep, &rules),
            Err(LedgerError::KeeperLimitExceeded { roster_id: 1, max: 1 })
        );
    }

    #[test]
    fn test_single_roster_has_no_counterparty() {
        let rosters = vec![league().remove(0)];
        let outcome =
            apply_edit(&rosters, 1, index_of(&rosters, 1, "p"), RosterEdit::ToggleTrade, &LeagueRules::default());
        assert_eq!(outcome, Ok(EditOutcome::Rejected(RejectReason::NoCounterparty)));
    }

    #[test]
    fn test_check_trade_links_reports_orphans_and_divergence() {
        let rules = LeagueRules::default();
        let mut rosters = edit(&league(), 1, "p", RosterEdit::ToggleTrade);
        rosters = edit(&rosters, 1, "p", RosterEdit::SetAmount(Some(5)));

        let mut diverged = rosters.clone();
        for p in diverged[1].players.iter_mut().filter(|p| p.locked) {
            p.trade_amount = Some(6);
        }
        assert!(matches!(
            check_trade_links(&diverged, &rules).as_slice(),
            [LinkViolation::DivergedMirror { source: 1, target: 2, .. }]
        ));

        let mut orphaned = rosters.clone();
        let canonical = index_of(&orphaned, 1, "p");
        orphaned[0].players[canonical].clear_selection();
        assert!(matches!(
            check_trade_links(&orphaned, &rules).as_slice(),
            [LinkViolation::OrphanMirror { roster_id: 2, claimed_source: Some(1), .. }]
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_edit() -> impl Strategy<Value = RosterEdit> {
            prop_oneof![
                Just(RosterEdit::ToggleKeep),
                Just(RosterEdit::ToggleTrade),
                (1u32..=3).prop_map(RosterEdit::SetCounterparty),
                proptest::option::of(1u32..50).prop_map(RosterEdit::SetAmount),
                proptest::option::of("[a-z]{0,8}").prop_map(RosterEdit::SetNote),
            ]
        }

        proptest! {
            #[test]
            fn links_stay_consistent(steps in proptest::collection::vec((1u32..=3, 0usize..4, arb_edit()), 1..40)) {
                let rules = LeagueRules::default();
                let mut rosters = league();
                for (roster_id, index, edit) in steps {
                    if let Ok(EditOutcome::Applied(commit)) = apply_edit(&rosters, roster_id, index, edit, &rules) {
                        rosters = commit.rosters;
                    }
                    prop_assert!(check_trade_links(&rosters, &rules).is_empty());
                    for roster in &rosters {
                        for player in &roster.players {
                            if player.years_kept > 1 {
                                prop_assert!(!player.keep && !player.trade);
                            }
                        }
                    }
                }
            }
        }
    }
}
