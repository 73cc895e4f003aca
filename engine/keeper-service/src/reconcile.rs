//! Merge-on-load: current rosters + saved keepers + prior season
//!
//! Rebuilds the working roster set for a season:
//!
//! 1. `years_kept` comes from the prior season (kept last year => +1).
//! 2. Saved rows for a roster are laid over its current players; saved rows
//!    for players no longer on the roster are appended.
//! 3. A saved mirror row (`trade_from_roster_id` != `roster_id`) restores the
//!    canonical side on the original owner's roster.
//! 4. Anything past the eligibility limit loses its selection.

use std::collections::HashMap;

use keeper_ledger::{LeagueRules, PlayerId, Roster, RosterId, RosterPlayer};

use crate::store::{SavedKeeper, SeasonRoster};

/// Rebuild rosters for a season from its three sources
pub fn reconcile_season(
    current: &[SeasonRoster],
    saved: &[SavedKeeper],
    prior: &[SavedKeeper],
    rules: &LeagueRules,
) -> Vec<Roster> {
    let prior_years: HashMap<&str, u32> = prior
        .iter()
        .map(|row| (row.player_id.as_str(), row.years_kept.unwrap_or(0).saturating_add(1)))
        .collect();

    let mut saved_by_roster: HashMap<RosterId, Vec<&SavedKeeper>> = HashMap::new();
    let mut traded_from: HashMap<RosterId, Vec<&SavedKeeper>> = HashMap::new();
    for row in saved {
        saved_by_roster.entry(row.roster_id).or_default().push(row);
        if let Some(owner) = row.traded_from() {
            traded_from.entry(owner).or_default().push(row);
        }
    }

    current
        .iter()
        .map(|team| {
            let empty = Vec::new();
            let saved_rows = saved_by_roster.get(&team.roster_id).unwrap_or(&empty);
            let mut players = merge_roster(team, saved_rows, &prior_years, rules);

            for row in traded_from.get(&team.roster_id).into_iter().flatten() {
                restore_canonical(&mut players, row, &prior_years, rules);
            }

            Roster::new(
                team.roster_id,
                team.manager_id.clone(),
                team.manager_name.clone(),
                team.team_name.clone(),
            )
            .with_players(players)
        })
        .collect()
}

fn merge_roster(
    team: &SeasonRoster,
    saved_rows: &[&SavedKeeper],
    prior_years: &HashMap<&str, u32>,
    rules: &LeagueRules,
) -> Vec<RosterPlayer> {
    let saved_by_player: HashMap<&PlayerId, &SavedKeeper> =
        saved_rows.iter().copied().map(|row| (&row.player_id, row)).collect();

    let mut players: Vec<RosterPlayer> = team
        .players
        .iter()
        .map(|drafted| {
            let years_kept = prior_years.get(drafted.id.as_str()).copied().unwrap_or(0);
            let mut player = RosterPlayer::new(
                drafted.id.clone(),
                drafted.name.clone(),
                drafted.draft_cost,
                years_kept,
                rules.cost_to_keep(drafted.draft_cost, years_kept),
            );
            if let Some(row) = saved_by_player.get(&drafted.id) {
                apply_saved(&mut player, row);
            }
            finish(player, rules)
        })
        .collect();

    // Saved rows for players no longer on the current roster
    for row in saved_rows {
        if team.players.iter().any(|drafted| drafted.id == row.player_id) {
            continue;
        }
        let years_kept = carried_years(prior_years, row);
        let mut player = RosterPlayer::new(
            row.player_id.clone(),
            row.player_name.clone().unwrap_or_else(|| row.player_id.clone()),
            row.previous_cost,
            years_kept,
            rules.cost_to_keep(row.previous_cost, years_kept),
        );
        apply_saved(&mut player, row);
        players.push(finish(player, rules));
    }

    players
}

/// Prior season wins over the saved row's own count
fn carried_years(prior_years: &HashMap<&str, u32>, row: &SavedKeeper) -> u32 {
    prior_years
        .get(row.player_id.as_str())
        .copied()
        .or(row.years_kept)
        .unwrap_or(0)
}

/// A saved row means the player was kept; a traded-in row becomes a mirror
fn apply_saved(player: &mut RosterPlayer, row: &SavedKeeper) {
    player.keep = true;
    if let Some(owner) = row.traded_from() {
        player.trade = true;
        player.locked = true;
        player.trade_roster_id = Some(owner);
        player.trade_amount = row.trade_amount;
        player.trade_note = row.trade_note.clone();
    }
}

fn finish(mut player: RosterPlayer, rules: &LeagueRules) -> RosterPlayer {
    if !rules.is_eligible(player.years_kept) {
        player.clear_selection();
    }
    player
}

/// Put the canonical side of a saved keeper trade back on the owner's roster
fn restore_canonical(
    players: &mut Vec<RosterPlayer>,
    row: &SavedKeeper,
    prior_years: &HashMap<&str, u32>,
    rules: &LeagueRules,
) {
    let index = players.iter().position(|p| p.player_id == row.player_id && !p.locked);
    let player = match index {
        Some(index) => &mut players[index],
        None => {
            let years_kept = carried_years(prior_years, row);
            players.push(RosterPlayer::new(
                row.player_id.clone(),
                row.player_name.clone().unwrap_or_else(|| row.player_id.clone()),
                row.previous_cost,
                years_kept,
                rules.cost_to_keep(row.previous_cost, years_kept),
            ));
            let last = players.len() - 1;
            &mut players[last]
        }
    };

    if !rules.is_eligible(player.years_kept) {
        player.clear_selection();
        return;
    }
    player.keep = false;
    player.trade = true;
    player.locked = false;
    player.prev_keep = None;
    player.trade_roster_id = Some(row.roster_id);
    player.trade_amount = row.trade_amount;
    player.trade_note = row.trade_note.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DraftedPlayer;
    use keeper_ledger::{check_trade_links, RosterPlayer};

    fn drafted(id: &str, cost: u32) -> DraftedPlayer {
        DraftedPlayer { id: id.to_string(), name: id.to_uppercase(), draft_cost: Some(cost) }
    }

    fn team(roster_id: RosterId, name: &str, players: Vec<DraftedPlayer>) -> SeasonRoster {
        SeasonRoster {
            roster_id,
            manager_id: None,
            manager_name: Some(name.to_string()),
            team_name: None,
            players,
        }
    }

    fn row(roster_id: RosterId, player_id: &str) -> SavedKeeper {
        SavedKeeper {
            roster_id,
            player_id: player_id.to_string(),
            player_name: Some(player_id.to_uppercase()),
            previous_cost: Some(100),
            years_kept: Some(0),
            trade_from_roster_id: None,
            trade_amount: None,
            trade_note: None,
        }
    }

    fn player<'a>(rosters: &'a [Roster], roster_id: RosterId, player_id: &str) -> &'a RosterPlayer {
        rosters
            .iter()
            .find(|r| r.roster_id == roster_id)
            .and_then(|r| r.players.iter().find(|p| p.player_id == player_id))
            .expect("player present")
    }

    #[test]
    fn test_years_kept_and_cost_from_prior_season() {
        let current = vec![team(1, "Alice", vec![drafted("p", 100), drafted("q", 40)])];
        let prior = vec![SavedKeeper { years_kept: Some(0), ..row(1, "p") }];
        let rosters = reconcile_season(&current, &[], &prior, &LeagueRules::default());

        let p = player(&rosters, 1, "p");
        assert_eq!(p.years_kept, 1);
        assert_eq!(p.cost_to_keep, Some(110));
        let q = player(&rosters, 1, "q");
        assert_eq!(q.years_kept, 0);
        assert_eq!(q.cost_to_keep, Some(45));
        assert_eq!(rosters[0].players[0].player_id, "p");
    }

    #[test]
    fn test_saved_keep_is_restored() {
        let current = vec![team(1, "Alice", vec![drafted("p", 100)])];
        let rosters = reconcile_season(&current, &[row(1, "p")], &[], &LeagueRules::default());
        assert!(player(&rosters, 1, "p").keep);
    }

    #[test]
    fn test_saved_trade_restores_both_sides() {
        let current = vec![team(1, "Alice", vec![drafted("p", 100)]), team(2, "Bob", vec![])];
        let mirror_row = SavedKeeper {
            trade_from_roster_id: Some(1),
            trade_amount: Some(20),
            trade_note: Some("swap".into()),
            ..row(2, "p")
        };
        let rules = LeagueRules::default();
        let rosters = reconcile_season(&current, &[mirror_row], &[], &rules);

        let canonical = player(&rosters, 1, "p");
        assert!(canonical.trade && !canonical.keep && !canonical.locked);
        assert_eq!(canonical.trade_roster_id, Some(2));
        assert_eq!(canonical.trade_amount, Some(20));

        let mirror = player(&rosters, 2, "p");
        assert!(mirror.trade && mirror.keep && mirror.locked);
        assert_eq!(mirror.trade_roster_id, Some(1));
        assert_eq!(mirror.cost_to_keep, Some(105));

        assert!(check_trade_links(&rosters, &rules).is_empty());
    }

    #[test]
    fn test_canonical_restored_when_player_left_owner_roster() {
        // Player now sits on the acquirer's current roster only
        let current = vec![team(1, "Alice", vec![]), team(2, "Bob", vec![drafted("p", 100)])];
        let mirror_row = SavedKeeper { trade_from_roster_id: Some(1), trade_amount: Some(5), ..row(2, "p") };
        let rules = LeagueRules::default();
        let rosters = reconcile_season(&current, &[mirror_row], &[], &rules);

        assert!(player(&rosters, 1, "p").is_canonical_trade());
        assert!(player(&rosters, 2, "p").locked);
        assert!(check_trade_links(&rosters, &rules).is_empty());
    }

    #[test]
    fn test_restored_canonical_takes_years_from_prior_season() {
        let current = vec![team(1, "Alice", vec![]), team(2, "Bob", vec![drafted("p", 100)])];
        let mirror_row = SavedKeeper { trade_from_roster_id: Some(1), trade_amount: Some(5), ..row(2, "p") };
        let prior = vec![SavedKeeper { years_kept: Some(1), ..row(1, "p") }];
        let rules = LeagueRules::default();
        let rosters = reconcile_season(&current, &[mirror_row], &prior, &rules);

        let owner = player(&rosters, 1, "p");
        let acquirer = player(&rosters, 2, "p");
        assert_eq!(owner.years_kept, 2);
        assert_eq!(owner.years_kept, acquirer.years_kept);
        assert_eq!(owner.cost_to_keep, acquirer.cost_to_keep);
        assert!(!owner.trade && !owner.keep);
        assert!(!acquirer.trade && !acquirer.keep);
        assert!(check_trade_links(&rosters, &rules).is_empty());
    }

    #[test]
    fn test_prior_years_saturate() {
        let current = vec![team(1, "Alice", vec![drafted("p", 100)])];
        let prior = vec![SavedKeeper { years_kept: Some(u32::MAX), ..row(1, "p") }];
        let rosters = reconcile_season(&current, &[], &prior, &LeagueRules::default());

        let p = player(&rosters, 1, "p");
        assert_eq!(p.years_kept, u32::MAX);
        assert_eq!(p.cost_to_keep, None);
    }

    #[test]
    fn test_ineligible_selections_are_cleared() {
        let current = vec![team(1, "Alice", vec![drafted("p", 100)]), team(2, "Bob", vec![])];
        let prior = vec![SavedKeeper { years_kept: Some(1), ..row(1, "p") }];
        let saved = vec![row(1, "p")];
        let rosters = reconcile_season(&current, &saved, &prior, &LeagueRules::default());

        let p = player(&rosters, 1, "p");
        assert_eq!(p.years_kept, 2);
        assert_eq!(p.cost_to_keep, None);
        assert!(!p.keep);
    }

    #[test]
    fn test_saved_player_missing_from_roster_is_appended() {
        let current = vec![team(1, "Alice", vec![drafted("q", 10)])];
        let saved = vec![SavedKeeper { previous_cost: Some(60), ..row(1, "gone") }];
        let rosters = reconcile_season(&current, &saved, &[], &LeagueRules::default());

        let ids: Vec<_> = rosters[0].players.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["gone", "q"]);
        assert!(player(&rosters, 1, "gone").keep);
        assert_eq!(player(&rosters, 1, "gone").cost_to_keep, Some(65));
    }
}
