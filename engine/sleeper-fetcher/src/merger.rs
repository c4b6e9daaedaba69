use crate::models::{
    MergedRecord, PlayerRecord, ProjectedValue, StatBlock, StatCode, StatLine, WeekEntry,
};

/// Combine roster attributes with one week of stats and projections.
///
/// Missing actuals become 0 (the stat did not occur); missing projections
/// become `N/A` (nothing was published). Team, opponent and date come from the
/// stats side only.
pub fn merge(
    player_id: &str,
    player: &PlayerRecord,
    entry: &WeekEntry,
    week: u32,
) -> MergedRecord {
    let empty = StatLine::default();
    let actuals = stat_line(&entry.stats, &empty);
    let projections = stat_line(&entry.projections, &empty);

    let mut actual = [0.0; StatCode::COUNT];
    let mut projected = [ProjectedValue::NotAvailable; StatCode::COUNT];
    for (slot, code) in StatCode::ALL.into_iter().enumerate() {
        actual[slot] = actuals.get(code).unwrap_or(0.0);
        projected[slot] = projections.get(code).into();
    }

    let context = entry.stats.as_ref();

    MergedRecord {
        player_id: player_id.to_string(),
        player_name: player.full_name.clone(),
        age: player.age,
        position: player.position.clone(),
        depth_chart_order: player.depth_chart_order,
        week,
        team: context.and_then(|block| block.team.clone()),
        opponent: context.and_then(|block| block.opponent.clone()),
        date: context.and_then(|block| block.date.clone()),
        actual,
        projected,
    }
}

fn stat_line<'a>(side: &'a Option<StatBlock>, empty: &'a StatLine) -> &'a StatLine {
    side.as_ref().map_or(empty, |block| &block.stats)
}
