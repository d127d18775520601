use std::collections::BTreeMap;

use crate::derived::Derived;
use crate::types::{LapRecord, StintRecord};

/// Compound reported for a stint whose laps carry no compound.
pub const UNKNOWN_COMPOUND: &str = "UNKNOWN";

/// Summarise the tyre stints of `drivers` from a session's lap list.
///
/// Drivers are reported in the order given, stints in ascending stint
/// number. Laps without a stint or lap number and laps of other drivers
/// are ignored. Missing data never fails: an empty lap list, or a lap list
/// where no lap has a stint number, degrades to an empty result.
pub fn aggregate_stints<S: AsRef<str>>(
    laps: &[LapRecord],
    drivers: &[S],
) -> Derived<Vec<StintRecord>> {
    if laps.is_empty() {
        return Derived::degraded(Vec::new(), "lap list is empty");
    }
    if laps.iter().all(|lap| lap.stint.is_none()) {
        return Derived::degraded(Vec::new(), "laps carry no stint numbers");
    }

    let mut out = Vec::new();
    let mut seen: Vec<&str> = Vec::with_capacity(drivers.len());
    for driver in drivers {
        let driver = driver.as_ref();
        if seen.contains(&driver) {
            continue;
        }
        seen.push(driver);

        let mut by_stint: BTreeMap<u32, Vec<&LapRecord>> = BTreeMap::new();
        for lap in laps.iter().filter(|lap| lap.driver == driver) {
            if let (Some(stint), Some(_)) = (lap.stint, lap.lap_number) {
                by_stint.entry(stint).or_default().push(lap);
            }
        }

        for (stint, group) in by_stint {
            if let Some(record) = summarise(driver, stint, &group) {
                out.push(record);
            }
        }
    }

    Derived::Computed(out)
}

fn summarise(driver: &str, stint: u32, group: &[&LapRecord]) -> Option<StintRecord> {
    let start_lap = group.iter().filter_map(|lap| lap.lap_number).min()?;
    let end_lap = group.iter().filter_map(|lap| lap.lap_number).max()?;

    Some(StintRecord {
        driver: driver.to_string(),
        stint,
        compound: dominant_compound(group),
        start_lap,
        end_lap,
        tyre_life: group.len() as u32,
    })
}

/// Most frequent compound of the group. Ties go to the first value in
/// sorted order.
fn dominant_compound(group: &[&LapRecord]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for compound in group.iter().filter_map(|lap| lap.compound.as_deref()) {
        *counts.entry(compound).or_default() += 1;
    }

    let Some(top) = counts.values().copied().max() else {
        return UNKNOWN_COMPOUND.to_string();
    };
    counts
        .into_iter()
        .find(|(_, n)| *n == top)
        .map(|(compound, _)| compound.to_string())
        .unwrap_or_else(|| UNKNOWN_COMPOUND.to_string())
}
