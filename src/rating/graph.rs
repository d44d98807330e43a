use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::types::{AthleteId, Comparison, EquipmentId};
use crate::errors::RatingError;

/// One decisive contest between two distinct athletes, by handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contest {
    pub winner: usize,
    pub loser: usize,
    pub winner_equipment: Option<usize>,
    pub loser_equipment: Option<usize>,
}

impl Contest {
    pub fn has_paired_equipment(&self) -> bool {
        self.winner_equipment.is_some() && self.loser_equipment.is_some()
    }
}

/// Aggregated head-to-head tally for an unordered athlete pair (`first < second`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRecord {
    pub first: usize,
    pub second: usize,
    pub first_wins: u32,
    pub second_wins: u32,
}

impl PairRecord {
    pub fn total(&self) -> u32 {
        self.first_wins + self.second_wins
    }
}

/// Arena-style index of a comparison batch: athletes and equipment are
/// addressed by `usize` handles into parallel vectors.
#[derive(Debug, Clone)]
pub struct ComparisonGraph {
    athletes: Vec<AthleteId>,
    athlete_index: HashMap<AthleteId, usize>,
    equipment: Vec<EquipmentId>,
    equipment_index: HashMap<EquipmentId, usize>,
    equipment_counts: Vec<u32>,
    contests: Vec<Contest>,
    pairs: BTreeMap<(usize, usize), PairRecord>,
    athlete_contests: Vec<u32>,
    athlete_wins: Vec<u32>,
    self_comparisons: usize,
}

impl ComparisonGraph {
    pub fn build(comparisons: &[Comparison]) -> Result<Self, RatingError> {
        if comparisons.is_empty() {
            return Err(RatingError::EmptyInput);
        }

        let mut graph = Self::empty();
        for comparison in comparisons {
            graph.add(comparison);
        }

        debug!(
            "Indexed {} athletes, {} equipment units, {} contests ({} self-comparisons skipped)",
            graph.athletes.len(),
            graph.equipment.len(),
            graph.contests.len(),
            graph.self_comparisons
        );

        Ok(graph)
    }

    fn empty() -> Self {
        Self {
            athletes: Vec::new(),
            athlete_index: HashMap::new(),
            equipment: Vec::new(),
            equipment_index: HashMap::new(),
            equipment_counts: Vec::new(),
            contests: Vec::new(),
            pairs: BTreeMap::new(),
            athlete_contests: Vec::new(),
            athlete_wins: Vec::new(),
            self_comparisons: 0,
        }
    }

    fn add(&mut self, comparison: &Comparison) {
        let first = self.register_athlete(&comparison.athlete1);
        let second = self.register_athlete(&comparison.athlete2);

        if comparison.is_self_comparison() {
            self.self_comparisons += 1;
            return;
        }

        let first_equipment = comparison
            .equipment1
            .as_deref()
            .map(|id| self.register_equipment(id));
        let second_equipment = comparison
            .equipment2
            .as_deref()
            .map(|id| self.register_equipment(id));
        self.count_equipment(first_equipment, second_equipment);

        let contest = if comparison.athlete1_won {
            Contest {
                winner: first,
                loser: second,
                winner_equipment: first_equipment,
                loser_equipment: second_equipment,
            }
        } else {
            Contest {
                winner: second,
                loser: first,
                winner_equipment: second_equipment,
                loser_equipment: first_equipment,
            }
        };

        self.record_contest(contest);
    }

    fn register_athlete(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.athlete_index.get(id) {
            return idx;
        }

        let idx = self.athletes.len();
        self.athletes.push(id.to_string());
        self.athlete_index.insert(id.to_string(), idx);
        self.athlete_contests.push(0);
        self.athlete_wins.push(0);
        idx
    }

    fn register_equipment(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.equipment_index.get(id) {
            return idx;
        }

        let idx = self.equipment.len();
        self.equipment.push(id.to_string());
        self.equipment_index.insert(id.to_string(), idx);
        self.equipment_counts.push(0);
        idx
    }

    /// One count per distinct unit per comparison, even when both sides share it
    fn count_equipment(&mut self, first: Option<usize>, second: Option<usize>) {
        if let Some(idx) = first {
            self.equipment_counts[idx] += 1;
        }
        if let Some(idx) = second.filter(|&idx| Some(idx) != first) {
            self.equipment_counts[idx] += 1;
        }
    }

    fn record_contest(&mut self, contest: Contest) {
        self.athlete_contests[contest.winner] += 1;
        self.athlete_contests[contest.loser] += 1;
        self.athlete_wins[contest.winner] += 1;

        let key = (contest.winner.min(contest.loser), contest.winner.max(contest.loser));
        let record = self.pairs.entry(key).or_insert(PairRecord {
            first: key.0,
            second: key.1,
            first_wins: 0,
            second_wins: 0,
        });

        if contest.winner == key.0 {
            record.first_wins += 1;
        } else {
            record.second_wins += 1;
        }

        self.contests.push(contest);
    }

    pub fn athletes(&self) -> &[AthleteId] {
        &self.athletes
    }

    pub fn athlete_count(&self) -> usize {
        self.athletes.len()
    }

    pub fn equipment(&self) -> &[EquipmentId] {
        &self.equipment
    }

    pub fn equipment_count(&self) -> usize {
        self.equipment.len()
    }

    pub fn equipment_comparisons(&self, handle: usize) -> u32 {
        self.equipment_counts[handle]
    }

    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    pub fn pair_records(&self) -> impl Iterator<Item = &PairRecord> {
        self.pairs.values()
    }

    pub fn contests_for(&self, athlete: usize) -> u32 {
        self.athlete_contests[athlete]
    }

    pub fn wins_for(&self, athlete: usize) -> u32 {
        self.athlete_wins[athlete]
    }

    pub fn losses_for(&self, athlete: usize) -> u32 {
        self.athlete_contests[athlete] - self.athlete_wins[athlete]
    }

    pub fn self_comparisons(&self) -> usize {
        self.self_comparisons
    }

    /// True when at least one contest names equipment on both sides
    pub fn has_paired_equipment(&self) -> bool {
        self.contests.iter().any(Contest::has_paired_equipment)
    }

    /// Number of connected components over athletes linked by contests
    pub fn component_count(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.athletes.len()).collect();

        for pair in self.pair_records() {
            let a = find_root(&mut parent, pair.first);
            let b = find_root(&mut parent, pair.second);
            if a != b {
                parent[a] = b;
            }
        }

        (0..parent.len())
            .filter(|&idx| find_root(&mut parent, idx) == idx)
            .count()
    }
}

fn find_root(parent: &mut [usize], mut idx: usize) -> usize {
    while parent[idx] != idx {
        parent[idx] = parent[parent[idx]];
        idx = parent[idx];
    }
    idx
}
