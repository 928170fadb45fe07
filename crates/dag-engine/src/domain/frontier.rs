use std::collections::HashMap;

use core_types::{Hash, NULL_HASH};

use super::level_index::NonFinalSet;

/// The pivot candidate plus the current tip set a proposer builds its next
/// block on top of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frontier {
    pub pivot: Hash,
    pub tips: Vec<Hash>,
}

/// Ghost-path pivot selection: starting from `anchor`, repeatedly descend to
/// the child with the largest subtree (heaviest-past rule), then move back
/// `ghost_path_move_back` steps toward the anchor to absorb blocks that
/// arrived late relative to the heaviest tip (reduces orphan rate under
/// network delay). Tips are every current leaf not already on the chosen
/// pivot path.
pub fn select_frontier(set: &NonFinalSet, anchor: Hash, ghost_path_move_back: u32) -> Frontier {
    if set.is_empty() {
        return Frontier { pivot: anchor, tips: vec![] };
    }

    let children = build_children_index(set);
    let weights = subtree_weights(set, &children);

    let mut path = vec![anchor];
    let mut current = anchor;
    loop {
        let Some(kids) = children.get(&current) else { break };
        if kids.is_empty() {
            break;
        }
        let heaviest = *kids
            .iter()
            .max_by(|a, b| {
                weights
                    .get(*a)
                    .unwrap_or(&0)
                    .cmp(weights.get(*b).unwrap_or(&0))
                    .then_with(|| a.cmp(b))
            })
            .expect("non-empty children");
        path.push(heaviest);
        current = heaviest;
    }

    let move_back = (ghost_path_move_back as usize).min(path.len().saturating_sub(1));
    let pivot_index = path.len() - 1 - move_back;
    let pivot = path[pivot_index];

    let on_truncated_path: std::collections::HashSet<Hash> =
        path[..=pivot_index].iter().copied().collect();
    let tips = set.leaves().into_iter().filter(|h| !on_truncated_path.contains(h)).collect();

    Frontier { pivot, tips }
}

fn build_children_index(set: &NonFinalSet) -> HashMap<Hash, Vec<Hash>> {
    let mut children: HashMap<Hash, Vec<Hash>> = HashMap::new();
    for record in set.iter() {
        let hash = record.hash();
        children.entry(record.block.pivot).or_default().push(hash);
        for tip in &record.block.tips {
            children.entry(*tip).or_default().push(hash);
        }
    }
    children
}

/// Bottom-up subtree size (number of in-set descendants, inclusive),
/// computed by processing blocks in descending-level order so every child's
/// weight is already known when its parent is processed.
fn subtree_weights(set: &NonFinalSet, children: &HashMap<Hash, Vec<Hash>>) -> HashMap<Hash, u64> {
    let mut weights: HashMap<Hash, u64> = HashMap::new();
    let mut by_level: Vec<&core_types::DagBlock> = set.iter().map(|r| &r.block).collect();
    by_level.sort_by(|a, b| b.level.cmp(&a.level));
    for block in by_level {
        let hash = block.hash();
        let own_children_weight: u64 = children
            .get(&hash)
            .into_iter()
            .flatten()
            .map(|c| *weights.get(c).unwrap_or(&1))
            .sum();
        weights.insert(hash, 1 + own_children_weight);
    }
    weights
}
