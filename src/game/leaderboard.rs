//! Leaderboard
//!
//! Competition ranking of per-player find counts. Pure; used by the round
//! machine when a round ends.

use serde::{Serialize, Deserialize};

use crate::game::state::PlayerId;

/// One ranked leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based rank. Tied counts share the rank of the first row in the tie.
    pub rank: u32,
    /// Player.
    pub player_id: PlayerId,
    /// Objects found.
    pub count: u32,
    /// Found the bonus object this round.
    pub bonus_finder: bool,
}

/// Rank players by count, highest first.
///
/// Uses standard competition ranking: counts 5, 5, 3 rank 1, 1, 3.
/// The sort is stable, so tied players keep their input order.
pub fn rank<I>(scores: I, bonus_finder: Option<PlayerId>) -> Vec<Standing>
where
    I: IntoIterator<Item = (PlayerId, u32)>,
{
    let mut entries: Vec<(PlayerId, u32)> = scores.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut standings = Vec::with_capacity(entries.len());
    let mut last: Option<(u32, u32)> = None; // (count, rank)

    for (i, (player_id, count)) in entries.into_iter().enumerate() {
        let rank = match last {
            Some((last_count, last_rank)) if last_count == count => last_rank,
            _ => i as u32 + 1,
        };
        last = Some((count, rank));

        standings.push(Standing {
            rank,
            player_id,
            count,
            bonus_finder: bonus_finder == Some(player_id),
        });
    }

    standings
}
