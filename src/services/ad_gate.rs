//! Ad-gate unlock state machine
//!
//! Per (session, movie) pair the state goes LOCKED -> UNLOCKED exactly
//! once. The counter is session-wide: any completed ad counts toward
//! unlocking whichever movie is currently being viewed. All state lives on
//! the session row; these functions are pure and the caller writes the
//! result through to the store.

/// Completed ad views required before a title unlocks
pub const REQUIRED_ADS: i32 = 2;

/// Access decision for a (session, movie) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdAccess {
    pub can_watch: bool,
    pub ads_watched: i32,
    pub ads_needed: i32,
    pub is_unlocked: bool,
}

/// Pure access check. Never fails: unknown movies are rejected by the
/// caller before this point, and a fresh session simply has zero ads
/// watched and nothing unlocked.
pub fn check_access(ads_watched: i32, unlocked: &[i32], movie_id: i32) -> AdAccess {
    let is_unlocked = unlocked.contains(&movie_id);
    AdAccess {
        can_watch: is_unlocked || ads_watched >= REQUIRED_ADS,
        ads_watched,
        ads_needed: (REQUIRED_ADS - ads_watched).max(0),
        is_unlocked,
    }
}

/// Result of applying one completed ad view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub ads_watched: i32,
    pub unlocked: Vec<i32>,
    pub movie_unlocked: bool,
}

/// Apply a client-reported ad completion to the session's gate state.
///
/// Not idempotent: two calls for the same physical ad view double-count.
/// Completion is client-reported; nothing here verifies an ad actually
/// played.
pub fn record_completion(
    ads_watched: i32,
    unlocked: &[i32],
    movie_id: Option<i32>,
) -> CompletionOutcome {
    let ads_watched = ads_watched + 1;
    let mut unlocked = unlocked.to_vec();

    if let Some(id) = movie_id {
        if ads_watched >= REQUIRED_ADS && !unlocked.contains(&id) {
            unlocked.push(id);
        }
    }

    let movie_unlocked = movie_id.map(|id| unlocked.contains(&id)).unwrap_or(false);

    CompletionOutcome {
        ads_watched,
        unlocked,
        movie_unlocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_locked() {
        let access = check_access(0, &[], 7);
        assert!(!access.can_watch);
        assert_eq!(access.ads_watched, 0);
        assert_eq!(access.ads_needed, 2);
        assert!(!access.is_unlocked);
    }

    #[test]
    fn ads_needed_never_goes_negative() {
        for watched in 0..6 {
            let access = check_access(watched, &[], 1);
            assert_eq!(access.ads_needed, (2 - watched).max(0));
            assert!(access.ads_needed >= 0);
        }
    }

    #[test]
    fn threshold_crossing_unlocks_the_movie_passed() {
        let first = record_completion(0, &[], Some(42));
        assert_eq!(first.ads_watched, 1);
        assert!(!first.movie_unlocked);
        assert!(first.unlocked.is_empty());

        let second = record_completion(first.ads_watched, &first.unlocked, Some(42));
        assert_eq!(second.ads_watched, 2);
        assert!(second.movie_unlocked);
        assert_eq!(second.unlocked, vec![42]);
    }

    #[test]
    fn unlock_is_one_way_and_duplicate_free() {
        let outcome = record_completion(2, &[42], Some(42));
        assert_eq!(outcome.unlocked, vec![42]);
        assert!(outcome.movie_unlocked);

        // A later completion for another title keeps earlier unlocks
        let outcome = record_completion(outcome.ads_watched, &outcome.unlocked, Some(7));
        assert_eq!(outcome.unlocked, vec![42, 7]);
    }

    #[test]
    fn counter_is_session_wide_not_per_movie() {
        // Two ads on movie A, then movie B unlocks on its first check
        let a1 = record_completion(0, &[], Some(1));
        let a2 = record_completion(a1.ads_watched, &a1.unlocked, Some(1));
        assert!(a2.movie_unlocked);

        let access = check_access(a2.ads_watched, &a2.unlocked, 2);
        assert!(access.can_watch);
        assert!(!access.is_unlocked);
    }

    #[test]
    fn completion_without_movie_only_counts() {
        let outcome = record_completion(1, &[], None);
        assert_eq!(outcome.ads_watched, 2);
        assert!(outcome.unlocked.is_empty());
        assert!(!outcome.movie_unlocked);
    }

    #[test]
    fn unlocked_movie_watchable_below_threshold() {
        let access = check_access(0, &[9], 9);
        assert!(access.can_watch);
        assert!(access.is_unlocked);
        assert_eq!(access.ads_needed, 2);
    }
}
