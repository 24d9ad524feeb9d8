//! Ranking engine: a deterministic total order over members.
//!
//! Pure and backend-agnostic; operates on already-fetched records. Three
//! comparator keys in strict priority: council office precedence, stateship
//! start year (oldest cohort first), then prior MOWCUB rank as the final
//! tie-break. The sort is stable, so members tying on all three keys keep
//! their relative input order, and re-ranking ranked output is a no-op.

use crate::domain::member::Member;

/// Composite comparator key for one member.
///
/// Lower tuples sort first. Unknown or unparsable values were already pushed
/// to the end of their respective hierarchies (`CouncilOffice::None` and
/// malformed stateship years both key as the maximum).
fn rank_key(member: &Member) -> (u16, u16, u16) {
    (
        member.current_council_office.precedence(),
        member.stateship_year.sort_key(),
        member.last_mowcub_position.precedence(),
    )
}

/// Order members by office, then seniority, then prior rank.
///
/// # Examples
/// ```no_run
/// use statesmen_backend::domain::ranking::rank;
///
/// let members = Vec::new();
/// let ordered = rank(members);
/// assert!(ordered.is_empty());
/// ```
pub fn rank(mut members: Vec<Member>) -> Vec<Member> {
    // Vec::sort_by_key is stable; ties preserve input order by construction.
    members.sort_by_key(rank_key);
    members
}
