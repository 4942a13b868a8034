//! Queue position.

use queueline_protocol::{Turn, TurnId};

/// Zero-based index of `target` in `turn_ids`, in the order given.
///
/// The order is whatever the server returned; nothing is sorted here.
/// Returns `None` if `target` isn't in the list.
///
/// ```rust
/// use queueline_protocol::TurnId;
/// use queueline_queue::queue_position;
///
/// let queue: Vec<TurnId> = ["t9", "t2", "t5"].into_iter().map(TurnId::from).collect();
/// assert_eq!(queue_position(&queue, &TurnId::from("t2")), Some(1));
/// assert_eq!(queue_position(&queue, &TurnId::from("t7")), None);
/// ```
pub fn queue_position<'a, I>(turn_ids: I, target: &TurnId) -> Option<usize>
where
    I: IntoIterator<Item = &'a TurnId>,
{
    turn_ids.into_iter().position(|id| id == target)
}

/// Position of `turn` in its own store's queue, as embedded by the
/// turns-for-user query (`turn.store.properties.turns`).
pub fn position_in_store(turn: &Turn) -> Option<usize> {
    let store = turn.store.as_ref()?;
    queue_position(store.turns().iter().map(|t| &t.id), &turn.id)
}

/// Text shown under a customer's turn.
pub fn people_ahead_label(people_ahead: usize) -> String {
    match people_ahead {
        0 => "It's your turn".to_string(),
        1 => "1 Person ahead of you".to_string(),
        n => format!("{n} People ahead of you"),
    }
}
