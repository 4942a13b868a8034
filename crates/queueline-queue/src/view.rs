//! A store's queue as one customer sees it.

use queueline_protocol::{StoreFeature, Turn, UserId};

use crate::{people_ahead_label, queue_position};

/// Read-only view over the queue embedded in a store detail.
#[derive(Debug, Clone, Copy)]
pub struct StoreQueue<'a> {
    store: &'a StoreFeature,
}

impl<'a> StoreQueue<'a> {
    pub fn new(store: &'a StoreFeature) -> Self {
        Self { store }
    }

    /// Number of people currently waiting.
    pub fn len(&self) -> usize {
        self.store.turns().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.turns().is_empty()
    }

    /// The turn `user` holds in this queue, if any.
    pub fn turn_of(&self, user: &UserId) -> Option<&'a Turn> {
        self.store
            .turns()
            .iter()
            .find(|turn| turn.user.as_ref().and_then(|m| m.user_id()) == Some(user))
    }

    /// Whether `user` already holds a turn here (the join button is hidden
    /// when it does).
    pub fn contains(&self, user: &UserId) -> bool {
        self.turn_of(user).is_some()
    }

    /// How many people are ahead of `user`, or `None` if they aren't queued.
    pub fn position_of(&self, user: &UserId) -> Option<usize> {
        let turn = self.turn_of(user)?;
        queue_position(self.store.turns().iter().map(|t| &t.id), &turn.id)
    }

    /// Label for `user`'s place, or `None` if they aren't queued.
    pub fn label_for(&self, user: &UserId) -> Option<String> {
        self.position_of(user).map(people_ahead_label)
    }
}

#[cfg(test)]
mod tests {
    use queueline_protocol::{AuthUser, StoreProperties, TurnMember};

    use super::*;

    fn turn(id: &str, user: &str) -> Turn {
        Turn {
            user: Some(TurnMember {
                full_name: None,
                user: Some(AuthUser {
                    id: UserId::from(user),
                    username: Some(format!("user{user}")),
                }),
            }),
            ..Turn::with_id(id)
        }
    }

    fn store(turns: Vec<Turn>) -> StoreFeature {
        StoreFeature {
            geometry: None,
            properties: StoreProperties {
                name: "Bakery".into(),
                turns: Some(turns),
                ..StoreProperties::default()
            },
        }
    }

    #[test]
    fn test_view_over_empty_queue() {
        let store = store(vec![]);
        let queue = StoreQueue::new(&store);

        assert!(queue.is_empty());
        assert!(!queue.contains(&UserId::from("1")));
        assert_eq!(queue.position_of(&UserId::from("1")), None);
    }

    #[test]
    fn test_view_finds_user_position() {
        let store = store(vec![turn("t1", "5"), turn("t2", "9"), turn("t3", "2")]);
        let queue = StoreQueue::new(&store);

        assert_eq!(queue.len(), 3);
        assert!(queue.contains(&UserId::from("9")));
        assert_eq!(queue.position_of(&UserId::from("9")), Some(1));
        assert_eq!(queue.label_for(&UserId::from("5")).as_deref(), Some("It's your turn"));
        assert_eq!(
            queue.label_for(&UserId::from("2")).as_deref(),
            Some("2 People ahead of you")
        );
    }

    #[test]
    fn test_view_ignores_turns_without_member() {
        let store = store(vec![Turn::with_id("t1")]);
        let queue = StoreQueue::new(&store);

        assert_eq!(queue.len(), 1);
        assert!(!queue.contains(&UserId::from("1")));
    }
}
