//! The chat room mediator.

use tracing::info;

use crate::{MediatorError, MediatorResult};

/// A message delivered to a member's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Name of the sending member.
    pub from: String,
    /// Message text.
    pub body: String,
}

#[derive(Debug)]
struct Member {
    name: String,
    inbox: Vec<Message>,
}

/// Routes messages between members.
///
/// Members are kept in join order, which is also the delivery order.
#[derive(Debug, Default)]
pub struct ChatRoom {
    members: Vec<Member>,
}

impl ChatRoom {
    /// Creates an empty room.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::DuplicateUser`] if the name is taken.
    pub fn add_user(&mut self, name: impl Into<String>) -> MediatorResult<()> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(MediatorError::DuplicateUser(name));
        }

        info!(user = %name, "user joined");
        self.members.push(Member {
            name,
            inbox: Vec::new(),
        });
        Ok(())
    }

    /// Removes a member and discards its inbox.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::UnknownUser`] if no such member exists.
    pub fn remove_user(&mut self, name: &str) -> MediatorResult<()> {
        let index = self
            .position(name)
            .ok_or_else(|| MediatorError::UnknownUser(name.to_string()))?;

        self.members.remove(index);
        info!(user = %name, "user left");
        Ok(())
    }

    /// Sends `body` from `sender` to every other member, in join order.
    ///
    /// Returns the number of members the message was delivered to.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::UnknownUser`] if `sender` is not a member.
    pub fn send(&mut self, sender: &str, body: &str) -> MediatorResult<usize> {
        if self.position(sender).is_none() {
            return Err(MediatorError::UnknownUser(sender.to_string()));
        }

        info!(user = %sender, body, "message sent");

        let mut delivered = 0;
        for member in self.members.iter_mut().filter(|m| m.name != sender) {
            info!(user = %member.name, from = %sender, body, "message received");
            member.inbox.push(Message {
                from: sender.to_string(),
                body: body.to_string(),
            });
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Messages received by `name`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::UnknownUser`] if no such member exists.
    pub fn inbox(&self, name: &str) -> MediatorResult<&[Message]> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.inbox.as_slice())
            .ok_or_else(|| MediatorError::UnknownUser(name.to_string()))
    }

    /// Member names in join order.
    #[must_use]
    pub fn members(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the room has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with(names: &[&str]) -> ChatRoom {
        let mut room = ChatRoom::new();
        for name in names {
            room.add_user(*name).unwrap();
        }
        room
    }

    #[test]
    fn test_members_in_join_order() {
        let room = room_with(&["Kim", "Lee", "Park"]);
        assert_eq!(room.members(), vec!["Kim", "Lee", "Park"]);
        assert_eq!(room.len(), 3);
        assert!(!room.is_empty());
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let mut room = room_with(&["Kim"]);
        assert_eq!(
            room.add_user("Kim"),
            Err(MediatorError::DuplicateUser("Kim".to_string()))
        );
        assert_eq!(room.len(), 1);
    }

    #[test]
    fn test_send_skips_sender() {
        let mut room = room_with(&["Kim", "Lee", "Park"]);

        assert_eq!(room.send("Kim", "I am Kim").unwrap(), 2);
        assert_eq!(room.send("Lee", "I am Lee").unwrap(), 2);

        assert_eq!(
            room.inbox("Kim").unwrap(),
            &[Message {
                from: "Lee".to_string(),
                body: "I am Lee".to_string(),
            }]
        );

        let park: Vec<&str> = room
            .inbox("Park")
            .unwrap()
            .iter()
            .map(|m| m.from.as_str())
            .collect();
        assert_eq!(park, vec!["Kim", "Lee"]);
    }

    #[test]
    fn test_send_from_unknown_user() {
        let mut room = room_with(&["Kim"]);
        assert_eq!(
            room.send("Ghost", "boo"),
            Err(MediatorError::UnknownUser("Ghost".to_string()))
        );
        assert!(room.inbox("Kim").unwrap().is_empty());
    }

    #[test]
    fn test_send_to_self_only_room() {
        let mut room = room_with(&["Kim"]);
        assert_eq!(room.send("Kim", "anyone?").unwrap(), 0);
    }

    #[test]
    fn test_remove_user_takes_effect() {
        let mut room = room_with(&["Kim", "Lee", "Park"]);
        room.remove_user("Lee").unwrap();

        assert_eq!(room.members(), vec!["Kim", "Park"]);
        assert_eq!(room.send("Kim", "still here?").unwrap(), 1);
        assert!(room.inbox("Lee").is_err());
    }

    #[test]
    fn test_remove_unknown_user() {
        let mut room = ChatRoom::new();
        assert!(room.is_empty());
        assert_eq!(
            room.remove_user("Kim"),
            Err(MediatorError::UnknownUser("Kim".to_string()))
        );
    }

    #[test]
    fn test_rejoin_starts_with_empty_inbox() {
        let mut room = room_with(&["Kim", "Lee"]);
        room.send("Kim", "first").unwrap();
        room.remove_user("Lee").unwrap();
        room.add_user("Lee").unwrap();

        assert!(room.inbox("Lee").unwrap().is_empty());
        assert_eq!(room.members(), vec!["Kim", "Lee"]);
    }
}
