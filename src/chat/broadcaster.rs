use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

use crate::chat::protocol::ServerMessage;

/// A handle to send messages to one connected WebSocket.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub conn_id: Uuid,
    pub user_id: Uuid,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

/// Live connections grouped by chat room.
///
/// Join, leave and broadcast all go through the `rooms` lock, so a broadcast
/// sees a consistent member list and never reaches a handle that has left.
/// Writers that persist-then-broadcast take the room's append lock first so
/// delivery order matches storage order.
#[derive(Default)]
pub struct ChatBroadcaster {
    /// room_id -> connected client handles
    rooms: RwLock<HashMap<Uuid, Vec<ClientHandle>>>,
    append_locks: Arc<AppendLocks>,
}

type AppendLocks = StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>;

/// Held while a writer persists and broadcasts to one room. Dropping it
/// releases the room and forgets the lock once nobody else holds or awaits it.
pub struct RoomGuard {
    room_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<AppendLocks>,
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.room_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.room_id);
        }
    }
}

impl ChatBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Returns its id and the receiver the session
    /// should drain.
    pub async fn join(
        &self,
        room_id: Uuid,
        user_id: Uuid,
    ) -> (Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id).or_default();

        // Announce only the user's first connection.
        if !room.iter().any(|c| c.user_id == user_id) {
            let presence = ServerMessage::Presence {
                user_id,
                online: true,
            };
            for client in room.iter() {
                let _ = client.sender.send(presence.clone());
            }
        }

        room.push(ClientHandle {
            conn_id,
            user_id,
            sender: tx,
        });
        debug!(%room_id, %user_id, %conn_id, members = room.len(), "joined room");

        (conn_id, rx)
    }

    /// Remove one connection.
    pub async fn leave(&self, room_id: Uuid, conn_id: Uuid) {
        let mut rooms = self.rooms.write().await;

        let Some(room) = rooms.get_mut(&room_id) else {
            return;
        };
        let Some(pos) = room.iter().position(|c| c.conn_id == conn_id) else {
            return;
        };
        let handle = room.remove(pos);
        debug!(%room_id, user_id = %handle.user_id, %conn_id, "left room");

        if !room.iter().any(|c| c.user_id == handle.user_id) {
            let presence = ServerMessage::Presence {
                user_id: handle.user_id,
                online: false,
            };
            for client in room.iter() {
                let _ = client.sender.send(presence.clone());
            }
        }

        if room.is_empty() {
            rooms.remove(&room_id);
        }
    }

    /// Send to every connection in the room, optionally skipping one user.
    /// Returns how many connections the message was handed to.
    pub async fn broadcast(
        &self,
        room_id: Uuid,
        message: ServerMessage,
        exclude_user: Option<Uuid>,
    ) -> usize {
        let rooms = self.rooms.read().await;
        let Some(room) = rooms.get(&room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for client in room {
            if Some(client.user_id) == exclude_user {
                continue;
            }
            // A closed receiver means the session is tearing down; leave() removes it.
            if client.sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub async fn is_user_online(&self, room_id: Uuid, user_id: Uuid) -> bool {
        let rooms = self.rooms.read().await;
        rooms
            .get(&room_id)
            .is_some_and(|room| room.iter().any(|c| c.user_id == user_id))
    }

    pub async fn connection_count(&self, room_id: Uuid) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).map_or(0, Vec::len)
    }

    /// Acquire the room's append lock. Hold it across persist, commit and
    /// broadcast.
    pub async fn lock_room(&self, room_id: Uuid) -> RoomGuard {
        let lock = {
            let mut locks = self.append_locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(room_id).or_default().clone()
        };
        RoomGuard {
            room_id,
            guard: Some(lock.lock_owned().await),
            locks: self.append_locks.clone(),
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.append_locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing(user_id: Uuid) -> ServerMessage {
        ServerMessage::Typing { user_id }
    }

    #[tokio::test]
    async fn broadcast_reaches_only_the_target_room() {
        let hub = ChatBroadcaster::new();
        let (room_a, room_b) = (Uuid::new_v4(), Uuid::new_v4());
        let (alice, bob, carol) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let (_, mut rx_alice) = hub.join(room_a, alice).await;
        let (_, mut rx_bob) = hub.join(room_a, bob).await;
        let (_, mut rx_carol) = hub.join(room_b, carol).await;

        // Alice sees Bob come online.
        assert_eq!(
            rx_alice.recv().await,
            Some(ServerMessage::Presence {
                user_id: bob,
                online: true
            })
        );

        let delivered = hub.broadcast(room_a, typing(alice), None).await;
        assert_eq!(delivered, 2);
        assert_eq!(rx_alice.recv().await, Some(typing(alice)));
        assert_eq!(rx_bob.recv().await, Some(typing(alice)));
        assert!(rx_carol.try_recv().is_err());
    }

    #[tokio::test]
    async fn excluded_user_is_skipped() {
        let hub = ChatBroadcaster::new();
        let room = Uuid::new_v4();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let (_, mut rx_alice) = hub.join(room, alice).await;
        let (_, mut rx_bob) = hub.join(room, bob).await;
        let _ = rx_alice.recv().await; // bob's presence

        hub.broadcast(room, typing(alice), Some(alice)).await;
        assert_eq!(rx_bob.recv().await, Some(typing(alice)));
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn leaving_stops_delivery_and_announces_offline() {
        let hub = ChatBroadcaster::new();
        let room = Uuid::new_v4();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let (_, mut rx_alice) = hub.join(room, alice).await;
        let (bob_conn, _rx_bob) = hub.join(room, bob).await;
        let _ = rx_alice.recv().await;

        hub.leave(room, bob_conn).await;
        assert_eq!(
            rx_alice.recv().await,
            Some(ServerMessage::Presence {
                user_id: bob,
                online: false
            })
        );
        assert!(!hub.is_user_online(room, bob).await);
        assert_eq!(hub.broadcast(room, typing(alice), Some(alice)).await, 0);
    }

    #[tokio::test]
    async fn second_connection_keeps_user_online() {
        let hub = ChatBroadcaster::new();
        let room = Uuid::new_v4();
        let alice = Uuid::new_v4();

        let (first, _rx1) = hub.join(room, alice).await;
        let (_second, _rx2) = hub.join(room, alice).await;
        assert_eq!(hub.connection_count(room).await, 2);

        hub.leave(room, first).await;
        assert!(hub.is_user_online(room, alice).await);
        assert_eq!(hub.connection_count(room).await, 1);
    }

    #[tokio::test]
    async fn room_lock_serializes_writers() {
        let hub = Arc::new(ChatBroadcaster::new());
        let room = Uuid::new_v4();

        let guard = hub.lock_room(room).await;
        let contender = {
            let hub = hub.clone();
            tokio::spawn(async move {
                let _g = hub.lock_room(room).await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn room_lock_is_forgotten_once_released() {
        let hub = Arc::new(ChatBroadcaster::new());
        let (room_a, room_b) = (Uuid::new_v4(), Uuid::new_v4());

        let a = hub.lock_room(room_a).await;
        let b = hub.lock_room(room_b).await;
        assert_eq!(hub.tracked_locks(), 2);

        drop(a);
        assert_eq!(hub.tracked_locks(), 1);

        // A waiter keeps the entry alive after the holder lets go.
        let waiter = {
            let hub = hub.clone();
            tokio::spawn(async move {
                let _g = hub.lock_room(room_b).await;
            })
        };
        tokio::task::yield_now().await;
        drop(b);
        assert_eq!(hub.tracked_locks(), 1);

        waiter.await.unwrap();
        assert_eq!(hub.tracked_locks(), 0);
    }
}
