//! End-to-end tests: real socket, real store, several sessions.

use std::sync::Arc;
use std::time::Duration;

use board_ipc::{error_codes, ClientConnection, Event, IpcClient, IpcServer, Method, Response};
use board_protocol_types::{
    BookmarkState, ChannelKey, Chat, ChatMessage, Comment, EventPayload, Post, User,
};
use cache_reconciler::{ClientCache, MergeOutcome};
use serde::de::DeserializeOwned;
use serde_json::json;
use tempfile::TempDir;

use crate::app::{build_server, AppState};

struct Harness {
    _dir: TempDir,
    socket: String,
    server: Arc<IpcServer>,
    state: AppState,
}

impl Harness {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("roomboard.sock");
        let (server, state) = build_server(&socket_path, &dir.path().join("roomboard.db"))
            .await
            .unwrap();
        state.registry.init();

        let server = Arc::new(server);
        let runner = server.clone();
        tokio::spawn(async move { runner.run().await });
        for _ in 0..100 {
            if socket_path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            socket: socket_path.to_string_lossy().into_owned(),
            _dir: dir,
            server,
            state,
        }
    }

    async fn connect(&self) -> ClientConnection {
        IpcClient::new(&self.socket).connect().await.unwrap()
    }

    /// A connection that registered and identified as `username`.
    async fn user(&self, username: &str) -> (ClientConnection, User) {
        let conn = self.connect().await;
        let user: User = ok(conn
            .call_method_with_params(
                Method::UserRegister,
                json!({ "username": username, "phone": "+15550100" }),
            )
            .await
            .unwrap());
        let identified: User = ok(conn
            .call_method_with_params(Method::SessionIdentify, json!({ "user_id": user.id }))
            .await
            .unwrap());
        assert!(identified.online);
        (conn, identified)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

fn ok<T: DeserializeOwned>(response: Response) -> T {
    assert!(response.is_success(), "unexpected error: {:?}", response.error);
    response.result_as().unwrap()
}

async fn call(conn: &ClientConnection, method: Method, params: serde_json::Value) -> Response {
    conn.call_method_with_params(method, params).await.unwrap()
}

async fn join(conn: &ClientConnection, channel: ChannelKey) {
    let response = call(conn, Method::ChannelJoin, json!({ "channel": channel })).await;
    assert!(response.is_success(), "join {channel} failed: {:?}", response.error);
}

async fn next_event(conn: &mut ClientConnection) -> Event {
    tokio::time::timeout(Duration::from_secs(2), conn.next_event())
        .await
        .expect("timed out waiting for an event")
        .expect("connection closed")
}

async fn create_room(conn: &ClientConnection, title: &str) -> Post {
    ok(call(
        conn,
        Method::PostCreate,
        json!({ "kind": "room", "title": title, "content": "Bright, furnished" }),
    )
    .await)
}

#[tokio::test]
async fn comment_round_trip() {
    let harness = Harness::start().await;
    let (mut alice, _) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;

    let post = create_room(&alice, "Room near campus").await;
    let channel = ChannelKey::Post(post.id);
    join(&alice, channel).await;
    join(&bob, channel).await;

    let mut alice_cache = ClientCache::new();
    let mut bob_cache = ClientCache::new();
    for (conn, cache) in [(&alice, &mut alice_cache), (&bob, &mut bob_cache)] {
        let listed: serde_json::Value =
            ok(call(conn, Method::CommentList, json!({ "post_id": post.id })).await);
        let comments: Vec<Comment> = serde_json::from_value(listed["comments"].clone()).unwrap();
        cache.replace_comments(post.id, comments);
    }
    assert!(bob_cache.comments(post.id).unwrap().is_empty());

    let created: Comment = ok(call(
        &alice,
        Method::CommentCreate,
        json!({ "post_id": post.id, "content": "hi" }),
    )
    .await);
    alice_cache.accept_comment(created.clone());

    let event = next_event(&mut bob).await;
    assert_eq!(event.channel, channel);
    assert_eq!(bob_cache.apply(&event), MergeOutcome::Inserted);
    assert_eq!(
        bob_cache.comments(post.id).unwrap().as_slice(),
        &[created.clone()]
    );

    let echo = next_event(&mut alice).await;
    assert_eq!(alice_cache.apply(&echo), MergeOutcome::Ignored);
    assert_eq!(
        alice_cache.comments(post.id).unwrap().as_slice(),
        &[created]
    );
}

#[tokio::test]
async fn bookmark_toggle_converges() {
    let harness = Harness::start().await;
    let (mut alice, alice_user) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;

    let post = create_room(&bob, "Shared flat").await;
    join(&alice, ChannelKey::Post(post.id)).await;
    join(&bob, ChannelKey::Post(post.id)).await;

    let mut cache = ClientCache::new();
    cache.set_bookmark(BookmarkState {
        post_id: post.id,
        user_id: alice_user.id,
        bookmarked: false,
    });

    let speculation = cache.speculate_bookmark(post.id, alice_user.id, true);
    let response: BookmarkState =
        ok(call(&alice, Method::BookmarkToggle, json!({ "post_id": post.id })).await);
    assert!(response.bookmarked);
    cache.set_bookmark(response);
    speculation.confirm();

    let broadcast = next_event(&mut alice).await;
    assert_eq!(cache.apply(&broadcast), MergeOutcome::Overwritten);
    assert_eq!(cache.bookmarked(post.id, alice_user.id), Some(true));

    // Another session tracking the same slot sees the same value.
    let mut other = ClientCache::new();
    other.apply(&next_event(&mut bob).await);
    assert_eq!(other.bookmarked(post.id, alice_user.id), Some(true));
}

#[tokio::test]
async fn post_deletion_reaches_every_session() {
    let harness = Harness::start().await;
    let (mut alice, _) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;
    let (mut carol, _) = harness.user("carol").await;

    for conn in [&alice, &bob, &carol] {
        join(conn, ChannelKey::Posts).await;
    }
    let post = create_room(&alice, "Studio").await;

    let mut caches = Vec::new();
    for conn in [&mut alice, &mut bob, &mut carol] {
        let created = next_event(conn).await;
        assert_eq!(created.event, EventPayload::NewPost(post.clone()));

        let listed: serde_json::Value = ok(call(conn, Method::PostList, json!({})).await);
        let posts: Vec<Post> = serde_json::from_value(listed["posts"].clone()).unwrap();
        let mut cache = ClientCache::new();
        cache.replace_posts(posts);
        assert!(cache.posts().unwrap().contains(post.id));
        caches.push(cache);
    }

    let deleted: serde_json::Value =
        ok(call(&alice, Method::PostDelete, json!({ "post_id": post.id })).await);
    assert_eq!(deleted["deleted"], true);

    for (conn, cache) in [&mut alice, &mut bob, &mut carol].into_iter().zip(&mut caches) {
        let event = next_event(conn).await;
        assert_eq!(event.event, EventPayload::PostDeleted(post.id));
        assert_eq!(cache.apply(&event), MergeOutcome::Removed);
        assert!(!cache.posts().unwrap().contains(post.id));
    }
}

#[tokio::test]
async fn rejected_mutation_publishes_nothing() {
    let harness = Harness::start().await;
    let (alice, _) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;
    join(&bob, ChannelKey::Posts).await;

    let post = create_room(&alice, "Attic").await;
    assert_eq!(next_event(&mut bob).await.event.name(), "new-post");

    let forbidden = call(&bob, Method::PostDelete, json!({ "post_id": post.id })).await;
    assert_eq!(forbidden.error_code(), Some(error_codes::FORBIDDEN));

    let invalid = call(
        &alice,
        Method::PostUpdate,
        json!({ "post_id": post.id, "title": "   " }),
    )
    .await;
    assert_eq!(invalid.error_code(), Some(error_codes::INVALID_PARAMS));

    let missing = call(&alice, Method::PostDelete, json!({ "post_id": 9999 })).await;
    assert_eq!(missing.error_code(), Some(error_codes::NOT_FOUND));

    // Events on a channel arrive in publish order, so the next one proves
    // none of the rejected calls published.
    let renamed: Post = ok(call(
        &alice,
        Method::PostUpdate,
        json!({ "post_id": post.id, "title": "Bright attic" }),
    )
    .await);
    assert_eq!(
        next_event(&mut bob).await.event,
        EventPayload::PostUpdated(renamed)
    );
}

#[tokio::test]
async fn anonymous_session_cannot_mutate() {
    let harness = Harness::start().await;
    let conn = harness.connect().await;

    let response = call(
        &conn,
        Method::PostCreate,
        json!({ "kind": "job", "title": "Cook", "content": "Evenings" }),
    )
    .await;
    assert_eq!(response.error_code(), Some(error_codes::NOT_AUTHENTICATED));

    // Public channels and reads need no identity.
    join(&conn, ChannelKey::Posts).await;
    let listed: serde_json::Value = ok(call(&conn, Method::PostList, json!({})).await);
    assert_eq!(listed["posts"], json!([]));
}

#[tokio::test]
async fn late_joiner_only_sees_later_events() {
    let harness = Harness::start().await;
    let (alice, _) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;

    let post = create_room(&alice, "Garden room").await;
    let _: Comment = ok(call(
        &alice,
        Method::CommentCreate,
        json!({ "post_id": post.id, "content": "first" }),
    )
    .await);

    join(&bob, ChannelKey::Post(post.id)).await;
    let second: Comment = ok(call(
        &alice,
        Method::CommentCreate,
        json!({ "post_id": post.id, "content": "second" }),
    )
    .await);

    assert_eq!(
        next_event(&mut bob).await.event,
        EventPayload::NewComment(second)
    );
}

#[tokio::test]
async fn comment_delete_removes_thread_everywhere() {
    let harness = Harness::start().await;
    let (alice, _) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;

    let post = create_room(&alice, "Basement").await;
    join(&bob, ChannelKey::Post(post.id)).await;

    let root: Comment = ok(call(
        &alice,
        Method::CommentCreate,
        json!({ "post_id": post.id, "content": "Is it damp?" }),
    )
    .await);
    let reply: Comment = ok(call(
        &bob,
        Method::CommentCreate,
        json!({ "post_id": post.id, "content": "Not at all", "parent_id": root.id }),
    )
    .await);
    assert_eq!(reply.parent_id, Some(root.id));

    let mut cache = ClientCache::new();
    cache.replace_comments(post.id, Vec::new());
    for _ in 0..2 {
        cache.apply(&next_event(&mut bob).await);
    }
    assert_eq!(cache.comments(post.id).unwrap().len(), 2);

    let deleted: serde_json::Value =
        ok(call(&alice, Method::CommentDelete, json!({ "comment_id": root.id })).await);
    assert_eq!(deleted["post_id"], json!(post.id));

    let event = next_event(&mut bob).await;
    assert_eq!(cache.apply(&event), MergeOutcome::Removed);
    assert!(cache.comments(post.id).unwrap().is_empty());

    let listed: serde_json::Value =
        ok(call(&bob, Method::CommentList, json!({ "post_id": post.id })).await);
    assert_eq!(listed["comments"], json!([]));
}

#[tokio::test]
async fn chat_channel_is_members_only() {
    let harness = Harness::start().await;
    let (mut alice, alice_user) = harness.user("alice").await;
    let (mut bob, bob_user) = harness.user("bob").await;
    let (carol, _) = harness.user("carol").await;

    let chat: Chat = ok(call(&alice, Method::ChatOpen, json!({ "peer_id": bob_user.id })).await);
    let again: Chat = ok(call(&bob, Method::ChatOpen, json!({ "peer_id": alice_user.id })).await);
    assert_eq!(chat.id, again.id);

    let channel = ChannelKey::Chat(chat.id);
    let denied = call(&carol, Method::ChannelJoin, json!({ "channel": channel })).await;
    assert_eq!(denied.error_code(), Some(error_codes::FORBIDDEN));
    let denied = call(&carol, Method::MessageList, json!({ "chat_id": chat.id })).await;
    assert_eq!(denied.error_code(), Some(error_codes::FORBIDDEN));

    join(&alice, channel).await;
    join(&bob, channel).await;

    let sent: ChatMessage = ok(call(
        &alice,
        Method::MessageSend,
        json!({ "chat_id": chat.id, "content": "Still available?" }),
    )
    .await);

    let mut cache = ClientCache::new();
    cache.replace_messages(chat.id, Vec::new());
    let event = next_event(&mut bob).await;
    assert_eq!(event.channel, channel);
    assert_eq!(cache.apply(&event), MergeOutcome::Inserted);
    assert_eq!(cache.messages(chat.id).unwrap().as_slice(), &[sent.clone()]);

    let echo = next_event(&mut alice).await;
    assert_eq!(echo.event, EventPayload::NewMessage(sent));
}

#[tokio::test]
async fn identity_change_leaves_foreign_chats() {
    let harness = Harness::start().await;
    let (mut alice, alice_user) = harness.user("alice").await;
    let (bob, bob_user) = harness.user("bob").await;
    let (_carol, carol_user) = harness.user("carol").await;

    let chat: Chat = ok(call(&alice, Method::ChatOpen, json!({ "peer_id": bob_user.id })).await);
    let channel = ChannelKey::Chat(chat.id);
    join(&alice, channel).await;
    join(&bob, channel).await;
    join(&alice, ChannelKey::Posts).await;
    assert_eq!(harness.state.registry.members(&channel).len(), 2);

    let switched: User = ok(call(
        &alice,
        Method::SessionIdentify,
        json!({ "user_id": carol_user.id }),
    )
    .await);
    assert_eq!(switched.id, carol_user.id);
    assert_eq!(harness.state.registry.members(&channel).len(), 1);

    let denied = call(&alice, Method::MessageList, json!({ "chat_id": chat.id })).await;
    assert_eq!(denied.error_code(), Some(error_codes::FORBIDDEN));

    let _: ChatMessage = ok(call(
        &bob,
        Method::MessageSend,
        json!({ "chat_id": chat.id, "content": "private" }),
    )
    .await);
    let post = create_room(&bob, "After the switch").await;

    // The feed is kept; the chat message never arrives.
    let event = next_event(&mut alice).await;
    assert_eq!(event.channel, ChannelKey::Posts);
    assert_eq!(event.event, EventPayload::NewPost(post));
    assert!(alice.try_next_event().is_none());

    // Switching back to a member allows rejoining.
    let _: User = ok(call(
        &alice,
        Method::SessionIdentify,
        json!({ "user_id": alice_user.id }),
    )
    .await);
    join(&alice, channel).await;
}

#[tokio::test]
async fn presence_follows_sessions() {
    let harness = Harness::start().await;
    let (mut watcher, _) = harness.user("watcher").await;
    join(&watcher, ChannelKey::Users).await;

    let (alice, alice_user) = harness.user("alice").await;
    let online = next_event(&mut watcher).await;
    assert_eq!(online.channel, ChannelKey::Users);

    let mut cache = ClientCache::new();
    cache.apply(&online);
    assert_eq!(cache.online(alice_user.id), Some(true));

    // A second session for the same user keeps the user online.
    let second = harness.connect().await;
    let _: User = ok(call(
        &second,
        Method::SessionIdentify,
        json!({ "user_id": alice_user.id }),
    )
    .await);
    assert_eq!(harness.state.presence.sessions_of(alice_user.id), 2);

    drop(alice);
    drop(second);

    let offline = next_event(&mut watcher).await;
    cache.apply(&offline);
    assert_eq!(cache.online(alice_user.id), Some(false));
    assert_eq!(harness.state.presence.sessions_of(alice_user.id), 0);
}

#[tokio::test]
async fn likes_fan_out_to_post_channel() {
    let harness = Harness::start().await;
    let (alice, _) = harness.user("alice").await;
    let (mut bob, _) = harness.user("bob").await;

    let post = create_room(&alice, "Loft").await;
    join(&bob, ChannelKey::Post(post.id)).await;

    let liked: serde_json::Value =
        ok(call(&alice, Method::LikeToggle, json!({ "post_id": post.id })).await);
    assert_eq!(liked["liked"], true);
    assert_eq!(liked["likes"], 1);

    let mut cache = ClientCache::new();
    assert_eq!(cache.apply(&next_event(&mut bob).await), MergeOutcome::Overwritten);
    assert_eq!(cache.likes(post.id), Some(1));

    let unliked: serde_json::Value =
        ok(call(&alice, Method::LikeToggle, json!({ "post_id": post.id })).await);
    assert_eq!(unliked["likes"], 0);
    cache.apply(&next_event(&mut bob).await);
    assert_eq!(cache.likes(post.id), Some(0));
}

#[tokio::test]
async fn health_reports_sessions() {
    let harness = Harness::start().await;
    let conn = harness.connect().await;
    join(&conn, ChannelKey::Posts).await;

    let health: serde_json::Value = ok(call(&conn, Method::Health, json!({})).await);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["sessions"], 1);
    assert_eq!(health["channels"], 1);
}
