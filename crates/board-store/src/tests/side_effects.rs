//! Side-effect emission tests.
//!
//! Every committed mutation emits exactly one side-effect carrying the record
//! as committed (or the primary key for deletions). Reads and idempotent
//! writes emit nothing.

use board_protocol_types::{BookmarkState, LikeState, UserStatus};

use super::{board, post_room, register};
use crate::reader::BoardReader;
use crate::types::{NewComment, PostUpdate};
use crate::writer::BoardWriter;
use crate::SideEffect;

#[test]
fn create_post_emits_canonical_record() {
    let board = board();
    let alice = register(&board, "alice");

    let post = post_room(&board, &alice);

    assert_eq!(board.sink().effects(), vec![SideEffect::PostCreated(post.clone())]);
    assert_eq!(board.post(post.id).unwrap(), post);
}

#[test]
fn update_post_emits_updated_record() {
    let board = board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    board.sink().clear();

    let updated = board
        .update_post(
            alice.id,
            post.id,
            PostUpdate {
                title: Some("Sunny room, now cheaper".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Sunny room, now cheaper");
    assert_eq!(updated.content, post.content);
    assert_eq!(updated.location, post.location);
    assert_eq!(board.sink().effects(), vec![SideEffect::PostUpdated(updated)]);
}

#[test]
fn empty_location_clears_it() {
    let board = board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    assert!(post.location.is_some());

    let updated = board
        .update_post(
            alice.id,
            post.id,
            PostUpdate {
                location: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.location, None);
}

#[test]
fn delete_post_emits_primary_key() {
    let board = board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    board.sink().clear();

    board.delete_post(alice.id, post.id).unwrap();

    assert_eq!(
        board.sink().effects(),
        vec![SideEffect::PostDeleted { post_id: post.id }]
    );
}

#[test]
fn comment_lifecycle_emits_one_effect_each() {
    let board = board();
    let alice = register(&board, "alice");
    let bob = register(&board, "bob");
    let post = post_room(&board, &alice);
    board.sink().clear();

    let comment = board
        .create_comment(
            bob.id,
            NewComment {
                post_id: post.id,
                parent_id: None,
                content: "  hi  ".to_string(),
            },
        )
        .unwrap();
    assert_eq!(comment.content, "hi");

    let edited = board.update_comment(bob.id, comment.id, "hello").unwrap();
    let deleted = board.delete_comment(bob.id, comment.id).unwrap();
    assert_eq!(deleted.id, comment.id);

    assert_eq!(
        board.sink().effects(),
        vec![
            SideEffect::CommentCreated(comment.clone()),
            SideEffect::CommentUpdated(edited),
            SideEffect::CommentDeleted {
                comment_id: comment.id,
                post_id: post.id,
            },
        ]
    );
}

#[test]
fn like_toggle_emits_count() {
    let board = board();
    let alice = register(&board, "alice");
    let bob = register(&board, "bob");
    let post = post_room(&board, &alice);
    board.sink().clear();

    board.toggle_like(bob.id, post.id).unwrap();

    assert_eq!(
        board.sink().effects(),
        vec![SideEffect::LikesChanged(LikeState {
            post_id: post.id,
            likes: 1
        })]
    );
}

#[test]
fn bookmark_toggle_emits_state() {
    let board = board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    board.sink().clear();

    board.toggle_bookmark(alice.id, post.id).unwrap();

    assert_eq!(
        board.sink().effects(),
        vec![SideEffect::BookmarkChanged(BookmarkState {
            post_id: post.id,
            user_id: alice.id,
            bookmarked: true,
        })]
    );
}

#[test]
fn send_message_emits_message() {
    let board = board();
    let alice = register(&board, "alice");
    let bob = register(&board, "bob");
    let chat = board.open_chat(alice.id, bob.id).unwrap();
    assert!(board.sink().is_empty(), "opening a chat emits nothing");

    let message = board.send_message(bob.id, chat.id, "hey").unwrap();

    assert_eq!(board.sink().effects(), vec![SideEffect::MessageSent(message)]);
}

#[test]
fn presence_emits_only_on_change() {
    let board = board();
    let alice = register(&board, "alice");

    board.set_online(alice.id, true).unwrap();
    board.set_online(alice.id, true).unwrap();
    board.set_online(alice.id, false).unwrap();
    board.set_online(alice.id, false).unwrap();

    assert_eq!(
        board.sink().effects(),
        vec![
            SideEffect::PresenceChanged(UserStatus {
                user_id: alice.id,
                online: true
            }),
            SideEffect::PresenceChanged(UserStatus {
                user_id: alice.id,
                online: false
            }),
        ]
    );
}

#[test]
fn reads_emit_nothing() {
    let board = board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    board.sink().clear();

    board.post(post.id).unwrap();
    board.posts(None).unwrap();
    board.comments(post.id).unwrap();
    board.likes(post.id).unwrap();
    board.bookmark(post.id, alice.id).unwrap();
    board.bookmarked_posts(alice.id).unwrap();
    board.chats(alice.id).unwrap();

    assert!(board.sink().is_empty());
}
