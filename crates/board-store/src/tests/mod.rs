//! Integration tests for the board store.
//!
//! - `side_effects.rs` - One side-effect per committed mutation, with the canonical record
//! - `failures.rs`     - Rejected writes emit nothing and change nothing
//! - `toggles.rs`      - Like and bookmark toggles
//! - `ordering.rs`     - Side-effect order matches commit order
//! - `durability.rs`   - Data survives reopen; recovery emits nothing
//! - `reads.rs`        - Read path ordering and purity

mod ordering;
mod side_effects;

use board_protocol_types::{Post, PostKind, User};

use crate::side_effect::{RecordingSink, SideEffectSink};
use crate::types::{NewPost, NewUser};
use crate::writer::BoardWriter;
use crate::{Board, SideEffect};

pub(crate) fn board() -> Board<RecordingSink> {
    Board::in_memory(RecordingSink::new()).unwrap()
}

pub(crate) fn register<S: SideEffectSink>(board: &Board<S>, username: &str) -> User {
    board
        .register_user(NewUser {
            username: username.to_string(),
            phone: "+15550100".to_string(),
        })
        .unwrap()
}

pub(crate) fn new_room(title: &str) -> NewPost {
    NewPost {
        kind: PostKind::Room,
        title: title.to_string(),
        content: "Bright room, shared kitchen".to_string(),
        location: Some("Kreuzberg".to_string()),
    }
}

pub(crate) fn post_room<S: SideEffectSink>(board: &Board<S>, user: &User) -> Post {
    board.create_post(user.id, new_room("Sunny room")).unwrap()
}

/// Basic workflow test demonstrating core functionality.
#[test]
fn basic_workflow() {
    let board = board();
    let alice = register(&board, "alice");
    let bob = register(&board, "bob");
    assert!(board.sink().is_empty(), "registration emits nothing");

    let post = post_room(&board, &alice);
    let comment = board
        .create_comment(
            bob.id,
            crate::NewComment {
                post_id: post.id,
                parent_id: None,
                content: "Still available?".to_string(),
            },
        )
        .unwrap();
    board.toggle_like(bob.id, post.id).unwrap();
    board.delete_post(alice.id, post.id).unwrap();

    let effects = board.sink().effects();
    assert_eq!(effects.len(), 4);
    assert_eq!(effects[0], SideEffect::PostCreated(post.clone()));
    assert_eq!(effects[1], SideEffect::CommentCreated(comment));
    assert!(matches!(effects[2], SideEffect::LikesChanged(_)));
    assert_eq!(effects[3], SideEffect::PostDeleted { post_id: post.id });
}
