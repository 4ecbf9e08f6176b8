//! Ordering tests.
//!
//! Side-effects are emitted in the same order the facts were committed, also
//! when several threads write concurrently.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use board_protocol_types::CommentId;

use super::{post_room, register};
use crate::reader::BoardReader;
use crate::side_effect::RecordingSink;
use crate::types::NewComment;
use crate::writer::BoardWriter;
use crate::{Board, SideEffect};

fn comment_ids(effects: &[SideEffect]) -> Vec<CommentId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            SideEffect::CommentCreated(comment) => Some(comment.id),
            _ => None,
        })
        .collect()
}

#[test]
fn side_effects_follow_commit_order() {
    let board = super::board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    board.sink().clear();

    for i in 0..10 {
        board
            .create_comment(
                alice.id,
                NewComment {
                    post_id: post.id,
                    parent_id: None,
                    content: format!("comment {i}"),
                },
            )
            .unwrap();
    }

    let emitted = comment_ids(&board.sink().effects());
    let stored: Vec<CommentId> = board
        .comments(post.id)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(emitted, stored);
}

#[test]
fn comment_ids_increase_with_commit_order() {
    let board = super::board();
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);

    let ids: Vec<CommentId> = (0..5)
        .map(|i| {
            board
                .create_comment(
                    alice.id,
                    NewComment {
                        post_id: post.id,
                        parent_id: None,
                        content: format!("comment {i}"),
                    },
                )
                .unwrap()
                .id
        })
        .collect();

    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn concurrent_writers_emit_in_commit_order() {
    let board = Arc::new(Board::in_memory(RecordingSink::new()).unwrap());
    let alice = register(&board, "alice");
    let post = post_room(&board, &alice);
    board.sink().clear();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let board = Arc::clone(&board);
            let post_id = post.id;
            let user_id = alice.id;
            thread::spawn(move || {
                for i in 0..25 {
                    board
                        .create_comment(
                            user_id,
                            NewComment {
                                post_id,
                                parent_id: None,
                                content: format!("thread {t} comment {i}"),
                            },
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let emitted = comment_ids(&board.sink().effects());
    assert_eq!(emitted.len(), 100);
    let unique: HashSet<_> = emitted.iter().collect();
    assert_eq!(unique.len(), 100, "no side-effect is emitted twice");
    assert!(
        emitted.windows(2).all(|w| w[0] < w[1]),
        "emission order matches commit order"
    );
}
