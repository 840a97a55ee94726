mod common;

use common::{fixture_clock, ts};
use forum_core::db::open_db_in_memory;
use forum_core::{
    Comment, CommentRepository, FindResult, RecordRepository, RepoError, SqliteStorage,
    StorageError, User, UserRepository, Vote, VoteRepository,
};

struct Fixture {
    users: Vec<i64>,
    comment_id: i64,
}

fn seed(storage: &SqliteStorage<'_>) -> Fixture {
    let users = ["ada", "bob", "cy"]
        .iter()
        .map(|name| {
            let mut user = User::new(None::<i64>, format!("{name}@example.com"), *name).unwrap();
            UserRepository::new(storage).insert(&mut user).unwrap();
            user.user_id().unwrap()
        })
        .collect::<Vec<_>>();

    let mut comment =
        Comment::new(None::<i64>, users[0], "vote on me", None::<&str>, &fixture_clock()).unwrap();
    CommentRepository::new(storage).insert(&mut comment).unwrap();

    Fixture {
        users,
        comment_id: comment.comment_id().unwrap(),
    }
}

fn new_vote(user_id: i64, comment_id: i64, value: i32) -> Vote {
    Vote::new(user_id, comment_id, None::<&str>, value, &fixture_clock()).unwrap()
}

#[test]
fn insert_marks_vote_persisted_and_find_returns_it() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    let mut vote = new_vote(fixture.users[1], fixture.comment_id, 1);
    repo.insert(&mut vote).unwrap();

    assert!(vote.is_persisted());
    assert_eq!(vote.value(), Some(1));
    assert_eq!(
        repo.find_by_user_id(fixture.users[1]).unwrap(),
        FindResult::One(vote)
    );
}

#[test]
fn second_insert_of_same_record_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    let mut vote = new_vote(fixture.users[1], fixture.comment_id, -1);
    repo.insert(&mut vote).unwrap();
    assert!(matches!(
        repo.insert(&mut vote).unwrap_err(),
        RepoError::AlreadyExists { entity: "vote" }
    ));
}

#[test]
fn duplicate_composite_key_is_rejected_by_storage() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    repo.insert(&mut new_vote(fixture.users[1], fixture.comment_id, 1))
        .unwrap();
    let mut again = new_vote(fixture.users[1], fixture.comment_id, -1);
    let err = repo.insert(&mut again).unwrap_err();

    assert!(matches!(err, RepoError::Storage(StorageError::Sqlite(_))));
    assert!(!again.is_persisted());
}

#[test]
fn vote_without_value_cannot_be_stored() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    let mut unset = Vote::new(
        fixture.users[1],
        fixture.comment_id,
        None::<&str>,
        None::<i64>,
        &fixture_clock(),
    )
    .unwrap();
    let err = repo.insert(&mut unset).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert!(!unset.is_persisted());
}

#[test]
fn update_flips_value_by_composite_key() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    let mut vote = new_vote(fixture.users[1], fixture.comment_id, 1);
    repo.insert(&mut vote).unwrap();
    let mut other = new_vote(fixture.users[2], fixture.comment_id, 1);
    repo.insert(&mut other).unwrap();

    vote.set_value(-1).unwrap();
    vote.set_recorded_at("2024-06-02 08:00:00", &fixture_clock())
        .unwrap();
    repo.update(&vote).unwrap();

    let downvotes = repo.find_by_vote(-1).unwrap().one().unwrap();
    assert_eq!(downvotes.user_id(), fixture.users[1]);
    assert_eq!(downvotes.recorded_at(), ts(2024, 6, 2, 8, 0, 0));
    assert_eq!(repo.find_by_vote(1).unwrap().one().unwrap(), other);
}

#[test]
fn delete_only_removes_the_matching_pair() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    let mut first = new_vote(fixture.users[1], fixture.comment_id, 1);
    let mut second = new_vote(fixture.users[2], fixture.comment_id, 1);
    repo.insert(&mut first).unwrap();
    repo.insert(&mut second).unwrap();

    repo.delete(&first).unwrap();

    assert!(first.is_persisted());
    assert_eq!(
        repo.find_by_comment_id(fixture.comment_id).unwrap(),
        FindResult::One(second)
    );
    assert!(matches!(
        repo.delete(&first).unwrap_err(),
        RepoError::NotFound { entity: "vote", .. }
    ));
}

#[test]
fn find_by_comment_returns_many_votes() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let fixture = seed(&storage);
    let repo = VoteRepository::new(&storage);

    for (user_id, value) in fixture.users.iter().zip([1, -1, 1]) {
        repo.insert(&mut new_vote(*user_id, fixture.comment_id, value))
            .unwrap();
    }

    let votes = repo.find_by_comment_id(fixture.comment_id).unwrap();
    assert!(matches!(votes, FindResult::Many(ref all) if all.len() == 3));
    assert!(votes.into_vec().iter().all(Vote::is_persisted));
    assert_eq!(repo.find_by_vote(1).unwrap().len(), 2);
}

#[test]
fn find_by_vote_rejects_values_outside_unit_range() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteStorage::try_new(&conn).unwrap();
    let repo = VoteRepository::new(&storage);

    for raw in [0, 2] {
        let err = repo.find_by_vote(raw).unwrap_err();
        assert!(matches!(err, RepoError::Validation(ref field) if field.field == "vote"));
    }
    assert!(matches!(
        repo.find_by_vote(None::<i64>).unwrap_err(),
        RepoError::Validation(_)
    ));
}
