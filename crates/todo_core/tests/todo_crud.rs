use serde_json::json;
use todo_core::db::open_db_in_memory;
use todo_core::{
    Actor, Collection, Outcome, ParagraphRenderer, ProjectGrants, SqliteEntityStore,
    StoreCommentRepository, StoreTodoRepository, TodoRepository, TodoService, TodoServiceError,
    TodoValidationError, UserRef,
};
use uuid::Uuid;

const PROJECT: &str = "project-1";

type Service<'s, 'c> = TodoService<
    StoreTodoRepository<&'s SqliteEntityStore<'c>>,
    StoreCommentRepository<&'s SqliteEntityStore<'c>>,
    ProjectGrants,
    ParagraphRenderer,
>;

fn owner() -> UserRef {
    UserRef::new("user-1", "Ada")
}

fn member() -> Actor {
    Actor::User(owner())
}

fn stranger() -> Actor {
    Actor::User(UserRef::new("user-2", "Bob"))
}

fn service<'s, 'c>(store: &'s SqliteEntityStore<'c>) -> Service<'s, 'c> {
    TodoService::new(
        StoreTodoRepository::new(store),
        StoreCommentRepository::new(store),
        ProjectGrants::new().grant(owner().key, PROJECT),
        ParagraphRenderer,
    )
}

fn assert_outcome<T: std::fmt::Debug>(result: Result<T, TodoServiceError>, expected: Outcome) {
    let err = result.unwrap_err();
    assert_eq!(err.outcome(), expected, "unexpected error: {err}");
}

#[test]
fn create_todo_takes_author_from_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);

    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "A title"}))
        .unwrap();
    assert_eq!(todo.title, "A title");
    assert_eq!(todo.author, owner());
    assert_eq!(todo.project, PROJECT);
    assert!(!todo.done);
    assert_eq!(todo.content, None);

    let todo = service
        .create_todo(
            &member(),
            PROJECT,
            &json!({"title": "A title", "content": "some content", "tags": ["a", "b", "c"]}),
        )
        .unwrap();
    let content = todo.content.as_ref().unwrap();
    assert_eq!(content.markdown, "some content");
    assert!(content.html.contains("<p>some content</p>"));
    assert_eq!(todo.tags, vec!["a", "b", "c"]);

    let stored = StoreTodoRepository::new(&store)
        .get_todo(Collection::Active, todo.key)
        .unwrap()
        .unwrap();
    assert_eq!(stored, todo);
}

#[test]
fn create_todo_rejects_bad_payloads_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);

    assert_outcome(
        service.create_todo(&member(), PROJECT, &json!({"invalid": "invalid"})),
        Outcome::BadRequest,
    );
    assert_outcome(
        service.create_todo(
            &member(),
            PROJECT,
            &json!({"title": "title", "content": "content", "author": "invalid"}),
        ),
        Outcome::BadRequest,
    );
    assert_outcome(
        service.create_todo(&member(), PROJECT, &json!({"title": "   "})),
        Outcome::BadRequest,
    );
    assert_outcome(
        service.create_todo(&member(), PROJECT, &json!(["title"])),
        Outcome::BadRequest,
    );

    let page = service
        .list_todos(&member(), PROJECT, Collection::Active, None)
        .unwrap();
    assert_eq!(page.total_todos, 0);
}

#[test]
fn create_todo_rejects_anonymous_and_non_members() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);

    assert_outcome(
        service.create_todo(&Actor::Anonymous, PROJECT, &json!({"title": "todo"})),
        Outcome::Forbidden,
    );
    assert_outcome(
        service.create_todo(&stranger(), PROJECT, &json!({"title": "todo"})),
        Outcome::Forbidden,
    );
    // Permission is decided before the payload is looked at.
    assert_outcome(
        service.create_todo(&stranger(), PROJECT, &json!({"author": "x"})),
        Outcome::Forbidden,
    );
}

#[test]
fn update_todo_changes_supplied_fields_and_rerenders_content() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo", "tags": ["x"]}))
        .unwrap();

    let updated = service
        .update_todo(&member(), PROJECT, todo.key, Collection::Active, &json!({"title": "todo2"}))
        .unwrap();
    assert_eq!(updated.key, todo.key);
    assert_eq!(updated.title, "todo2");
    assert_eq!(updated.tags, vec!["x"]);

    let updated = service
        .update_todo(
            &member(),
            PROJECT,
            todo.key,
            Collection::Active,
            &json!({"content": {"markdown": "aaaa"}}),
        )
        .unwrap();
    assert_eq!(updated.title, "todo2");
    let content = updated.content.unwrap();
    assert_eq!(content.markdown, "aaaa");
    assert!(content.html.contains("<p>aaaa</p>"));
    assert_eq!(updated.author, todo.author);
    assert_eq!(updated.created_at, todo.created_at);
    assert!(updated.updated_at >= todo.updated_at);
}

#[test]
fn update_todo_rejects_author_and_unknown_fields_atomically() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    assert_outcome(
        service.update_todo(
            &member(),
            PROJECT,
            todo.key,
            Collection::Active,
            &json!({"author": "someauthor"}),
        ),
        Outcome::BadRequest,
    );
    assert_outcome(
        service.update_todo(
            &member(),
            PROJECT,
            todo.key,
            Collection::Active,
            &json!({"title": "title", "adfaf": "adfa"}),
        ),
        Outcome::BadRequest,
    );

    let unchanged = service
        .get_todo(&member(), PROJECT, todo.key, Collection::Active)
        .unwrap();
    assert_eq!(unchanged, todo);
}

#[test]
fn update_todo_rejects_non_members_and_missing_keys() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    assert_outcome(
        service.update_todo(
            &Actor::Anonymous,
            PROJECT,
            todo.key,
            Collection::Active,
            &json!({"title": "todo2"}),
        ),
        Outcome::Forbidden,
    );
    assert_outcome(
        service.update_todo(
            &stranger(),
            PROJECT,
            todo.key,
            Collection::Active,
            &json!({"title": "todo2"}),
        ),
        Outcome::Forbidden,
    );
    assert_outcome(
        service.update_todo(
            &member(),
            PROJECT,
            Uuid::new_v4(),
            Collection::Active,
            &json!({"title": "todo2"}),
        ),
        Outcome::NotFound,
    );
}

#[test]
fn get_todo_returns_author_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    let loaded = service
        .get_todo(&member(), PROJECT, todo.key, Collection::Active)
        .unwrap();
    assert_eq!(loaded.key, todo.key);
    assert_eq!(loaded.title, "todo");
    assert_eq!(loaded.author.key, "user-1");
    assert_eq!(loaded.author.name, "Ada");

    assert_outcome(
        service.get_todo(&Actor::Anonymous, PROJECT, todo.key, Collection::Active),
        Outcome::Forbidden,
    );
    assert_outcome(
        service.get_todo(&stranger(), PROJECT, todo.key, Collection::Active),
        Outcome::Forbidden,
    );
}

#[test]
fn todos_of_another_project_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = TodoService::new(
        StoreTodoRepository::new(&store),
        StoreCommentRepository::new(&store),
        ProjectGrants::new()
            .grant(owner().key, PROJECT)
            .grant(owner().key, "project-2"),
        ParagraphRenderer,
    );
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    assert_outcome(
        service.get_todo(&member(), "project-2", todo.key, Collection::Active),
        Outcome::NotFound,
    );
}

#[test]
fn mark_done_toggles_done_flag() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let repo = StoreTodoRepository::new(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    service
        .mark_done(&member(), PROJECT, todo.key, Collection::Active, &json!({"done": true}))
        .unwrap();
    assert!(repo.get_todo(Collection::Active, todo.key).unwrap().unwrap().done);

    service
        .mark_done(&member(), PROJECT, todo.key, Collection::Active, &json!({"done": false}))
        .unwrap();
    assert!(!repo.get_todo(Collection::Active, todo.key).unwrap().unwrap().done);
}

#[test]
fn mark_done_is_single_purpose() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    for payload in [
        json!({"notdone": false}),
        json!({"done": false, "invalid": "invalid"}),
        json!({"title": true}),
        json!({"title": true, "done": true}),
    ] {
        let err = service
            .mark_done(&member(), PROJECT, todo.key, Collection::Active, &payload)
            .unwrap_err();
        assert!(matches!(err, TodoServiceError::Validation(_)), "{payload}");
    }

    let with_author = json!({"author": "x", "done": true});
    let err = service
        .mark_done(&member(), PROJECT, todo.key, Collection::Active, &with_author)
        .unwrap_err();
    assert!(matches!(
        err,
        TodoServiceError::Validation(TodoValidationError::ForbiddenField("author"))
    ));

    let stored = service
        .get_todo(&member(), PROJECT, todo.key, Collection::Active)
        .unwrap();
    assert_eq!(stored, todo);
}

#[test]
fn mark_done_rejects_non_members() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntityStore::new(&conn);
    let service = service(&store);
    let todo = service
        .create_todo(&member(), PROJECT, &json!({"title": "todo"}))
        .unwrap();

    let done = json!({"done": true});
    for actor in [Actor::Anonymous, stranger()] {
        assert_outcome(
            service.mark_done(&actor, PROJECT, todo.key, Collection::Active, &done),
            Outcome::Forbidden,
        );
    }
}
