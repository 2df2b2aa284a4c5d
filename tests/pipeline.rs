//! End-to-end tests of the compose → suggest → submit flow against real
//! stores.

use pretty_assertions::assert_eq;

use topicflow::auth::LocalSession;
use topicflow::compose::{Candidate, Composer};
use topicflow::model::{TagFilter, TagScope, Topic};
use topicflow::ops::submit::{Posted, SubmitError, post_from_composer, submit_task};
use topicflow::ops::{search, topic_ops};
use topicflow::store::{FaultyStore, FileStore, MemoryStore, Store, WriteOp};

fn groceries(store: &mut impl Store) -> Topic {
    topic_ops::create_topic(store, "u1", "Groceries", None, Some("🛒".into())).unwrap()
}

fn full_names(store: &impl Store, scope: TagScope) -> Vec<String> {
    let all = store.list_tags("u1", &TagFilter::Any).unwrap();
    store
        .list_tags("u1", &TagFilter::Scope(scope))
        .unwrap()
        .iter()
        .map(|t| t.full_name_in(&all))
        .collect()
}

#[test]
fn test_hierarchical_tag_post() {
    let mut store = MemoryStore::new();
    let topic = groceries(&mut store);
    let session = LocalSession::signed_in("u1");

    let done = submit_task(&mut store, &session, "@Groceries #shopping/urgent buy milk", None).unwrap();
    assert_eq!(done.topic.id, topic.id);
    assert_eq!(done.task.content, "#shopping/urgent buy milk");

    let names: Vec<&str> = done.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["shopping", "urgent"]);
    assert_eq!(done.tags[1].parent_id.as_deref(), Some(done.tags[0].id.as_str()));
    assert!(done.tags.iter().all(|t| t.scope() == TagScope::Topic(topic.id.clone())));

    let stored = store.get_task(&done.task.id).unwrap().unwrap();
    assert_eq!(stored.tags.len(), 2);
    assert_eq!(
        full_names(&store, TagScope::Topic(topic.id)),
        vec!["shopping", "shopping/urgent"]
    );
    assert_eq!(full_names(&store, TagScope::Global), Vec::<String>::new());
}

#[test]
fn test_existing_tags_are_reused() {
    let mut store = MemoryStore::new();
    let topic = groceries(&mut store);
    let session = LocalSession::signed_in("u1");

    submit_task(&mut store, &session, "eggs #shopping/urgent", Some(&topic.id)).unwrap();
    let second = submit_task(&mut store, &session, "bread #shopping", Some(&topic.id)).unwrap();

    assert_eq!(store.list_tags("u1", &TagFilter::Any).unwrap().len(), 2);
    assert_eq!(second.tags.len(), 1);
    assert_eq!(second.tags[0].name, "shopping");
}

#[test]
fn test_unknown_mention_writes_nothing() {
    let mut store = MemoryStore::new();
    groceries(&mut store);
    let before = store.snapshot().clone();

    let err = submit_task(&mut store, &LocalSession::signed_in("u1"), "@Nonexistent hi", None)
        .unwrap_err();
    assert!(matches!(err, SubmitError::TargetNotFound(ref name) if name == "Nonexistent"));
    assert_eq!(store.snapshot(), &before);
}

#[test]
fn test_failed_attach_deletes_task() {
    let mut inner = MemoryStore::new();
    let topic = groceries(&mut inner);
    let mut store = FaultyStore::new(inner).fail_on(WriteOp::AttachTags);

    let err = submit_task(
        &mut store,
        &LocalSession::signed_in("u1"),
        "milk #dairy",
        Some(&topic.id),
    )
    .unwrap_err();
    assert!(matches!(err, SubmitError::Persistence(_)));

    let store = store.into_inner();
    assert!(store.list_tasks(&topic.id).unwrap().is_empty());
    // The tag created on the way is left behind
    assert_eq!(full_names(&store, TagScope::Topic(topic.id)), vec!["dairy"]);
}

#[test]
fn test_failed_tag_creation_deletes_task() {
    let mut inner = MemoryStore::new();
    let topic = groceries(&mut inner);
    let mut store = FaultyStore::new(inner).fail_on(WriteOp::CreateTag);
    let session = LocalSession::signed_in("u1");

    let err = submit_task(&mut store, &session, "milk #dairy", Some(&topic.id)).unwrap_err();
    assert!(matches!(err, SubmitError::Persistence(_)));
    assert!(store.inner().list_tasks(&topic.id).unwrap().is_empty());

    // Untagged posts don't touch tags at all
    submit_task(&mut store, &session, "plain milk", Some(&topic.id)).unwrap();
    assert_eq!(store.inner().list_tasks(&topic.id).unwrap().len(), 1);
}

#[test]
fn test_composer_flow_with_stale_results() {
    let mut store = MemoryStore::new();
    let topic = groceries(&mut store);
    let session = LocalSession::signed_in("u1");
    submit_task(&mut store, &session, "#shopping eggs", Some(&topic.id)).unwrap();

    let mut composer = Composer::for_task(None);
    let (mention_ticket, mention_query) = composer.set_input("@Gro", 4).unwrap();
    let topics = search::suggest(&store, "u1", &mention_query, &TagScope::Global, 10).unwrap();
    assert!(composer.apply_suggestions(mention_ticket, topics));
    assert!(composer.pick(0));
    assert_eq!(composer.text(), "@Groceries ");

    // A request is outrun by more typing; its late answer must not land
    let (stale, _) = composer.insert_str("#s").unwrap();
    let (fresh, query) = composer.insert_str("h").unwrap();
    assert_eq!(query.query, "sh");

    let scope = search::suggestion_scope(&store, "u1", composer.text(), None).unwrap();
    assert_eq!(scope, TagScope::Topic(topic.id.clone()));
    let tags = search::suggest(&store, "u1", &query, &scope, 10).unwrap();

    assert!(!composer.apply_suggestions(stale, vec![]));
    assert!(composer.apply_suggestions(fresh, tags));
    assert!(matches!(
        &composer.suggestions().items()[0],
        Candidate::Tag { full_name, .. } if full_name == "shopping"
    ));
    assert!(composer.pick(0));
    composer.insert_str("bread");
    assert_eq!(composer.text(), "@Groceries #shopping bread");

    let posted = post_from_composer(&mut composer, &mut store, &session).unwrap();
    let Posted::Task(done) = posted else {
        panic!("expected a task");
    };
    assert_eq!(done.task.content, "#shopping bread");
    assert_eq!(done.tags.len(), 1);
    assert_eq!(composer.text(), "");
}

#[test]
fn test_file_store_survives_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let session = LocalSession::signed_in("u1");

    let task_id = {
        let mut store = FileStore::open(&path).unwrap();
        let topic = groceries(&mut store);
        submit_task(&mut store, &session, "@Groceries #shopping/urgent buy milk", None)
            .unwrap();
        store.list_tasks(&topic.id).unwrap()[0].task.id.clone()
    };

    let store = FileStore::open(&path).unwrap();
    let task = store.get_task(&task_id).unwrap().unwrap();
    let mut names: Vec<String> = task.tags.iter().map(|t| t.full_name_in(&task.tags)).collect();
    names.sort();
    assert_eq!(names, vec!["shopping", "shopping/urgent"]);
}
