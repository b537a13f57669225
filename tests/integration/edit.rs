use crate::fixtures::{artist, artist_with_genre, ext, jb, jukebox_schema, library};
use pretty_assertions::assert_eq;
use restconf_core::data::{
    CommitCohort, DatastoreType, MemoryDataStore, Modification, NormalizedNode, Value,
};
use restconf_core::edit::{ContentParam, EditOutcome};
use restconf_core::error::{ErrorTag, RestconfError};
use restconf_core::schema::SchemaContextHandle;
use restconf_core::strategy::DataStoreStrategy;
use restconf_core::{RestconfConfig, RestconfDataService};
use std::sync::Arc;

const NIRVANA: &str = "jukebox:jukebox/library/artist/Nirvana";

fn service() -> (RestconfDataService, Arc<MemoryDataStore>) {
    let store = Arc::new(MemoryDataStore::new());
    let service = RestconfDataService::new(
        SchemaContextHandle::new(jukebox_schema()),
        Arc::new(DataStoreStrategy::new(Arc::clone(&store))),
        RestconfConfig::default(),
    );
    (service, store)
}

struct RejectEverything;

impl CommitCohort for RejectEverything {
    fn can_commit(
        &self,
        _datastore: DatastoreType,
        _modifications: &[Modification],
        _candidate: &NormalizedNode,
    ) -> Result<(), String> {
        Err("library is read-only".to_string())
    }
}

#[test]
fn put_creates_then_replaces() {
    let (service, _) = service();
    let created = service.put_data(NIRVANA, artist("Nirvana")).unwrap();
    assert_eq!(created.status_code(), 201);
    assert!(matches!(created.outcome, EditOutcome::Created { .. }));

    let replaced = service
        .put_data(NIRVANA, artist_with_genre("Nirvana", "rock"))
        .unwrap();
    assert_eq!(replaced.outcome, EditOutcome::Replaced);
    assert_eq!(replaced.status_code(), 204);

    let read = service.read_data(NIRVANA, ContentParam::Config).unwrap();
    assert_eq!(read.node, artist_with_genre("Nirvana", "rock"));
}

#[test]
fn put_rejects_payload_for_a_different_entry() {
    let (service, store) = service();
    let err = service.put_data(NIRVANA, artist("Blur")).unwrap_err();
    assert_eq!(
        err,
        RestconfError::invalid_value("The key values in the URI and in the payload are different.")
    );
    let root = store.snapshot(DatastoreType::Configuration);
    assert!(root.children().unwrap().is_empty());
}

#[test]
fn put_rejects_payload_with_another_name() {
    let (service, _) = service();
    let err = service
        .put_data("jukebox:jukebox/library", NormalizedNode::container(jb("player"), Vec::new()))
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::InvalidValue);
    assert_eq!(
        err.message(),
        format!(
            "Payload name ({}) is different from identifier name ({})",
            jb("player"),
            jb("library")
        )
    );
}

#[test]
fn post_twice_is_data_exists() {
    let (service, _) = service();
    let payload = NormalizedNode::map(jb("artist"), vec![artist("Blur")]);
    let first = service
        .post_data("jukebox:jukebox/library", payload.clone())
        .unwrap();
    assert_eq!(
        first.location.as_deref(),
        Some("/rests/data/jukebox:jukebox/jukebox:library/jukebox:artist/Blur")
    );

    let err = service
        .post_data("jukebox:jukebox/library", payload)
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::DataExists);
    assert_eq!(err.status_code(), 409);
}

#[test]
fn post_into_choice_lands_where_get_reads() {
    let (service, _) = service();
    let station = NormalizedNode::leaf(jb("station"), Value::string("fm4"));
    let created = service
        .post_data("jukebox:jukebox/player", station.clone())
        .unwrap();
    assert_eq!(created.status_code(), 201);
    assert_eq!(
        created.location.as_deref(),
        Some("/rests/data/jukebox:jukebox/jukebox:player/jukebox:station")
    );
    let EditOutcome::Created { path } = &created.outcome else {
        panic!("expected a created outcome, got {:?}", created.outcome);
    };
    assert_eq!(path.to_string(), "/jukebox/player/source/station");

    let read = service
        .read_data("jukebox:jukebox/player/station", ContentParam::Config)
        .unwrap();
    assert_eq!(read.node, station);
}

#[test]
fn post_of_augmented_leaf_lands_where_get_reads() {
    let (service, store) = service();
    let volume = NormalizedNode::leaf(ext("volume"), Value::Uint(5));
    let created = service
        .post_data("jukebox:jukebox/player", volume.clone())
        .unwrap();
    assert_eq!(
        created.location.as_deref(),
        Some("/rests/data/jukebox:jukebox/jukebox:player/jukebox-ext:volume")
    );

    let uri = "jukebox:jukebox/player/jukebox-ext:volume";
    let read = service.read_data(uri, ContentParam::Config).unwrap();
    assert_eq!(read.node, volume);

    let louder = NormalizedNode::leaf(ext("volume"), Value::Uint(9));
    let replaced = service.put_data(uri, louder.clone()).unwrap();
    assert_eq!(replaced.outcome, EditOutcome::Replaced);

    let player_path = service.resolve("jukebox:jukebox/player").unwrap().path;
    let player = store
        .read(DatastoreType::Configuration, &player_path)
        .unwrap();
    assert_eq!(player.children().unwrap().len(), 1);
    assert_eq!(
        service.read_data(uri, ContentParam::Config).unwrap().node,
        louder
    );
}

#[test]
fn post_twice_into_augmentation_is_data_exists() {
    let (service, _) = service();
    let volume = NormalizedNode::leaf(ext("volume"), Value::Uint(5));
    let _ = service
        .post_data("jukebox:jukebox/player", volume.clone())
        .unwrap();
    let err = service
        .post_data("jukebox:jukebox/player", volume)
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::DataExists);
}

#[test]
fn post_of_several_list_entries_is_rejected() {
    let (service, _) = service();
    let payload = NormalizedNode::map(jb("artist"), vec![artist("Blur"), artist("Oasis")]);
    let err = service
        .post_data("jukebox:jukebox/library", payload)
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::InvalidValue);
}

#[test]
fn delete_of_missing_data_is_data_missing() {
    let (service, _) = service();
    let err = service.delete_data(NIRVANA).unwrap_err();
    assert_eq!(err.tag(), ErrorTag::DataMissing);
    assert_eq!(err.status_code(), 404);
}

#[test]
fn merge_keeps_existing_entries() {
    let (service, _) = service();
    let _ = service
        .put_data("jukebox:jukebox/library", library(vec![artist("Blur")]))
        .unwrap();
    let outcome = service
        .merge_data("jukebox:jukebox/library", library(vec![artist("Oasis")]))
        .unwrap();
    assert_eq!(outcome, EditOutcome::Merged);

    let read = service
        .read_data("jukebox:jukebox/library", ContentParam::Config)
        .unwrap();
    assert_eq!(read.node, library(vec![artist("Blur"), artist("Oasis")]));
}

#[test]
fn read_all_overlays_operational_data() {
    let (service, store) = service();
    let _ = service
        .put_data("jukebox:jukebox/library", library(vec![artist("Blur")]))
        .unwrap();

    let stats = NormalizedNode::container(
        jb("stats"),
        vec![NormalizedNode::leaf(jb("plays"), Value::Uint(42))],
    );
    let stats_path = service.resolve("jukebox:jukebox/stats").unwrap().path;
    let mut tx = store.new_read_write_transaction();
    tx.put(DatastoreType::Operational, &stats_path, stats.clone())
        .unwrap();
    tx.commit().unwrap();

    let all = service.read_data("jukebox:jukebox", ContentParam::All).unwrap();
    let children = all.node.children().unwrap();
    assert_eq!(children.len(), 2);

    let config_only = service
        .read_data("jukebox:jukebox", ContentParam::Config)
        .unwrap();
    assert_eq!(config_only.node.children().unwrap().len(), 1);

    let state_only = service
        .read_data("jukebox:jukebox/stats", ContentParam::Nonconfig)
        .unwrap();
    assert_eq!(state_only.node, stats);
    assert_ne!(all.entity_tag, config_only.entity_tag);
}

#[test]
fn entity_tag_is_stable_across_reads() {
    let (service, _) = service();
    let _ = service.put_data(NIRVANA, artist("Nirvana")).unwrap();
    let first = service.read_data(NIRVANA, ContentParam::All).unwrap();
    let second = service.read_data(NIRVANA, ContentParam::All).unwrap();
    assert_eq!(first.entity_tag, second.entity_tag);
    assert_eq!(first.entity_tag.len(), 16);
}

#[test]
fn vetoed_commit_is_a_backend_failure() {
    let (service, store) = service();
    store.register_commit_cohort(Arc::new(RejectEverything));
    let err = service.put_data(NIRVANA, artist("Nirvana")).unwrap_err();
    assert_eq!(err.tag(), ErrorTag::OperationFailed);
    assert_eq!(err.status_code(), 500);
    assert!(err.message().contains("library is read-only"));

    let err = service.read_data(NIRVANA, ContentParam::Config).unwrap_err();
    assert_eq!(err.tag(), ErrorTag::DataMissing);
}

#[test]
fn deleting_the_last_entry_leaves_no_empty_list() {
    let (service, _) = service();
    let _ = service.put_data(NIRVANA, artist("Nirvana")).unwrap();
    let _ = service.delete_data(NIRVANA).unwrap();

    let read = service
        .read_data("jukebox:jukebox/library", ContentParam::Config)
        .unwrap();
    assert_eq!(read.node, NormalizedNode::container(jb("library"), Vec::new()));
}
