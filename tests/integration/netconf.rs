use crate::fixtures::{artist, jb, jukebox_schema, library, FakeDevice};
use pretty_assertions::assert_eq;
use restconf_core::data::{DataTreePath, MemoryDataStore, NormalizedNode, PathArgument, Value};
use restconf_core::edit::{ContentParam, Edit, EditOutcome};
use restconf_core::error::ErrorTag;
use restconf_core::mount::{MountPoint, MountPointService};
use restconf_core::schema::SchemaContextHandle;
use restconf_core::strategy::{
    select_strategy, DataStoreStrategy, NetconfDataTreeService, NetconfStrategy, RestconfStrategy,
};
use restconf_core::{RestconfConfig, RestconfDataService};
use std::sync::Arc;

const DEVICE: &str = "jukebox:jukebox/yang-ext:mount";

fn blur_path() -> DataTreePath {
    let resolver = restconf_core::PathResolver::new(Arc::new(jukebox_schema()));
    resolver
        .resolve("jukebox:jukebox/library/artist/Blur")
        .unwrap()
        .path
}

/// Root backed by a local store, with the device mounted at `/jukebox`.
fn mounted() -> (RestconfDataService, Arc<FakeDevice>) {
    let device = Arc::new(FakeDevice::default());
    let mounts = Arc::new(MountPointService::new());
    let id = DataTreePath::new(vec![PathArgument::node(jb("jukebox"))]);
    let _ = mounts.register(
        MountPoint::new(id, Arc::new(jukebox_schema()))
            .with_netconf(device.clone())
            .with_broker(Arc::new(MemoryDataStore::new())),
    );
    let service = RestconfDataService::new(
        SchemaContextHandle::new(jukebox_schema()),
        Arc::new(DataStoreStrategy::new(Arc::new(MemoryDataStore::new()))),
        RestconfConfig::default(),
    )
    .with_mounts(mounts);
    (service, device)
}

#[test]
fn put_runs_lock_edit_commit_unlock() {
    let device = Arc::new(FakeDevice::default());
    let strategy = NetconfStrategy::new(device.clone());
    let outcome = Edit::replace(blur_path(), artist("Blur"))
        .apply(&strategy)
        .unwrap();
    assert!(matches!(outcome, EditOutcome::Created { .. }));
    assert_eq!(
        device.calls(),
        vec!["lock", "get-config", "edit-config", "commit", "unlock"]
    );
    assert_eq!(device.running(&blur_path()), Some(artist("Blur")));
}

#[test]
fn failed_edit_config_releases_the_device() {
    let device = Arc::new(FakeDevice::default());
    device.fail_on("edit-config");
    let strategy = NetconfStrategy::new(device.clone());

    let err = Edit::merge(blur_path(), artist("Blur"))
        .apply(&strategy)
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::OperationFailed);
    assert_eq!(
        device.calls(),
        vec!["lock", "edit-config", "discard-changes", "unlock"]
    );
    assert!(!device.is_locked());
}

#[test]
fn failed_discard_still_unlocks() {
    let device = Arc::new(FakeDevice::default());
    device.fail_on("edit-config");
    device.fail_on("discard-changes");
    let strategy = NetconfStrategy::new(device.clone());

    let _ = Edit::remove(blur_path()).apply(&strategy).unwrap_err();
    assert_eq!(device.count("discard-changes"), 1);
    assert_eq!(device.count("unlock"), 1);
    assert!(!device.is_locked());
}

#[test]
fn unlock_failure_after_commit_is_not_an_error() {
    let device = Arc::new(FakeDevice::default());
    device.fail_on("unlock");
    let strategy = NetconfStrategy::new(device.clone());

    let outcome = Edit::replace(blur_path(), artist("Blur"))
        .apply(&strategy)
        .unwrap();
    assert!(matches!(outcome, EditOutcome::Created { .. }));
    assert_eq!(device.running(&blur_path()), Some(artist("Blur")));
    assert_eq!(device.count("discard-changes"), 0);
}

#[test]
fn second_transaction_waits_for_the_lock() {
    let device = Arc::new(FakeDevice::default());
    let strategy = NetconfStrategy::new(device.clone());
    let held = strategy.begin().unwrap();

    let err = Edit::replace(blur_path(), artist("Blur"))
        .apply(&strategy)
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::OperationFailed);
    assert_eq!(device.count("discard-changes"), 0);

    held.discard();
    assert!(!device.is_locked());
}

#[test]
fn mounted_put_goes_to_the_device() {
    let (service, device) = mounted();
    let response = service
        .put_data(
            &format!("{DEVICE}/jukebox:jukebox/library/artist/Blur"),
            artist("Blur"),
        )
        .unwrap();
    assert_eq!(response.status_code(), 201);
    assert_eq!(
        response.location.as_deref(),
        Some("/rests/data/jukebox:jukebox/yang-ext:mount/jukebox:jukebox/jukebox:library/jukebox:artist/Blur")
    );
    assert_eq!(device.running(&blur_path()), Some(artist("Blur")));
    assert!(!device.is_locked());
}

#[test]
fn mounted_post_of_existing_entry_is_data_exists() {
    let (service, device) = mounted();
    device.seed_running(&blur_path(), artist("Blur"));

    let err = service
        .post_data(
            &format!("{DEVICE}/jukebox:jukebox/library"),
            NormalizedNode::map(jb("artist"), vec![artist("Blur")]),
        )
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::DataExists);
    assert_eq!(device.count("edit-config"), 0);
    assert_eq!(device.count("discard-changes"), 1);
    assert_eq!(device.count("unlock"), 1);
}

#[test]
fn mounted_read_merges_config_and_state() {
    let (service, device) = mounted();
    let library_path = DataTreePath::new(vec![
        PathArgument::node(jb("jukebox")),
        PathArgument::node(jb("library")),
    ]);
    let stats_path = DataTreePath::new(vec![
        PathArgument::node(jb("jukebox")),
        PathArgument::node(jb("stats")),
    ]);
    device.seed_running(&library_path, library(vec![artist("Blur")]));
    device.seed_operational(
        &stats_path,
        NormalizedNode::container(
            jb("stats"),
            vec![NormalizedNode::leaf(jb("plays"), Value::Uint(7))],
        ),
    );
    device.clear_calls();

    let read = service
        .read_data(&format!("{DEVICE}/jukebox:jukebox"), ContentParam::All)
        .unwrap();
    assert_eq!(read.node.children().unwrap().len(), 2);
    assert_eq!(device.calls(), vec!["get-config", "get"]);
}

#[test]
fn device_is_preferred_over_the_broker() {
    let device = Arc::new(FakeDevice::default());
    let service: Arc<dyn NetconfDataTreeService> = device;
    let strategy = select_strategy(Some(service), Some(Arc::new(MemoryDataStore::new()))).unwrap();
    assert_eq!(strategy.name(), "netconf");

    let strategy = select_strategy(None, Some(Arc::new(MemoryDataStore::new()))).unwrap();
    assert_eq!(strategy.name(), "datastore");
    assert!(select_strategy(None, None).is_none());
}
