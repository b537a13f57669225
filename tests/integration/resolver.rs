use crate::fixtures::{jb, jukebox_schema, EXT, JB};
use pretty_assertions::assert_eq;
use restconf_core::data::{DataTreePath, PathArgument};
use restconf_core::error::{ErrorTag, RestconfError};
use restconf_core::mount::{MountPoint, MountPointService};
use restconf_core::resolve::{DataNormalizer, PathResolver, SchemaTarget};
use restconf_core::DefaultCodec;
use std::sync::Arc;

fn resolver() -> PathResolver {
    PathResolver::new(Arc::new(jukebox_schema()))
}

fn mounted_resolver() -> PathResolver {
    let mounts = Arc::new(MountPointService::new());
    let id = DataTreePath::new(vec![PathArgument::node(jb("jukebox"))]);
    let _ = mounts.register(MountPoint::new(id, Arc::new(jukebox_schema())));
    resolver().with_mounts(mounts)
}

fn target_name(target: &SchemaTarget) -> Option<&str> {
    match target {
        SchemaTarget::Node(node) | SchemaTarget::Rpc(node) => Some(node.qname.local_name.as_str()),
        SchemaTarget::Root => None,
    }
}

#[test]
fn nested_list_entries_are_keyed_and_normalized() {
    let ctx = resolver()
        .resolve("jukebox:jukebox/library/artist/Foo%20Fighters/album/Greatest%20Hits")
        .unwrap();
    assert_eq!(
        ctx.path.to_string(),
        "/jukebox/library/artist/artist[name=Foo Fighters]/album/album[name=Greatest Hits]"
    );
    assert_eq!(target_name(&ctx.target), Some("album"));
    assert!(!ctx.is_mounted());
}

#[test]
fn multi_key_list_consumes_keys_in_declared_order() {
    let ctx = resolver()
        .resolve("/jukebox:jukebox/playlist/morning/alice/track")
        .unwrap();
    let entry = &ctx.path.args()[2];
    let keys = entry.keys().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[&jb("name")].to_string(), "morning");
    assert_eq!(keys[&jb("owner")].to_string(), "alice");
    assert_eq!(target_name(&ctx.target), Some("track"));
}

#[test]
fn missing_second_key_is_data_missing() {
    let err = resolver()
        .resolve("jukebox:jukebox/playlist/morning")
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::DataMissing);
    assert_eq!(err.message(), "Missing key for list \"playlist\".");
}

#[test]
fn choice_members_are_addressed_without_the_choice() {
    let ctx = resolver().resolve("jukebox:jukebox/player/station").unwrap();
    assert_eq!(ctx.path.to_string(), "/jukebox/player/source/station");
}

#[test]
fn augmented_leaf_gets_augmentation_marker() {
    let ctx = resolver().resolve("jukebox:jukebox/player/volume").unwrap();
    assert_eq!(ctx.path.len(), 4);
    assert!(matches!(ctx.path.args()[2], PathArgument::Augmentation(_)));
    let node = ctx.schema_node().unwrap();
    assert_eq!(node.qname.namespace(), EXT);
}

#[test]
fn ambiguous_name_lists_every_namespace() {
    let err = resolver().resolve("jukebox:jukebox/player/gap").unwrap_err();
    assert!(matches!(err, RestconfError::InvalidUri { .. }));
    let message = err.message();
    assert!(message.contains("augment from more than one module"));
    assert!(message.contains(JB));
    assert!(message.contains(EXT));
}

#[test]
fn qualified_name_disambiguates() {
    let own = resolver().resolve("jukebox:jukebox/player/jukebox:gap").unwrap();
    assert_eq!(own.schema_node().unwrap().qname.namespace(), JB);
    assert_eq!(own.path.len(), 3);

    let augmented = resolver()
        .resolve("jukebox:jukebox/player/jukebox-ext:gap")
        .unwrap();
    assert_eq!(augmented.schema_node().unwrap().qname.namespace(), EXT);
}

#[test]
fn first_segment_must_be_qualified() {
    let err = resolver().resolve("jukebox/library").unwrap_err();
    assert_eq!(
        err,
        RestconfError::invalid_uri("First node in URI has to be in format \"moduleName:nodeName\".")
    );
}

#[test]
fn unknown_module_is_unknown_element() {
    let err = resolver().resolve("radio:jukebox").unwrap_err();
    assert_eq!(err, RestconfError::unknown_element("\"radio\" module does not exist."));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn unknown_child_reports_bad_format() {
    let err = resolver().resolve("jukebox:jukebox/jukebox:shelf").unwrap_err();
    assert!(matches!(err, RestconfError::InvalidUri { .. }));
    assert!(err.message().contains("\"shelf\" was not found in parent data node."));
}

#[test]
fn rpc_resolves_only_as_last_segment() {
    let ctx = resolver().resolve("jukebox:play").unwrap();
    assert!(ctx.is_rpc());
    assert_eq!(target_name(&ctx.target), Some("play"));

    let err = resolver().resolve("jukebox:play/playlist").unwrap_err();
    assert!(matches!(err, RestconfError::InvalidUri { .. }));
}

#[test]
fn leaf_must_be_the_final_segment() {
    let err = resolver()
        .resolve("jukebox:jukebox/player/jukebox:gap/more")
        .unwrap_err();
    assert!(matches!(err, RestconfError::InvalidUri { .. }));
}

#[test]
fn surrounding_slashes_are_ignored() {
    let plain = resolver().resolve("jukebox:jukebox/library").unwrap();
    let slashed = resolver().resolve("/jukebox:jukebox/library/").unwrap();
    assert_eq!(plain.path, slashed.path);
}

#[test]
fn identityref_value_must_be_module_qualified() {
    // `genre` is not a key, so go through the codec directly.
    let schema = jukebox_schema();
    let resolver = resolver();
    let module = schema.find_module("jukebox", None).unwrap();
    let genre = schema
        .find_schema_node(&[jb("jukebox"), jb("library"), jb("artist"), jb("genre")])
        .unwrap();
    let type_def = genre.type_def().unwrap();
    assert!(resolver.codec().decode(type_def, "jukebox:rock", &schema).is_some());
    assert!(resolver.codec().decode(type_def, "rock", &schema).is_none());
    assert!(module.identities().iter().any(|id| id.local_name == "jazz"));
}

#[test]
fn normalized_path_serializes_back_to_uri() {
    let resolver = resolver();
    let ctx = resolver
        .resolve("jukebox:jukebox/library/artist/Foo%20Fighters")
        .unwrap();
    let uri = DataNormalizer::new(resolver.schema())
        .to_restconf_uri(&ctx.path, &DefaultCodec)
        .unwrap();
    assert_eq!(uri, "jukebox:jukebox/jukebox:library/jukebox:artist/Foo%20Fighters");
    assert_eq!(resolver.resolve(&uri).unwrap().path, ctx.path);
}

#[test]
fn resolution_continues_inside_mount_point() {
    let ctx = mounted_resolver()
        .resolve("jukebox:jukebox/yang-ext:mount/jukebox:jukebox/library")
        .unwrap();
    assert!(ctx.is_mounted());
    assert_eq!(ctx.path.to_string(), "/jukebox/library");
    let mount = ctx.mount.as_ref().unwrap();
    assert_eq!(mount.id().to_string(), "/jukebox");
}

#[test]
fn first_node_after_mount_must_be_qualified() {
    let err = mounted_resolver()
        .resolve("jukebox:jukebox/yang-ext:mount/jukebox")
        .unwrap_err();
    assert_eq!(
        err,
        RestconfError::invalid_uri(
            "First node after mount point in URI has to be in format \"moduleName:nodeName\"."
        )
    );
}

#[test]
fn only_one_mount_point_per_uri() {
    let err = mounted_resolver()
        .resolve("jukebox:jukebox/yang-ext:mount/jukebox:jukebox/yang-ext:mount/jukebox:jukebox")
        .unwrap_err();
    assert_eq!(
        err,
        RestconfError::not_supported("Restconf supports just one mount point in URI.")
    );
}

#[test]
fn unregistered_mount_point_is_data_missing() {
    let err = mounted_resolver()
        .resolve("jukebox:jukebox/library/yang-ext:mount/jukebox:jukebox")
        .unwrap_err();
    assert_eq!(err, RestconfError::data_missing("Mount point does not exist."));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn mount_without_registry_is_not_supported() {
    let err = resolver()
        .resolve("jukebox:jukebox/yang-ext:mount/jukebox:jukebox")
        .unwrap_err();
    assert_eq!(err.tag(), ErrorTag::OperationNotSupported);
}

#[test]
fn mount_point_lookup_stops_at_the_mount() {
    let ctx = mounted_resolver()
        .resolve_mount_point("jukebox:jukebox/yang-ext:mount/jukebox:jukebox/library")
        .unwrap();
    assert!(ctx.is_mounted());
    assert!(ctx.path.is_root());
    assert!(matches!(ctx.target, SchemaTarget::Root));
}

#[test]
fn relative_targets_resolve_against_the_patch_uri() {
    let resolver = resolver();
    let base = "jukebox:jukebox/library";
    let same = resolver.resolve_relative(base, "/").unwrap();
    assert_eq!(same.path.to_string(), "/jukebox/library");

    let entry = resolver.resolve_relative(base, "/artist/Blur").unwrap();
    assert_eq!(entry.path.to_string(), "/jukebox/library/artist/artist[name=Blur]");
}
