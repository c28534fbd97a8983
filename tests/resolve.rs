//! End-to-end resolution against a real filesystem layout.

use std::fs;
use std::sync::Arc;

use velohost::config::directives::DirectiveParser;
use velohost::config::HostingConfig;
use velohost::resolve::{Resolution, VhostResolver};
use velohost::ResolvedMapping;

fn mapping(resolution: Resolution) -> ResolvedMapping {
    match resolution {
        Resolution::Resolved(mapping) => mapping,
        Resolution::Declined => panic!("expected a resolved request"),
    }
}

#[test]
fn resolves_document_root_from_real_directories() {
    let base = tempfile::tempdir().unwrap();
    let root = base.path().join("www.example.com/htdocs");
    fs::create_dir_all(&root).unwrap();

    let mut config = HostingConfig::new();
    config
        .add_document_root(&format!("{}/%0/htdocs", base.path().display()))
        .unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    let m = mapping(resolver.resolve("/index.html", "www.example.com"));

    assert_eq!(m.virtual_root, root);
    assert_eq!(m.filename, root.join("index.html"));
    assert!(m.handler.is_none());
}

#[test]
fn hostname_case_is_folded_before_probing() {
    let base = tempfile::tempdir().unwrap();
    let root = base.path().join("shop.example.com");
    fs::create_dir_all(&root).unwrap();

    let mut config = HostingConfig::new();
    config
        .add_document_root(&format!("{}/%0", base.path().display()))
        .unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    let m = mapping(resolver.resolve("/", "SHOP.Example.COM"));
    assert_eq!(m.virtual_root, root);
}

#[test]
fn script_alias_forces_the_cgi_handler() {
    let base = tempfile::tempdir().unwrap();
    let cgi = base.path().join("www.example.com/cgi-bin");
    fs::create_dir_all(&cgi).unwrap();

    let mut config = HostingConfig::new();
    config
        .add_script_alias("cgi-bin", &format!("{}/%0/cgi-bin", base.path().display()))
        .unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    let m = mapping(resolver.resolve("/cgi-bin/test.pl", "www.example.com"));

    assert_eq!(m.filename, cgi.join("test.pl"));
    assert_eq!(m.virtual_root, cgi);
    assert_eq!(m.handler.as_deref(), Some("cgi-script"));
}

#[test]
fn falls_back_across_document_roots_in_order() {
    let base = tempfile::tempdir().unwrap();
    let fallback = base.path().join("fallback");
    fs::create_dir_all(&fallback).unwrap();

    let mut config = HostingConfig::new();
    config
        .add_document_root(&format!("{}/%0/htdocs", base.path().display()))
        .unwrap();
    config
        .add_document_root(&format!("{}/fallback", base.path().display()))
        .unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    let m = mapping(resolver.resolve("/page.html", "www.example.com"));
    assert_eq!(m.virtual_root, fallback);
}

#[test]
fn declines_when_nothing_exists() {
    let base = tempfile::tempdir().unwrap();

    let mut config = HostingConfig::new();
    config
        .add_document_root(&format!("{}/%0/htdocs", base.path().display()))
        .unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    assert!(matches!(
        resolver.resolve("/index.html", "nosuch.example.com"),
        Resolution::Declined
    ));
}

#[test]
fn directive_file_drives_resolution() {
    let base = tempfile::tempdir().unwrap();
    let root = base.path().join("www.example.com");
    fs::create_dir_all(&root).unwrap();

    let conf = format!("VirtualDocumentRoots {}/%0\n", base.path().display());
    let config = DirectiveParser::new().parse(&conf).unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    let m = mapping(resolver.resolve("/index.html", "www.example.com"));
    assert_eq!(m.virtual_root, root);
}

#[cfg(unix)]
#[test]
fn virtual_root_owner_matches_the_directory_owner() {
    use std::os::unix::fs::MetadataExt;

    let base = tempfile::tempdir().unwrap();
    let root = base.path().join("www.example.com");
    fs::create_dir_all(&root).unwrap();

    let mut config = HostingConfig::new();
    config
        .add_document_root(&format!("{}/%0", base.path().display()))
        .unwrap();

    let resolver = VhostResolver::new(Arc::new(config));
    let m = mapping(resolver.resolve("/", "www.example.com"));

    let meta = fs::metadata(&root).unwrap();
    let identity = m.owner().expect("virtual root must be stattable");
    assert_eq!(identity.uid.as_raw(), meta.uid());
    assert_eq!(identity.gid.as_raw(), meta.gid());
}
