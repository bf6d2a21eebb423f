use chrono::{TimeZone, Utc};
use dirdigest_core::{
    Composition, Digest, DigestAlgorithm, DigestConfig, DigestError, FilterPolicy, NodeKind,
    NodeMetadata, TreeNode,
};

fn metadata(name: &str, size: u64, digest: u8) -> NodeMetadata {
    let mut m = NodeMetadata::new(
        name,
        size,
        Utc.with_ymd_and_hms(2023, 3, 18, 14, 48, 4).unwrap(),
        0o100644,
    );
    m.digest = Some(Digest::new([digest; 32]));
    m
}

#[test]
fn test_digest_equality_and_hex() {
    let a = Digest::new([0xab; 32]);
    let b = Digest::new([0xab; 32]);
    let c = Digest::new([0xcd; 32]);

    assert_eq!(a, b);
    assert_ne!(a, c);

    let hex = a.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|ch| ch.is_ascii_hexdigit()));
    assert_eq!(format!("{a}"), hex);
}

#[test]
fn test_node_kind_discrimination() {
    assert!(NodeKind::File.is_file());
    assert!(!NodeKind::File.is_dir());

    assert!(NodeKind::Directory.is_dir());
    assert!(!NodeKind::Directory.is_symlink());

    let link = NodeKind::Symlink {
        target: "../elsewhere".into(),
    };
    assert!(link.is_symlink());
    assert!(!link.is_file());
}

#[test]
fn test_metadata_serializes_as_flat_record() {
    let m = metadata("/photos/A.txt", 5, 0x11);
    let value = serde_json::to_value(&m).unwrap();

    assert_eq!(value["name"], "/photos/A.txt");
    assert_eq!(value["size"], 5);
    assert_eq!(value["mode"], 0o100644);
    assert_eq!(value["modifiedTime"], "2023-03-18T14:48:04Z");
    assert_eq!(value["digest"], "11".repeat(32));

    let back: NodeMetadata = serde_json::from_value(value).unwrap();
    assert_eq!(back, m);
}

#[test]
fn test_nested_directory_sizes_and_counts() {
    let inner = TreeNode::new_directory(
        "/r/inner",
        metadata("inner", 4096, 0),
        vec![
            TreeNode::new_file("/r/inner/x", metadata("x", 10, 1)),
            TreeNode::new_file("/r/inner/y", metadata("y", 20, 2)),
        ],
    );
    let link = TreeNode::new_symlink("/r/link", "inner/x", metadata("link", 0, 3));
    let root = TreeNode::new_directory(
        "/r",
        metadata("r", 4096, 0),
        vec![TreeNode::new_file("/r/a", metadata("a", 5, 4)), inner, link],
    );

    assert_eq!(root.size(), 35);
    assert_eq!(root.children[1].size(), 30);
    assert_eq!(root.file_count(), 3);
    assert_eq!(root.dir_count(), 1);
    assert_eq!(root.child_count(), 3);
    assert_eq!(root.iter().count(), 6);
}

#[test]
fn test_config_round_trips_through_serde() {
    let config = DigestConfig::builder()
        .root("/srv/backup")
        .composition(Composition::HexText)
        .algorithm(DigestAlgorithm::Blake3)
        .ignore_patterns(vec!["*.part".to_string()])
        .build()
        .unwrap();

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"hex-text\""));
    assert!(json.contains("\"blake3\""));

    let parsed: DigestConfig = serde_json::from_str(r#"{"root":"/srv"}"#).unwrap();
    assert_eq!(parsed.ignore_patterns, vec![".DS_Store", "@eaDir"]);
    assert_eq!(parsed.algorithm, DigestAlgorithm::Sha256);
    assert_eq!(parsed.composition, Composition::RawBytes);
}

#[test]
fn test_filter_policy_from_config_patterns() {
    let config = DigestConfig::new("/srv");
    let policy = FilterPolicy::new(&config.ignore_patterns).unwrap();
    assert!(policy.should_ignore(".DS_Store"));
    assert!(!policy.should_ignore("README.md"));

    let err = FilterPolicy::new(&["{a,b"]).unwrap_err();
    assert!(matches!(err, DigestError::InvalidPattern { .. }));
}
