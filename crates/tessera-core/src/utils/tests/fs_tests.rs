use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::utils::fs::{copy_dir_shallow, copy_tree, find_files, remove_files};

#[test]
fn test_find_files_sorted_and_recursive() {
    let temp_dir = tempdir().unwrap();
    let base = temp_dir.path();
    fs::create_dir_all(base.join("b/nested")).unwrap();
    fs::write(base.join("b/nested/z.txt"), "z").unwrap();
    fs::write(base.join("a.txt"), "a").unwrap();
    fs::write(base.join("b/c.rs"), "c").unwrap();

    let all = find_files(base, &|_: &Path| true).unwrap();
    assert_eq!(
        all,
        vec![base.join("a.txt"), base.join("b/c.rs"), base.join("b/nested/z.txt")]
    );

    let txt = find_files(base, &|p: &Path| p.extension().is_some_and(|e| e == "txt")).unwrap();
    assert_eq!(txt.len(), 2);

    assert!(find_files(base.join("missing"), &|_: &Path| true).unwrap().is_empty());
}

#[test]
fn test_copy_tree_skips_existing_and_excluded() {
    let src_dir = tempdir().unwrap();
    let dst_dir = tempdir().unwrap();
    let src = src_dir.path();
    let dst = dst_dir.path();

    fs::create_dir_all(src.join("docs")).unwrap();
    fs::create_dir_all(src.join("META-INF")).unwrap();
    fs::write(src.join("docs/readme.txt"), "new").unwrap();
    fs::write(src.join("index.html"), "index").unwrap();
    fs::write(src.join("META-INF/manifest"), "m").unwrap();

    fs::create_dir_all(dst.join("docs")).unwrap();
    fs::write(dst.join("docs/readme.txt"), "old").unwrap();

    let outcome = copy_tree(src, dst, false, &|p: &Path| p == Path::new("META-INF")).unwrap();

    assert_eq!(outcome.copied, vec![dst.join("index.html")]);
    assert_eq!(outcome.skipped, vec![dst.join("docs/readme.txt")]);
    assert_eq!(fs::read_to_string(dst.join("docs/readme.txt")).unwrap(), "old");
    assert!(!dst.join("META-INF").exists());
}

#[test]
fn test_copy_dir_shallow_ignores_subdirectories() {
    let src_dir = tempdir().unwrap();
    let dst_dir = tempdir().unwrap();
    let src = src_dir.path();
    let dst = dst_dir.path().join("lib");

    fs::create_dir_all(src.join("deep")).unwrap();
    fs::write(src.join("one.jar"), "1").unwrap();
    fs::write(src.join("deep/two.jar"), "2").unwrap();

    let outcome = copy_dir_shallow(src, &dst, false).unwrap();
    assert_eq!(outcome.copied, vec![dst.join("one.jar")]);
    assert!(!dst.join("deep").exists());

    let missing = copy_dir_shallow(&src.join("nope"), &dst, false).unwrap();
    assert!(missing.copied.is_empty());
}

#[test]
fn test_remove_files_prunes_empty_directories() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("a/b")).unwrap();
    fs::create_dir_all(root.join("keep")).unwrap();
    fs::write(root.join("a/b/file"), "x").unwrap();
    fs::write(root.join("keep/file"), "x").unwrap();
    fs::write(root.join("keep/other"), "x").unwrap();

    let failures = remove_files(&[root.join("a/b/file"), root.join("keep/file"), root.join("gone")], root);

    assert!(failures.is_empty());
    assert!(!root.join("a").exists());
    assert!(root.join("keep/other").exists());
    assert!(root.exists());
}
