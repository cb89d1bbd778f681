use super::*;
use std::fs;

fn warning_kinds(manager: &mut FileManager) -> Vec<WarningKind> {
    manager
        .take_warnings()
        .into_iter()
        .map(|warning| warning.warning_kind)
        .collect()
}

#[test]
fn platform_stubs_are_always_available() {
    let mut names = StringTable::new();
    let mut manager = FileManager::new(Vec::new());

    assert!(!manager.is_loaded());
    let object = manager
        .find_class("java.lang.Object", &mut names)
        .expect("Object is a platform class");
    assert_eq!(names.resolve(object.decl().expect("decl").name), "Object");
    assert!(manager.is_loaded());

    assert!(manager.find_class("java.util.List", &mut names).is_some());
    assert!(manager.find_class("java.lang.annotation.Retention", &mut names).is_some());
    assert!(manager.find_class("com.missing.Nothing", &mut names).is_none());
    assert!(warning_kinds(&mut manager).is_empty());
}

#[test]
fn in_memory_entries_index_nested_classes() {
    let mut names = StringTable::new();
    let mut manager = FileManager::new(vec![ClasspathEntry::in_memory(
        "lib/Outer.java",
        "package lib; public class Outer { public static class Inner {} }",
    )]);

    let inner = manager
        .find_class("lib.Outer$Inner", &mut names)
        .expect("nested classes are indexed by flat name");
    assert_eq!(inner.path, vec![0, 0]);
}

#[test]
fn directories_are_searched_recursively() {
    let dir = tempfile::tempdir().expect("temp dir");
    let nested = dir.path().join("com").join("acme");
    fs::create_dir_all(&nested).expect("create dirs");
    fs::write(nested.join("Widget.java"), "package com.acme; public class Widget {}")
        .expect("write stub");
    fs::write(nested.join("notes.txt"), "not a stub").expect("write other file");

    let mut names = StringTable::new();
    let mut manager = FileManager::new(vec![ClasspathEntry::Path(dir.path().to_path_buf())]);

    assert!(manager.find_class("com.acme.Widget", &mut names).is_some());
    assert!(warning_kinds(&mut manager).is_empty());
}

#[test]
fn missing_entries_only_warn() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut names = StringTable::new();
    let mut manager = FileManager::new(vec![ClasspathEntry::Path(dir.path().join("gone"))]);

    assert!(manager.find_class("java.lang.String", &mut names).is_some());
    assert_eq!(warning_kinds(&mut manager), vec![WarningKind::MissingClasspathEntry]);
}

#[test]
fn unparsable_entries_only_warn() {
    let mut names = StringTable::new();
    let mut manager = FileManager::new(vec![ClasspathEntry::in_memory("Broken.java", "class {")]);

    assert!(manager.find_class("java.lang.Object", &mut names).is_some());
    assert_eq!(warning_kinds(&mut manager), vec![WarningKind::MissingClasspathEntry]);
}

#[test]
fn first_duplicate_wins() {
    let mut names = StringTable::new();
    let mut manager = FileManager::new(vec![
        ClasspathEntry::in_memory("first/Dup.java", "package p; class Dup { int first; }"),
        ClasspathEntry::in_memory("second/Dup.java", "package p; class Dup { }"),
    ]);

    let dup = manager.find_class("p.Dup", &mut names).expect("indexed");
    assert_eq!(dup.unit.source_path, PathBuf::from("first/Dup.java"));
    assert_eq!(warning_kinds(&mut manager), vec![WarningKind::DuplicateClass]);
}

#[test]
fn set_entries_flushes_what_was_read() {
    let mut names = StringTable::new();
    let mut manager = FileManager::new(Vec::new());
    assert!(manager.find_class("p.Late", &mut names).is_none());

    manager.set_entries(vec![ClasspathEntry::in_memory(
        "Late.java",
        "package p; public class Late {}",
    )]);
    assert!(!manager.is_loaded());
    assert!(manager.find_class("p.Late", &mut names).is_some());
}

#[test]
fn flat_names_join_nested_classes_with_dollar() {
    let mut names = StringTable::new();
    let unit = parse_source(
        "class Top { class A { class B {} } }",
        Path::new("Top.java"),
        &mut names,
    )
    .expect("parses");

    assert_eq!(flat_name_of(&unit, &[0], &names), "Top");
    assert_eq!(flat_name_of(&unit, &[0, 0, 0], &names), "Top$A$B");
}
