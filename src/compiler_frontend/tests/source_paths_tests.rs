use super::*;

#[test]
fn current_dir_components_are_dropped() {
    assert_eq!(normalize_path(Path::new("./lib/./util.um")), PathBuf::from("lib/util.um"));
}

#[test]
fn parent_dir_collapses_previous_folder() {
    assert_eq!(normalize_path(Path::new("lib/../util.um")), PathBuf::from("util.um"));
}

#[test]
fn leading_parent_dir_is_kept() {
    assert_eq!(
        normalize_path(Path::new("../shared/./util.um")),
        PathBuf::from("../shared/util.um")
    );
}

#[test]
fn folder_has_trailing_separator() {
    let folder = source_folder(Path::new("project/src/main.um"));
    assert!(folder.starts_with("project"));
    assert!(folder.ends_with(MAIN_SEPARATOR_STR));
}

#[test]
fn file_in_working_directory_has_empty_folder() {
    assert_eq!(source_folder(Path::new("main.um")), "");
}

#[test]
fn import_is_appended_to_folder() {
    let folder = source_folder(Path::new("app/main.um"));
    assert_eq!(
        resolve_import_path(&folder, "../lib/math.um"),
        PathBuf::from("lib/math.um")
    );
}

#[test]
fn module_name_is_the_file_stem() {
    assert_eq!(module_name(Path::new("lib/math.um")), "math");
}

#[test]
fn in_memory_sources_match_normalized_paths() {
    let mut sources = InMemorySources::new();
    sources.add("./lib/math.um", "const pi = 3.14");

    let source = sources
        .read_source(Path::new("lib/../lib/math.um"))
        .expect("source should be found");
    assert_eq!(source, "const pi = 3.14");

    let missing = sources.read_source(Path::new("nope.um"));
    assert!(missing.is_err());
}
