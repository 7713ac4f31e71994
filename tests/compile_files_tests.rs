use std::fs;
use std::path::Path;
use umbra::compile_file;
use umbra::compiler_frontend::compiler_errors::ErrorType;
use umbra::compiler_frontend::symbols::identifiers::IdentPayload;
use umbra::compiler_frontend::optimizers::constant_folding::ConstValue;
use umbra::settings::Config;

fn write(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create source folder");
    }
    fs::write(path, source).expect("write source file");
}

#[test]
fn import_graph_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();

    write(
        root,
        "app/main.um",
        "import (\n    \"../lib/geometry.um\"\n    \"../lib/units.um\"\n)\n\nvar origin: geometry.Point\nconst scale = units.cm * 10\n\nfn main() {\n    origin = origin\n}\n",
    );
    write(
        root,
        "lib/geometry.um",
        "import \"units.um\"\n\ntype Point* = struct {\n    x, y: int\n}\n\nconst unit* = units.cm\n",
    );
    write(root, "lib/units.um", "const cm* = 1\nconst m* = cm * 100\n");

    let main_path = root.join("app/main.um");
    let config = Config::discover(&main_path).expect("no config file means defaults");
    let program = compile_file(&main_path, &config).expect("program compiles");

    // Universe, main, geometry, units
    assert_eq!(program.modules.len(), 4);

    let scale = program.find("main", "scale").expect("scale declared");
    assert_eq!(scale.payload, IdentPayload::Const(ConstValue::Int(10)));

    let point = program.find("geometry", "Point").expect("Point declared");
    let origin = program.find("main", "origin").expect("origin declared");
    assert_eq!(origin.data_type, point.data_type);
}

#[test]
fn config_file_next_to_the_root_is_used() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();

    write(root, "umbra.toml", "entry_function = \"start\"\ndefault_str_len = 15\n");
    write(root, "main.um", "type Name* = str\nfn start() {}\n");

    let main_path = root.join("main.um");
    let config = Config::discover(&main_path).expect("config parses");
    assert_eq!(config.entry_function, "start");

    let program = compile_file(&main_path, &config).expect("start is the entry point");
    let name = program.find("main", "Name").expect("Name declared");
    assert_eq!(program.types.size_of(name.data_type), Some(16));
}

#[test]
fn missing_root_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let main_path = dir.path().join("absent.um");

    let error = compile_file(&main_path, &Config::default()).expect_err("nothing to compile");
    assert_eq!(error.error_type, ErrorType::File);
}

#[test]
fn missing_import_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "main.um", "import \"gone.um\"\nfn main() {}\n");

    let main_path = dir.path().join("main.um");
    let error = compile_file(&main_path, &Config::default()).expect_err("import is missing");

    assert_eq!(error.error_type, ErrorType::File);
    assert_eq!(error.location.scope, main_path);
}

#[test]
fn malformed_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "umbra.toml", "entry_function = [1, 2]\n");
    write(dir.path(), "main.um", "fn main() {}\n");

    let error = Config::discover(&dir.path().join("main.um")).expect_err("bad config");
    assert_eq!(error.error_type, ErrorType::Config);
}
