use std::fs;
use std::path::{Path, PathBuf};

use stencil::{
    cli::{Args, Command, OutputArgs},
    error::Error,
    runner::{resolve_module_name, run},
};
use tempfile::TempDir;
use walkdir::WalkDir;

fn shipped_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn gen_types_pb(out: &Path) -> Args {
    Args {
        verbose: false,
        templates: shipped_templates(),
        command: Command::GenTypesPb(OutputArgs {
            module_name: Some("example.com/user".to_string()),
            out: Some(out.to_path_buf()),
        }),
    }
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

#[test]
fn test_module_name_flag() {
    let output = OutputArgs {
        module_name: Some("user".to_string()),
        out: None,
    };
    assert_eq!(resolve_module_name(&output, "gen-types-pb").unwrap(), "user");
}

#[test]
fn test_go_mod_in_output_wins() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("go.mod"),
        "module github.com/acme/user\n\ngo 1.22\n",
    )
    .unwrap();
    let output = OutputArgs {
        module_name: Some("ignored".to_string()),
        out: Some(temp_dir.path().to_path_buf()),
    };
    assert_eq!(
        resolve_module_name(&output, "gen-types-pb").unwrap(),
        "github.com/acme/user"
    );
}

#[test]
fn test_missing_module_name() {
    let temp_dir = TempDir::new().unwrap();
    let output = OutputArgs {
        module_name: None,
        out: Some(temp_dir.path().join("fresh")),
    };
    match resolve_module_name(&output, "gen-types-pb") {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("module-name")),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_gen_types_pb_writes_only_types_proto() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("server");

    run(gen_types_pb(&out)).unwrap();

    let proto = Path::new("api").join("types").join("types.proto");
    assert_eq!(files_under(&out), vec![proto.clone()]);
    let contents = fs::read_to_string(out.join(&proto)).unwrap();
    assert!(contents.contains("option go_package = \"example.com/user/api/types;types\";"));
    assert!(!contents.contains("zhufuyi"));
}

#[test]
fn test_gen_types_pb_second_run_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("server");
    run(gen_types_pb(&out)).unwrap();
    let proto = out.join("api").join("types").join("types.proto");
    fs::write(&proto, "// edited by hand\n").unwrap();

    run(gen_types_pb(&out)).unwrap();

    assert_eq!(fs::read_to_string(&proto).unwrap(), "// edited by hand\n");
    assert_eq!(files_under(&out).len(), 1);
}

#[test]
fn test_unknown_preset_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("server");
    let args = Args {
        verbose: false,
        templates: shipped_templates(),
        command: Command::Generate {
            preset: "models".to_string(),
            template: "sponge".to_string(),
            output: OutputArgs {
                module_name: Some("example.com/user".to_string()),
                out: Some(out.clone()),
            },
        },
    };

    assert!(matches!(run(args), Err(Error::ConfigError(_))));
    assert!(!out.exists());
}
