//! Binary to generate/update .expected.go and .expected.err files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- tables  # Update only cases matching "tables"

use goblock::{Options, Params, generate};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let case_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&case_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|s| s == "json"))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        if let Some(ref f) = filter {
            if !path_str.contains(f.as_str()) {
                skipped += 1;
                continue;
            }
        }

        if process_file(path) {
            updated += 1;
        }
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

/// Cases under a `strict/` directory are generated in strict mode
fn options_for(path: &Path) -> Options {
    Options {
        strict: path.components().any(|c| c.as_os_str() == "strict"),
        ..Options::default()
    }
}

fn process_file(path: &Path) -> bool {
    let params = match Params::from_file(path) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return false;
        }
    };

    let expected_go = path.with_extension("expected.go");
    let expected_err = path.with_extension("expected.err");

    let written = match generate(&params, &options_for(path)) {
        Ok(code) => {
            let _ = fs::remove_file(&expected_err);
            fs::write(&expected_go, code).map(|_| expected_go)
        }
        Err(e) => {
            let _ = fs::remove_file(&expected_go);
            fs::write(&expected_err, format!("{}\n", e)).map(|_| expected_err)
        }
    };

    match written {
        Ok(out) => {
            println!("  wrote {}", out.display());
            true
        }
        Err(e) => {
            eprintln!("Failed to write expected file for {:?}: {}", path, e);
            false
        }
    }
}
