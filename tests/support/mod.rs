// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, fixture directories, and in-memory fakes for the seams.

use std::path::Path;
use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod fakes;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("skylift=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Write `files` (relative path, contents) under `root`, creating parents.
#[allow(dead_code)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

/// A complete infrastructure directory with the default declaration files.
#[allow(dead_code)]
pub fn infra_fixture(root: &Path) {
    write_tree(
        root,
        &[
            ("infra/main.tf", "# main"),
            ("infra/variables.tf", "# variables"),
            ("infra/terraform.tfvars", "project = \"demo\""),
        ],
    );
}
