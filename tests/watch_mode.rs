// tests/watch_mode.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use catalog_gen::engine::BuildEvent;
use catalog_gen::extract::TypeScriptExtractor;
use catalog_gen::fs::RealFileSystem;
use catalog_gen::Session;
use catalog_gen_test_utils::builders::SettingsBuilder;
use catalog_gen_test_utils::{init_tracing, with_timeout};
use tempfile::TempDir;

/// Poll until `cond` holds. Bounded by `with_timeout` at the call site.
async fn eventually(mut cond: impl FnMut() -> bool) {
    while !cond() {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn index_contains(out: &Path, needle: &str) -> bool {
    fs::read_to_string(out.join("page.tsx"))
        .map(|s| s.contains(needle))
        .unwrap_or(false)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watch_mode_follows_edits_until_shutdown() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let root: PathBuf = dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    write(
        &root.join("src/Card.catalog.tsx"),
        "export const Default = () => null;\n",
    );

    let settings = SettingsBuilder::rooted_at(&root)
        .debounce(Duration::from_millis(20))
        .build();
    let out = settings.output_root.clone();

    let session = Session::start(
        &settings,
        Arc::new(RealFileSystem),
        Arc::new(TypeScriptExtractor::new()),
        true,
    )
    .unwrap();
    let shutdown = session.sender();
    let running = tokio::spawn(session.run());

    // Initial scan.
    with_timeout(eventually(|| index_contains(&out, "\"Card/Default\"")))
        .await;

    // New file in a new directory.
    let button = root.join("src/ui/Button.catalog.tsx");
    write(&button, "export const Primary = () => null;\n");
    with_timeout(eventually(|| out.join("ui/Button/Primary/page.tsx").is_file())).await;
    with_timeout(eventually(|| index_contains(&out, "\"ui/Button/Primary\""))).await;

    // Symbol rename.
    write(&button, "export const Ghost = () => null;\n");
    with_timeout(eventually(|| {
        out.join("ui/Button/Ghost/page.tsx").is_file() && !out.join("ui/Button/Primary").exists()
    }))
    .await;

    // Deletion.
    fs::remove_file(&button).unwrap();
    with_timeout(eventually(|| !out.join("ui").exists())).await;
    with_timeout(eventually(|| !index_contains(&out, "ui/Button"))).await;
    assert!(out.join("Card/Default/page.tsx").is_file());

    shutdown.send(BuildEvent::ShutdownRequested).await.unwrap();
    with_timeout(running).await.unwrap().unwrap();
}
