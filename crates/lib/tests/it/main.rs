/*! Integration tests for binderkit.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - store: Tests for the PositionalCardStore mutations and invariants
 * - history: Tests for undo/redo through a Binder session
 * - clipboard: Tests for moving cards between binders via the workspace clipboard
 * - sync: Tests for push, pull, drift and conflict handling
 * - workspace: Tests for opening, switching and locally persisting binders
 * - backend: Tests for the in-memory DocumentStore and its file persistence
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("binderkit=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod clipboard;
mod helpers;
mod store;
mod workspace;
