/*! Integration tests for Entrust.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - chain: Tests for delegation chain construction and serialization
 * - cache: Tests for the TTL-honoring lookup cache and its sweeper
 * - resolver: End-to-end closure and verification scenarios
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("entrust=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod cache;
mod chain;
mod helpers;
mod resolver;
