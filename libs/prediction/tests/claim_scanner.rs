//! Claim window scanner tests

mod common;

use ethers::types::Address;
use std::sync::Arc;

use common::MockPlatform;
use prediction::application::ClaimWindowScanner;
use prediction::PlatformAdapter;

fn scanner(platform: &Arc<MockPlatform>, window: u64) -> ClaimWindowScanner {
    ClaimWindowScanner::new(Arc::clone(platform) as Arc<dyn PlatformAdapter>, window)
}

#[test]
fn test_candidates_cover_previous_rounds_only() {
    let platform = Arc::new(MockPlatform::new());
    let scanner = scanner(&platform, 5);

    assert_eq!(scanner.candidates(100), vec![99, 98, 97, 96, 95]);
    assert!(!scanner.candidates(100).contains(&100));
}

#[test]
fn test_candidates_never_underflow() {
    let platform = Arc::new(MockPlatform::new());
    let scanner = scanner(&platform, 5);

    assert_eq!(scanner.candidates(2), vec![1, 0]);
    assert!(scanner.candidates(0).is_empty());
}

#[tokio::test]
async fn test_only_claimable_unclaimed_rounds_selected() {
    let platform = Arc::new(MockPlatform::new().with_claimable(97, 250));
    let scanner = scanner(&platform, 5);

    let batch = scanner.scan(100, Address::repeat_byte(0xaa)).await;

    assert_eq!(batch.rounds(), vec![97]);
    assert_eq!(platform.checked(), vec![95, 96, 97, 98, 99]);
}

#[tokio::test]
async fn test_read_errors_drop_only_that_candidate() {
    let platform = Arc::new(
        MockPlatform::new()
            .with_claimable(95, 1)
            .with_claimable(99, 1)
            .failing_reads(95)
            .failing_reads(98),
    );
    let scanner = scanner(&platform, 5);

    let batch = scanner.scan(100, Address::repeat_byte(0xaa)).await;

    assert_eq!(batch.rounds(), vec![99]);
}

#[tokio::test]
async fn test_empty_window_yields_empty_batch() {
    let platform = Arc::new(MockPlatform::new().with_claimable(10, 1));
    let scanner = scanner(&platform, 0);

    let batch = scanner.scan(11, Address::repeat_byte(0xaa)).await;

    assert!(batch.is_empty());
    assert!(platform.checked().is_empty());
}
