//! Property tests over whole sessions.

use bastion_cli::application::services::interrupt;
use bastion_cli::application::services::session::run_session;
use proptest::prelude::*;

use crate::helpers::{FailAt, FakeControlPlane, RecordingReporter, staging_session};

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
        .block_on(fut)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Whatever step fails, and whether or not the operator interrupts once
    /// forwarding is up, exactly one cleanup pass runs and it deletes the
    /// pod exactly when one was created.
    #[test]
    fn prop_one_cleanup_and_delete_iff_provisioned(
        idx in 0..FailAt::ALL.len(),
        ctrl_c in proptest::bool::ANY,
    ) {
        let fail_at = FailAt::ALL[idx];
        let (trigger, listener) = interrupt::channel();
        let cp = FakeControlPlane::new(fail_at);
        let reporter = if ctrl_c || fail_at == FailAt::Nowhere {
            RecordingReporter::interrupt_when_established(trigger)
        } else {
            drop(trigger);
            RecordingReporter::default()
        };
        let session = staging_session();

        let report = block_on(run_session(&cp, &reporter, &session, listener));

        prop_assert!(report.cleanup.performed);
        prop_assert_eq!(reporter.count("step: cleaning up"), 1);
        prop_assert_eq!(cp.log.count("delete"), usize::from(fail_at.provisions()));
        prop_assert!(!cp.pod_present());
        let expected_code = i32::from(fail_at != FailAt::Nowhere);
        prop_assert_eq!(report.exit_code(), expected_code);
    }
}
