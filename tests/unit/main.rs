// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for batchjob-operator.
//!
//! These tests run without a Kubernetes cluster and exercise the validation
//! policies through the public API.
//!
//! ```bash
//! # Run all unit tests
//! cargo test --test unit
//!
//! # Run with verbose output
//! cargo test --test unit -- --nocapture
//! ```

pub mod fixtures;

mod policy_tests {
    use batchjob_operator::crd::{Action, Event, LifecyclePolicy};
    use batchjob_operator::webhooks::policies::lifecycle;
    use batchjob_operator::webhooks::policies::{ValidationContext, validate_all};

    use crate::fixtures::BatchJobBuilder;

    fn event_policy(event: Event, action: Action) -> LifecyclePolicy {
        LifecyclePolicy {
            event: Some(event),
            action,
            ..Default::default()
        }
    }

    #[test]
    fn empty_job_is_admitted() {
        let job = BatchJobBuilder::new("empty").build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        assert!(validate_all(&ctx).allowed);
    }

    #[test]
    fn job_with_valid_policies_is_admitted() {
        let job = BatchJobBuilder::new("training")
            .task("worker", 4)
            .policy(event_policy(Event::PodEvicted, Action::RestartJob))
            .policy(LifecyclePolicy {
                exit_code: Some(137),
                action: Action::RestartTask,
                ..Default::default()
            })
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        assert!(validate_all(&ctx).allowed);
    }

    #[test]
    fn internal_event_is_denied_with_field_path() {
        let job = BatchJobBuilder::new("training")
            .policy(event_policy(Event::OutOfSync, Action::RestartJob))
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        let message = result.message.unwrap();
        assert!(message.contains("spec.policies"));
        assert!(message.contains("invalid policy event"));
    }

    #[test]
    fn task_level_policies_carry_task_path() {
        let job = BatchJobBuilder::new("training")
            .task("driver", 1)
            .task_with_policies(
                "worker",
                4,
                vec![event_policy(Event::CommandIssued, Action::RestartTask)],
            )
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert!(result.message.unwrap().contains("spec.tasks[1].policies"));
    }

    #[test]
    fn duplicate_events_across_tasks_are_independent() {
        // Each policy list is validated on its own: two tasks may both react
        // to PodFailed.
        let job = BatchJobBuilder::new("training")
            .task_with_policies(
                "driver",
                1,
                vec![event_policy(Event::PodFailed, Action::RestartTask)],
            )
            .task_with_policies(
                "worker",
                4,
                vec![event_policy(Event::PodFailed, Action::RestartTask)],
            )
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        assert!(validate_all(&ctx).allowed);
    }

    #[test]
    fn wildcard_plus_other_event_is_denied() {
        let job = BatchJobBuilder::new("training")
            .policy(event_policy(Event::Any, Action::AbortJob))
            .policy(event_policy(Event::PodFailed, Action::RestartJob))
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert!(result.message.unwrap().contains("wildcard"));
    }

    #[test]
    fn enumerators_list_only_external_values() {
        assert!(!lifecycle::valid_events().contains(&Event::OutOfSync));
        assert!(!lifecycle::valid_events().contains(&Event::CommandIssued));
        assert!(!lifecycle::valid_actions().contains(&Action::SyncJob));
        assert!(!lifecycle::valid_actions().contains(&Action::Enqueue));
        assert!(lifecycle::valid_events().contains(&Event::Any));
        assert!(lifecycle::valid_actions().contains(&Action::AbortJob));
    }
}

mod volume_tests {
    use batchjob_operator::crd::{VolumeClaimSpec, VolumeSpec};
    use batchjob_operator::webhooks::policies::{ValidationContext, validate_all};

    use crate::fixtures::BatchJobBuilder;

    #[test]
    fn job_with_valid_volumes_is_admitted() {
        let job = BatchJobBuilder::new("training")
            .volume(VolumeSpec {
                mount_path: "/data".to_string(),
                volume_claim_name: Some("training-data".to_string()),
                volume_claim: None,
            })
            .volume(VolumeSpec {
                mount_path: "/scratch".to_string(),
                volume_claim_name: None,
                volume_claim: Some(VolumeClaimSpec::default()),
            })
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        assert!(validate_all(&ctx).allowed);
    }

    #[test]
    fn duplicate_mount_path_is_denied() {
        let job = BatchJobBuilder::new("training")
            .volume(VolumeSpec {
                mount_path: "/data".to_string(),
                volume_claim_name: Some("claim-a".to_string()),
                volume_claim: None,
            })
            .volume(VolumeSpec {
                mount_path: "/data".to_string(),
                volume_claim_name: Some("claim-b".to_string()),
                volume_claim: None,
            })
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert_eq!(result.reason.unwrap(), "InvalidVolumes");
        assert!(result.message.unwrap().contains("duplicated mountPath: /data"));
    }

    #[test]
    fn conflicting_claim_declaration_is_denied() {
        let job = BatchJobBuilder::new("training")
            .volume(VolumeSpec {
                mount_path: "/data".to_string(),
                volume_claim_name: Some("training-data".to_string()),
                volume_claim: Some(VolumeClaimSpec::default()),
            })
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert!(result.message.unwrap().contains("mutually exclusive"));
    }

    #[test]
    fn invalid_claim_name_is_denied() {
        let job = BatchJobBuilder::new("training")
            .volume(VolumeSpec {
                mount_path: "/data".to_string(),
                volume_claim_name: Some("Not_A_Subdomain".to_string()),
                volume_claim: None,
            })
            .build();
        let ctx = ValidationContext {
            resource: &job,
            old_resource: None,
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert!(result.message.unwrap().contains("invalid volumeClaimName"));
    }
}

mod update_tests {
    use batchjob_operator::webhooks::policies::{ValidationContext, validate_all};

    use crate::fixtures::BatchJobBuilder;

    #[test]
    fn replica_change_is_admitted() {
        let old = BatchJobBuilder::new("training").task("worker", 4).build();
        let new = BatchJobBuilder::new("training").task("worker", 8).build();
        let ctx = ValidationContext {
            resource: &new,
            old_resource: Some(&old),
            dry_run: false,
            namespace: Some("default"),
        };
        assert!(validate_all(&ctx).allowed);
    }

    #[test]
    fn queue_change_is_denied() {
        let old = BatchJobBuilder::new("training").task("worker", 4).build();
        let new = BatchJobBuilder::new("training")
            .task("worker", 4)
            .queue("priority")
            .build();
        let ctx = ValidationContext {
            resource: &new,
            old_resource: Some(&old),
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert!(result.reason.unwrap().contains("ImmutableQueue"));
    }

    #[test]
    fn task_removal_is_denied() {
        let old = BatchJobBuilder::new("training")
            .task("driver", 1)
            .task("worker", 4)
            .build();
        let new = BatchJobBuilder::new("training").task("worker", 4).build();
        let ctx = ValidationContext {
            resource: &new,
            old_resource: Some(&old),
            dry_run: false,
            namespace: Some("default"),
        };
        let result = validate_all(&ctx);
        assert!(!result.allowed);
        assert!(result.reason.unwrap().contains("ImmutableTasks"));
    }
}

mod crd_tests {
    use batchjob_operator::crd::{BatchJob, Event, JobPhase};

    use crate::fixtures::BatchJobBuilder;

    #[test]
    fn job_round_trips_through_json() {
        let job = BatchJobBuilder::new("training")
            .namespace("ml")
            .min_available(2)
            .task("worker", 4)
            .build();

        let json = serde_json::to_string(&job).unwrap();
        let parsed: BatchJob = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.metadata.name.as_deref(), Some("training"));
        assert_eq!(parsed.spec.min_available, 2);
        assert_eq!(parsed.spec.tasks[0].name, "worker");
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(JobPhase::Pending.to_string(), "Pending");
        assert_eq!(JobPhase::Terminated.to_string(), "Terminated");
    }

    #[test]
    fn event_table_has_no_duplicates() {
        // ALL drives the enumerators; a duplicate entry would surface twice
        // in valid_events().
        let unique: std::collections::HashSet<_> = Event::ALL.into_iter().collect();
        assert_eq!(unique.len(), Event::ALL.len());
    }
}
