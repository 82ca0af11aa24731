//! End-to-end behaviour of the lifecycle service over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};
use viandas::domain::ports::{
    ChangeContainerStatusRequest, CollaboratorMonthRequest, ContainerCommand, ContainerQuery,
    ContainerRepository, FixtureTemperatureOracle, ReassignFridgeRequest,
    RegisterContainerRequest,
};
use viandas::domain::{
    ContainerDraft, ContainerLifecycleService, ContainerStatus, ErrorCode, FridgeId, StatusTally,
};
use viandas::outbound::memory::InMemoryContainerRepository;

type Service = ContainerLifecycleService<InMemoryContainerRepository, FixtureTemperatureOracle>;

const WARM_FRIDGE: i64 = 1;
const COLD_FRIDGE: i64 = 2;

struct Harness {
    repo: Arc<InMemoryContainerRepository>,
    service: Arc<Service>,
}

impl Harness {
    async fn register(&self, code: &str, fridge: i64) {
        self.register_at(code, 7, fridge, None).await;
    }

    async fn register_at(
        &self,
        code: &str,
        collaborator: i64,
        fridge: i64,
        prepared_at: Option<DateTime<Utc>>,
    ) {
        self.service
            .register(RegisterContainerRequest {
                draft: ContainerDraft {
                    code: code.to_owned(),
                    collaborator_id: collaborator,
                    fridge_id: fridge,
                    prepared_at,
                },
            })
            .await
            .expect("registration succeeds");
    }

    async fn change(&self, code: &str, status: ContainerStatus) -> Result<ContainerStatus, ErrorCode> {
        self.service
            .change_status(ChangeContainerStatusRequest {
                code: code.to_owned(),
                status,
            })
            .await
            .map(|payload| payload.status)
            .map_err(|err| err.code())
    }

    async fn counters(&self) -> StatusTally {
        self.service.counters().await.expect("counters")
    }

    async fn assert_counters_match_store(&self) {
        let stored = self.repo.count_by_status().await.expect("store counts");
        assert_eq!(self.counters().await, stored);
    }
}

fn fridge(id: i64) -> FridgeId {
    FridgeId::new(id).expect("valid fridge id")
}

#[fixture]
fn harness() -> Harness {
    let repo = Arc::new(InMemoryContainerRepository::new());
    let oracle = FixtureTemperatureOracle::default()
        .with_readings(fridge(WARM_FRIDGE), [3.0, 6.0])
        .with_readings(fridge(COLD_FRIDGE), [1.0]);
    let service = Arc::new(ContainerLifecycleService::new(
        Arc::clone(&repo),
        Arc::new(oracle),
        Arc::new(mockable::DefaultClock),
    ));
    Harness { repo, service }
}

#[rstest]
#[tokio::test]
async fn registration_starts_prepared(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;

    let found = harness.service.find_by_code("QR1").await.expect("stored");
    assert_eq!(found.status, ContainerStatus::Prepared);
    assert_eq!(harness.counters().await.prepared, 1);
}

#[rstest]
#[tokio::test]
async fn warm_readings_expire_the_container(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;

    let outcome = harness
        .service
        .evaluate_expiration("QR1")
        .await
        .expect("evaluation");

    assert!(outcome.expired);
    let found = harness.service.find_by_code("QR1").await.expect("stored");
    assert_eq!(found.status, ContainerStatus::Expired);
    assert_eq!(
        harness.counters().await,
        StatusTally {
            prepared: 0,
            in_transit: 0,
            expired: 1,
        }
    );
}

#[rstest]
#[tokio::test]
async fn expired_containers_cannot_move(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;
    harness
        .service
        .evaluate_expiration("QR1")
        .await
        .expect("evaluation");

    let result = harness.change("QR1", ContainerStatus::InTransit).await;

    assert_eq!(result, Err(ErrorCode::InvalidTransition));
    assert_eq!(harness.counters().await.expired, 1);
}

#[rstest]
#[tokio::test]
async fn cold_readings_leave_container_alone(harness: Harness) {
    harness.register("QR1", COLD_FRIDGE).await;

    let outcome = harness
        .service
        .evaluate_expiration("QR1")
        .await
        .expect("evaluation");

    assert!(!outcome.expired);
    assert_eq!(harness.counters().await.prepared, 1);
    assert_eq!(harness.counters().await.expired, 0);
}

#[rstest]
#[tokio::test]
async fn unknown_code_is_not_found(harness: Harness) {
    let err = harness
        .service
        .find_by_code("ZZZ")
        .await
        .expect_err("nothing stored");
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = harness
        .service
        .evaluate_expiration("ZZZ")
        .await
        .expect_err("nothing stored");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn collaborator_month_query_filters_and_orders(harness: Harness) {
    let at = |month, day| {
        Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    };
    harness.register_at("QR-B", 7, 1, Some(at(3, 10))).await;
    harness.register_at("QR-A", 7, 1, Some(at(3, 2))).await;
    harness.register_at("QR-C", 7, 1, Some(at(4, 1))).await;
    harness.register_at("QR-D", 8, 1, Some(at(3, 5))).await;

    let found = harness
        .service
        .containers_for_collaborator(CollaboratorMonthRequest {
            collaborator_id: 7,
            month: 3,
            year: 2024,
        })
        .await
        .expect("query");

    let codes: Vec<_> = found.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["QR-A", "QR-B"]);

    let empty = harness
        .service
        .containers_for_collaborator(CollaboratorMonthRequest {
            collaborator_id: 7,
            month: 5,
            year: 2024,
        })
        .await
        .expect("query");
    assert!(empty.is_empty());
}

#[rstest]
#[case(ContainerStatus::Prepared)]
#[case(ContainerStatus::InTransit)]
#[tokio::test]
async fn repeating_a_status_change_is_idempotent(
    harness: Harness,
    #[case] target: ContainerStatus,
) {
    harness.register("QR1", WARM_FRIDGE).await;

    let first = harness.change("QR1", target).await;
    let after_first = harness.counters().await;
    let second = harness.change("QR1", target).await;

    assert_eq!(first, Ok(target));
    assert_eq!(second, Ok(target));
    assert_eq!(harness.counters().await, after_first);
}

#[rstest]
#[tokio::test]
async fn expiry_evaluation_is_monotonic(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;

    for _ in 0..3 {
        let outcome = harness
            .service
            .evaluate_expiration("QR1")
            .await
            .expect("evaluation");
        assert!(outcome.expired);
    }
    // Moving to a cold fridge never revives an expired container.
    harness
        .service
        .reassign_fridge(ReassignFridgeRequest {
            code: "QR1".to_owned(),
            fridge_id: COLD_FRIDGE,
        })
        .await
        .expect("reassign");
    let outcome = harness
        .service
        .evaluate_expiration("QR1")
        .await
        .expect("evaluation");

    assert!(outcome.expired);
    assert_eq!(harness.counters().await.expired, 1);
}

#[rstest]
#[tokio::test]
async fn counters_track_store_through_mixed_operations(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;
    harness.register("QR2", COLD_FRIDGE).await;
    harness.register("QR3", WARM_FRIDGE).await;
    harness.register("QR4", COLD_FRIDGE).await;
    harness.assert_counters_match_store().await;

    let _ = harness.change("QR1", ContainerStatus::InTransit).await;
    let _ = harness.change("QR2", ContainerStatus::InTransit).await;
    harness.assert_counters_match_store().await;

    let _ = harness.change("QR1", ContainerStatus::Expired).await;
    let _ = harness.change("QR2", ContainerStatus::Expired).await;
    let _ = harness.service.evaluate_expiration("QR3").await;
    let _ = harness.service.evaluate_expiration("QR4").await;
    harness.assert_counters_match_store().await;

    let _ = harness.change("QR1", ContainerStatus::Prepared).await;
    let _ = harness.change("QR2", ContainerStatus::Prepared).await;
    harness.assert_counters_match_store().await;

    assert_eq!(
        harness.counters().await,
        StatusTally {
            prepared: 1,
            in_transit: 1,
            expired: 2,
        }
    );

    harness.service.reset_all().await.expect("reset");
    harness.assert_counters_match_store().await;
    assert_eq!(harness.counters().await.total(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_expiry_counts_once(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;
    harness
        .change("QR1", ContainerStatus::InTransit)
        .await
        .expect("in transit");

    let mut tasks = Vec::new();
    for attempt in 0..16 {
        let service = Arc::clone(&harness.service);
        tasks.push(tokio::spawn(async move {
            if attempt % 2 == 0 {
                service.evaluate_expiration("QR1").await.map(|o| o.expired)
            } else {
                service
                    .change_status(ChangeContainerStatusRequest {
                        code: "QR1".to_owned(),
                        status: ContainerStatus::Expired,
                    })
                    .await
                    .map(|payload| payload.status == ContainerStatus::Expired)
            }
        }));
    }
    for task in tasks {
        assert!(task.await.expect("task joins").expect("operation succeeds"));
    }

    assert_eq!(
        harness.counters().await,
        StatusTally {
            prepared: 0,
            in_transit: 0,
            expired: 1,
        }
    );
    harness.assert_counters_match_store().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counter_snapshots_stay_whole_during_transitions(harness: Harness) {
    const CONTAINERS: usize = 64;
    for n in 0..CONTAINERS {
        harness.register(&format!("QR{n}"), COLD_FRIDGE).await;
    }

    let writer = {
        let service = Arc::clone(&harness.service);
        tokio::spawn(async move {
            for n in 0..CONTAINERS {
                service
                    .change_status(ChangeContainerStatusRequest {
                        code: format!("QR{n}"),
                        status: ContainerStatus::InTransit,
                    })
                    .await
                    .expect("in transit");
            }
        })
    };
    while !writer.is_finished() {
        let tally = harness.counters().await;
        assert_eq!(tally.total(), CONTAINERS as i64);
        assert_eq!(tally.expired, 0);
    }
    writer.await.expect("writer joins");

    assert_eq!(harness.counters().await.in_transit, CONTAINERS as i64);
    harness.assert_counters_match_store().await;
}

#[rstest]
#[tokio::test]
async fn hydration_rebuilds_counters_from_store(harness: Harness) {
    harness.register("QR1", WARM_FRIDGE).await;
    harness.register("QR2", COLD_FRIDGE).await;
    harness
        .service
        .evaluate_expiration("QR1")
        .await
        .expect("evaluation");

    let restarted = ContainerLifecycleService::new(
        Arc::clone(&harness.repo),
        Arc::new(FixtureTemperatureOracle::default()),
        Arc::new(mockable::DefaultClock),
    );
    let tally = restarted.hydrate_counters().await.expect("hydrate");

    assert_eq!(tally, harness.counters().await);
}
