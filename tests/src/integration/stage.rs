//! # Stage Flows
//!
//! The stream stage over the real loader: notifications on the bus, ordered
//! forwarding, and recovery after a systemic failure.
//!
//! ## Notification Flow
//!
//! ```text
//! unit ──→ LoaderStage ──→ file:public ─┐
//!                     ├──→ file:permission ─┼──→ file (generic, every kind)
//!                     └──→ file:shared ─┘
//!                     └──→ error (rejected unit)
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use kl_file_loader::{LoaderError, LoaderStage, StageConfig, StageStats};
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LoaderEvent};
    use shared_types::{FileKind, TransactionInput};

    use crate::fixtures::{Party, ScriptedKeeper, World};

    const WAIT: Duration = Duration::from_secs(5);

    struct Setup {
        world: World,
        alice: Party,
        bob: Party,
        bus: Arc<InMemoryEventBus>,
    }

    fn setup() -> Setup {
        let world = World::new();
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        world.register(&alice, true);
        world.register(&bob, false);
        Setup {
            world,
            alice,
            bob,
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    // =============================================================================
    // NOTIFICATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_each_kind_raises_specific_then_generic_event() {
        let s = setup();
        let mut events = s.bus.subscribe(EventFilter::all());
        let stage = LoaderStage::spawn(
            Arc::new(s.world.service()),
            s.bus.clone(),
            StageConfig::default(),
        )
        .unwrap();

        let unit: Vec<TransactionInput> = vec![
            s.world.public("tx-0", b"open").await.into(),
            s.world
                .share("tx-1", &s.alice, &s.bob, b"closed", true)
                .await
                .into(),
        ];
        stage.send(unit).await.unwrap();
        let (items, _) = timeout(WAIT, stage.finish()).await.unwrap().unwrap();
        assert_eq!(items.len(), 2);

        let mut topics = Vec::new();
        while let Ok(Some(event)) = events.try_recv() {
            topics.push(event.topic());
        }
        assert_eq!(
            topics,
            vec![
                EventTopic::FilePublic,
                EventTopic::File,
                EventTopic::FilePermission,
                EventTopic::File,
                EventTopic::FileShared,
                EventTopic::File,
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_items_raise_nothing() {
        let s = setup();
        let mut events = s.bus.subscribe(EventFilter::all());
        let stage = LoaderStage::spawn(
            Arc::new(s.world.service()),
            s.bus.clone(),
            StageConfig::default(),
        )
        .unwrap();

        stage
            .send(crate::fixtures::public_directive("tx-0", "absent"))
            .await
            .unwrap();
        let (items, stats) = timeout(WAIT, stage.finish()).await.unwrap().unwrap();

        assert!(items.is_empty());
        assert_eq!(stats.units, 1);
        assert!(matches!(events.try_recv(), Ok(None)));
    }

    // =============================================================================
    // ORDERING AND FAILURE RECOVERY
    // =============================================================================

    #[tokio::test]
    async fn test_stage_survives_keeper_failure() {
        let s = setup();
        let mut errors = s.bus.subscribe(EventFilter::topics(vec![EventTopic::Error]));
        // The second unit's only fetch round fails.
        let keeper = ScriptedKeeper::new(s.world.keeper.clone(), vec![1]);
        let loader = s
            .world
            .builder()
            .keeper(Arc::new(keeper))
            .identity(s.world.directory.clone())
            .build()
            .unwrap();
        let stage =
            LoaderStage::spawn(Arc::new(loader), s.bus.clone(), StageConfig::default()).unwrap();
        let (input, output, task) = stage.into_parts();

        input.send(s.world.public("tx-a", b"first").await.into()).await.unwrap();
        input.send(s.world.public("tx-b", b"second").await.into()).await.unwrap();
        input.send(s.world.public("tx-c", b"third").await.into()).await.unwrap();
        drop(input);

        let results: Vec<_> = timeout(WAIT, output.collect::<Vec<_>>()).await.unwrap();
        let stats = task.await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().data, b"first");
        assert!(matches!(results[1], Err(LoaderError::Storage { .. })));
        assert_eq!(results[2].as_ref().unwrap().data, b"third");
        assert_eq!(
            stats,
            StageStats {
                units: 3,
                files: 2,
                errors: 1
            }
        );

        let event = timeout(WAIT, errors.recv()).await.unwrap().unwrap();
        assert!(matches!(event, LoaderEvent::Error { message } if message.contains("storage")));
    }

    #[tokio::test]
    async fn test_units_forwarded_in_arrival_order() {
        let s = setup();
        let stage = LoaderStage::spawn(
            Arc::new(s.world.service()),
            s.bus.clone(),
            StageConfig { buffer_capacity: 2 },
        )
        .unwrap();
        let sender = stage.input();
        let mut stream = stage.into_output_stream();

        let mut units = Vec::new();
        for i in 0..10 {
            let body = format!("unit {i}");
            units.push(s.world.public(&format!("tx-{i}"), body.as_bytes()).await);
        }
        let producer = tokio::spawn(async move {
            for unit in units {
                sender.send(unit.into()).await.unwrap();
            }
        });

        let mut seen = Vec::new();
        while let Some(item) = timeout(WAIT, stream.next()).await.unwrap() {
            let file = item.unwrap();
            assert_eq!(file.kind, FileKind::Public);
            seen.push(String::from_utf8(file.data).unwrap());
        }
        producer.await.unwrap();

        let want: Vec<String> = (0..10).map(|i| format!("unit {i}")).collect();
        assert_eq!(seen, want);
    }
}
