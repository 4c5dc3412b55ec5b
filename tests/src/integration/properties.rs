//! # Loader Properties
//!
//! Batch-level guarantees checked across the loader, the shipped adapters
//! and real secp256k1 / XChaCha20-Poly1305 material:
//!
//! 1. **Order**: output follows batch position whatever the lookup order
//! 2. **Bounded I/O**: at most two `get_many` calls per batch
//! 3. **Isolation**: a bad item never fails its neighbours
//! 4. **Round trips**: public and shared files come back byte-identical
//! 5. **Idempotent pass-through**: re-feeding an intent yields the same file
//! 6. **Systemic failure**: a keeper failure rejects the batch

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rand::seq::SliceRandom;
    use rand::Rng;

    use kl_file_loader::{
        DropReason, FetchRound, FileLoaderApi, LoadOutcome, LoaderError, PipelineStage,
    };
    use shared_types::{FileKind, TransactionInput};

    use crate::fixtures::{
        noise, permission_directive, public_directive, CountingKeeper, JitteryDirectory, Party,
        ScriptedKeeper, World,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// What a generated batch item should turn into.
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Expect {
        Public,
        Shared,
        Dropped,
    }

    /// A world with a registered sender and recipient.
    struct Scenario {
        world: World,
        alice: Party,
        bob: Party,
    }

    impl Scenario {
        fn new() -> Self {
            let world = World::new();
            let alice = Party::new("alice");
            let bob = Party::new("bob");
            world.register(&alice, true);
            world.register(&bob, false);
            Self { world, alice, bob }
        }

        /// Random mixed batch with the expected outcome of each item.
        async fn mixed_batch(&self, len: usize) -> (Vec<TransactionInput>, Vec<(Expect, Vec<u8>)>) {
            let mut rng = rand::thread_rng();
            let eve = Party::new("eve");
            let mut batch = Vec::with_capacity(len);
            let mut expected = Vec::with_capacity(len);

            for i in 0..len {
                let txid = format!("tx-{i}");
                let body = format!("file body {i}").into_bytes();
                let (tx, expect) = match rng.gen_range(0..5) {
                    0 => (self.world.public(&txid, &body).await, Expect::Public),
                    1 => (
                        self.world
                            .share(&txid, &self.alice, &self.bob, &body, rng.gen())
                            .await,
                        Expect::Shared,
                    ),
                    2 => (public_directive(&txid, "absent"), Expect::Dropped),
                    3 => {
                        // Sealed under a secret the loader cannot derive.
                        let payload = kl_file_loader::XChaChaCipher
                            .encrypt(b"pointer", eve.secret_with(&self.bob).as_bytes())
                            .unwrap();
                        (
                            permission_directive(&txid, &self.alice, &self.bob, &payload),
                            Expect::Dropped,
                        )
                    }
                    _ => (noise(&txid), Expect::Dropped),
                };
                batch.push(TransactionInput::Raw(tx));
                expected.push((expect, body));
            }

            (batch, expected)
        }
    }

    // =============================================================================
    // ORDER AND BOUNDED I/O
    // =============================================================================

    #[tokio::test]
    async fn test_mixed_batches_keep_order_and_two_calls() {
        for _ in 0..5 {
            let scenario = Scenario::new();
            let (batch, expected) = scenario.mixed_batch(40).await;

            let keeper = Arc::new(CountingKeeper::new(scenario.world.keeper.clone()));
            let directory = JitteryDirectory::new(
                scenario.world.directory.clone(),
                Duration::from_millis(5),
            );
            let service = scenario
                .world
                .builder()
                .keeper(keeper.clone())
                .identity(Arc::new(directory))
                .build()
                .unwrap();

            let files = service.load(batch).await.unwrap();

            let want: Vec<(usize, FileKind, Vec<u8>)> = expected
                .iter()
                .enumerate()
                .filter_map(|(i, (expect, body))| match expect {
                    Expect::Public => Some((i, FileKind::Public, body.clone())),
                    Expect::Shared => Some((i, FileKind::SharedFile, body.clone())),
                    Expect::Dropped => None,
                })
                .collect();
            let got: Vec<(usize, FileKind, Vec<u8>)> = files
                .into_iter()
                .map(|f| (f.original_index, f.kind, f.data))
                .collect();

            assert_eq!(got, want);
            assert!(keeper.calls() <= 2);
        }
    }

    #[tokio::test]
    async fn test_shuffled_batch_reports_in_batch_order() {
        let scenario = Scenario::new();
        let mut batch = Vec::new();
        for i in 0..12 {
            let txid = format!("tx-{i}");
            let tx = if i % 2 == 0 {
                scenario.world.public(&txid, txid.as_bytes()).await
            } else {
                scenario
                    .world
                    .share(&txid, &scenario.alice, &scenario.bob, txid.as_bytes(), true)
                    .await
            };
            batch.push(TransactionInput::Raw(tx));
        }
        batch.shuffle(&mut rand::thread_rng());
        let txids: Vec<String> = batch
            .iter()
            .map(|input| match input {
                TransactionInput::Raw(tx) => tx.txid.clone(),
                TransactionInput::Parsed(intent) => intent.txid.clone(),
            })
            .collect();

        let report = scenario.world.service().run(batch).await.unwrap();

        let indices: Vec<usize> = report
            .outcomes()
            .iter()
            .map(LoadOutcome::original_index)
            .collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));

        for file in report.into_files() {
            assert_eq!(file.intent.txid, txids[file.original_index]);
            assert_eq!(file.data, txids[file.original_index].as_bytes());
        }
    }

    #[tokio::test]
    async fn test_round_sizes() {
        let scenario = Scenario::new();
        let batch: Vec<TransactionInput> = vec![
            scenario.world.public("tx-0", b"a").await.into(),
            scenario
                .world
                .share("tx-1", &scenario.alice, &scenario.bob, b"b", false)
                .await
                .into(),
            scenario
                .world
                .share("tx-2", &scenario.alice, &scenario.bob, b"c", true)
                .await
                .into(),
        ];
        let keeper = Arc::new(CountingKeeper::new(scenario.world.keeper.clone()));
        let service = scenario
            .world
            .builder()
            .keeper(keeper.clone())
            .identity(scenario.world.directory.clone())
            .build()
            .unwrap();

        let report = service.run(batch).await.unwrap();

        // One public key plus two pointers, then two shared files.
        assert_eq!(keeper.keys_per_call(), vec![3, 2]);
        assert_eq!(report.fetch_rounds(), 2);
        assert_eq!(report.count_of(FileKind::Permission), 2);
        assert_eq!(report.count_of(FileKind::SharedFile), 2);
    }

    #[tokio::test]
    async fn test_public_only_batch_makes_one_call() {
        let scenario = Scenario::new();
        let batch: Vec<TransactionInput> = vec![
            scenario.world.public("tx-0", b"a").await.into(),
            scenario.world.public("tx-1", b"b").await.into(),
        ];
        let keeper = Arc::new(CountingKeeper::new(scenario.world.keeper.clone()));
        let service = scenario.world.builder().keeper(keeper.clone()).build().unwrap();

        let files = service.load(batch).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(keeper.calls(), 1);
    }

    // =============================================================================
    // ISOLATION
    // =============================================================================

    #[tokio::test]
    async fn test_bad_items_are_isolated() {
        let scenario = Scenario::new();
        let stranger = Party::new("stranger");
        let batch: Vec<TransactionInput> = vec![
            noise("tx-0").into(),
            scenario.world.public("tx-1", b"kept").await.into(),
            permission_directive("tx-2", &scenario.alice, &stranger, b"garbage").into(),
            public_directive("tx-3", "absent").into(),
            scenario
                .world
                .share("tx-4", &scenario.alice, &scenario.bob, b"also kept", true)
                .await
                .into(),
        ];

        let report = scenario.world.service().run(batch).await.unwrap();

        let dropped: Vec<(usize, PipelineStage, DropReason)> = report
            .dropped()
            .map(|d| (d.original_index, d.stage, d.reason))
            .collect();
        assert_eq!(
            dropped,
            vec![
                (0, PipelineStage::Parse, DropReason::Unparseable),
                (2, PipelineStage::Resolve, DropReason::MissingSharedSecret),
                (3, PipelineStage::FetchPrimary, DropReason::NotFound),
            ]
        );
        let files = report.into_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].data, b"kept");
        assert_eq!(files[1].data, b"also kept");
    }

    // =============================================================================
    // ROUND TRIPS
    // =============================================================================

    #[tokio::test]
    async fn test_large_shared_file_round_trip() {
        let scenario = Scenario::new();
        let mut body = vec![0u8; 256 * 1024];
        rand::thread_rng().fill(&mut body[..]);
        let tx = scenario
            .world
            .share("tx-0", &scenario.alice, &scenario.bob, &body, true)
            .await;

        let files = scenario.world.service().load(vec![tx.into()]).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind, FileKind::SharedFile);
        assert_eq!(files[0].data, body);
    }

    #[tokio::test]
    async fn test_recipient_can_load_with_own_key() {
        // Loader run by the recipient: only bob's private key is known.
        let world = World::new();
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        world.register(&alice, false);
        world.register(&bob, true);
        let tx = world.share("tx-0", &alice, &bob, b"for bob", false).await;

        let files = world.service().load(vec![tx.into()]).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].data, b"for bob");
    }

    #[tokio::test]
    async fn test_loaded_file_json_round_trip() {
        let scenario = Scenario::new();
        let tx = scenario
            .world
            .share("tx-0", &scenario.alice, &scenario.bob, b"json", true)
            .await;
        let file = scenario
            .world
            .service()
            .load(vec![tx.into()])
            .await
            .unwrap()
            .remove(0);

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["kind"], "sharedfile");
        assert_eq!(json["data"], hex::encode(b"json"));

        let back: shared_types::LoadedFile = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }

    // =============================================================================
    // IDEMPOTENT PASS-THROUGH
    // =============================================================================

    #[tokio::test]
    async fn test_reprocessing_intents_yields_same_files() {
        let scenario = Scenario::new();
        let batch: Vec<TransactionInput> = vec![
            scenario.world.public("tx-0", b"public").await.into(),
            scenario
                .world
                .share("tx-1", &scenario.alice, &scenario.bob, b"shared", true)
                .await
                .into(),
        ];
        let service = scenario.world.service();

        let first = service.load(batch).await.unwrap();
        let refeed: Vec<TransactionInput> = first
            .iter()
            .map(|f| TransactionInput::Parsed(f.intent.clone()))
            .collect();
        let second = service.load(refeed).await.unwrap();

        assert_eq!(second, first);
    }

    // =============================================================================
    // SYSTEMIC FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_keeper_failure_in_either_round_rejects_batch() {
        for (fail_on, round) in [(0, FetchRound::Primary), (1, FetchRound::Shared)] {
            let scenario = Scenario::new();
            let batch: Vec<TransactionInput> = vec![
                scenario.world.public("tx-0", b"a").await.into(),
                scenario
                    .world
                    .share("tx-1", &scenario.alice, &scenario.bob, b"b", false)
                    .await
                    .into(),
            ];
            let keeper = ScriptedKeeper::new(scenario.world.keeper.clone(), vec![fail_on]);
            let service = scenario
                .world
                .builder()
                .keeper(Arc::new(keeper))
                .identity(scenario.world.directory.clone())
                .build()
                .unwrap();

            match service.run(batch).await {
                Err(LoaderError::Storage { round: failed, .. }) => assert_eq!(failed, round),
                other => panic!("expected storage failure in {round}, got {other:?}"),
            }
        }
    }
}
