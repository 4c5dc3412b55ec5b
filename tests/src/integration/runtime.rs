//! # Runtime Flows
//!
//! The runtime container wired with the shipped adapters, fed JSON lines.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use kl_file_loader::{KeeperClient, LoaderConfig};
    use kl_runtime::adapters::{Fixture, IdentityEntry};
    use kl_runtime::{LoaderContainer, LoaderRuntime, RuntimeConfig};
    use shared_types::LoadedFile;

    use crate::fixtures::{Party, World};

    fn identity(party: &Party, with_private: bool) -> IdentityEntry {
        IdentityEntry {
            address: party.address.clone(),
            public_key: party.keys.public_key(),
            private_key: with_private.then(|| party.keys.to_bytes().to_vec()),
        }
    }

    #[tokio::test]
    async fn test_feed_of_mixed_lines() {
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        let container = LoaderContainer::new(RuntimeConfig::default()).unwrap();
        let report = container
            .seed(Fixture {
                keeper: vec![],
                identities: vec![identity(&alice, true), identity(&bob, false)],
            })
            .await
            .unwrap();
        assert_eq!(report.identities, 2);

        // Publish through the container's own stores.
        let world = World {
            keeper: container.keeper.clone(),
            directory: container.directory.clone(),
        };
        let public = world.public("tx-0", b"hello").await;
        let shared = world.share("tx-1", &alice, &bob, b"secret hello", true).await;
        let missing = crate::fixtures::public_directive("tx-2", "absent");

        let feed = format!(
            "{}\n{}\n",
            serde_json::to_string(&public).unwrap(),
            serde_json::to_string(&vec![missing, shared]).unwrap(),
        );
        let runtime = LoaderRuntime::new(container);
        let mut out = Vec::new();
        let summary = timeout(Duration::from_secs(5), runtime.run(feed.as_bytes(), &mut out))
            .await
            .unwrap()
            .unwrap();
        runtime.shutdown();

        assert_eq!(summary.feed.units, 2);
        assert_eq!(summary.stage.errors, 0);
        let files: Vec<LoadedFile> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].data, b"hello");
        assert_eq!(files[1].data, b"secret hello");
        // Index within its own unit.
        assert_eq!(files[1].original_index, 1);
    }

    #[tokio::test]
    async fn test_container_honours_network() {
        let config = RuntimeConfig {
            loader: LoaderConfig {
                network: "testnet".into(),
                ..LoaderConfig::default()
            },
            ..RuntimeConfig::default()
        };
        let container = LoaderContainer::new(config).unwrap();
        let key = container.keeper.put(b"payload".to_vec()).await.unwrap();
        let mut tx = crate::fixtures::public_directive("tx-0", &key);
        tx.network = "testnet".into();
        let mainnet = crate::fixtures::public_directive("tx-1", &key);

        let feed = format!(
            "{}\n{}\n",
            serde_json::to_string(&mainnet).unwrap(),
            serde_json::to_string(&tx).unwrap()
        );
        let runtime = LoaderRuntime::new(container);
        let mut out = Vec::new();
        let summary = timeout(Duration::from_secs(5), runtime.run(feed.as_bytes(), &mut out))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.feed.units, 2);
        assert_eq!(summary.output.files, 1);
    }
}
