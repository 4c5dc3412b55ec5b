//! # Loader Container
//!
//! Owns the shared infrastructure and the wired loader.
//!
//! ```text
//! InMemoryKeeper ─────────┐
//! InMemoryIdentityDirectory ──→ FileLoaderService ──→ MeteredLoader ──→ LoaderStage
//! shipped codecs/crypto ──┘                                                  │
//!                                                    InMemoryEventBus ←──────┘
//! ```

use crate::adapters::{Fixture, FixtureError, MeteredLoader, SeedReport};
use crate::container::config::RuntimeConfig;
use kl_file_loader::{
    BincodePermissionCodec, EnvelopeDecoder, FileLoaderService, InMemoryIdentityDirectory,
    InMemoryKeeper, LoaderError, LoaderStage, Secp256k1Agreement, StageHandle, XChaChaCipher,
};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use tracing::info;

/// Wired loader and the stores behind it.
pub struct LoaderContainer {
    /// Configuration the container was built from.
    pub config: RuntimeConfig,
    /// Keeper backing the loader.
    pub keeper: Arc<InMemoryKeeper>,
    /// Address book backing identity resolution.
    pub directory: Arc<InMemoryIdentityDirectory>,
    /// Notification bus.
    pub bus: Arc<InMemoryEventBus>,
    /// Loader with metrics.
    pub loader: Arc<MeteredLoader<FileLoaderService>>,
}

impl LoaderContainer {
    /// Wire the loader with the shipped adapters.
    pub fn new(config: RuntimeConfig) -> Result<Self, LoaderError> {
        let keeper = Arc::new(InMemoryKeeper::new());
        let directory = Arc::new(InMemoryIdentityDirectory::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let service = FileLoaderService::builder()
            .decoder(Arc::new(EnvelopeDecoder))
            .identity(directory.clone())
            .keeper(keeper.clone())
            .codec(Arc::new(BincodePermissionCodec))
            .cipher(Arc::new(XChaChaCipher))
            .agreement(Arc::new(Secp256k1Agreement))
            .config(config.loader.clone())
            .build()?;

        info!(
            network = %config.loader.network,
            prefix = %String::from_utf8_lossy(&config.loader.prefix),
            "Loader wired"
        );

        Ok(Self {
            config,
            keeper,
            directory,
            bus,
            loader: Arc::new(MeteredLoader::new(service)),
        })
    }

    /// Seed the keeper and directory.
    pub async fn seed(&self, fixture: Fixture) -> Result<SeedReport, FixtureError> {
        let report = fixture.seed(&self.keeper, &self.directory).await?;
        info!(
            blobs = report.keys.len(),
            identities = report.identities,
            "Fixture loaded"
        );
        Ok(report)
    }

    /// Seed from `config.fixture_path`, if set.
    pub async fn seed_from_config(&self) -> Result<Option<SeedReport>, FixtureError> {
        match &self.config.fixture_path {
            Some(path) => {
                let fixture = Fixture::from_path(path).await?;
                self.seed(fixture).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Spawn a stage over the loader and the bus.
    pub fn spawn_stage(&self) -> Result<StageHandle, LoaderError> {
        LoaderStage::spawn(self.loader.clone(), self.bus.clone(), self.config.stage)
    }
}
