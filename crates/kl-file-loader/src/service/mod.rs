//! # File Loader Service
//!
//! The orchestrator implementing `FileLoaderApi`.
//!
//! ## Per-intent state machine
//!
//! ```text
//! Parsed ─→ IdentityResolved ─→ KeyClassified ──fetch 1──→ Done (public)
//!                                   │                  └──→ PermissionRecovered ──fetch 2──→ Done (sharedfile)
//!                                   └──→ Dropped                       └──→ Dropped
//! ```
//!
//! The keeper is called at most twice per run: once for public files and
//! sealed permission records, once for the files those records point to.
//! Either round is skipped when it has no keys.
//!
//! Soft failures become `LoadOutcome::Dropped`. Only a keeper failure
//! rejects the run.

mod fetcher;
mod identity;
mod parser;
mod shared_key;

pub use fetcher::BatchFetcher;
pub use identity::IdentityResolver;
pub use parser::{ParsedBatch, TransactionParser};
pub use shared_key::derive_shared_secret;

use crate::domain::entities::{FetchResult, ResolvedParties, SharedSecret};
use crate::domain::errors::LoaderError;
use crate::domain::outcome::{DropReason, DroppedItem, LoadOutcome, LoadReport, PipelineStage};
use crate::domain::value_objects::{FetchRound, LoaderConfig};
use crate::ports::inbound::FileLoaderApi;
use crate::ports::outbound::{
    IdentityLookup, KeeperClient, KeyAgreement, PermissionCodec, SymmetricCipher,
    TransactionDecoder,
};
use async_trait::async_trait;
use shared_types::entities::{
    FileKind, LoadedFile, ParsedIntent, PermissionRecord, TransactionInput, TxType,
};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Collaborators of the file loader.
pub struct FileLoaderDependencies {
    /// Directive decoder.
    pub decoder: Arc<dyn TransactionDecoder>,
    /// Identity directory. Without one only public intents can load.
    pub identity: Option<Arc<dyn IdentityLookup>>,
    /// Keeper client.
    pub keeper: Arc<dyn KeeperClient>,
    /// Permission record codec.
    pub codec: Arc<dyn PermissionCodec>,
    /// Cipher for pointers and shared files.
    pub cipher: Arc<dyn SymmetricCipher>,
    /// Key agreement primitive.
    pub agreement: Arc<dyn KeyAgreement>,
}

/// The File Loader Service.
///
/// Holds no per-batch state; concurrent `run` calls are independent.
pub struct FileLoaderService {
    parser: TransactionParser,
    resolver: IdentityResolver,
    fetcher: BatchFetcher,
    codec: Arc<dyn PermissionCodec>,
    cipher: Arc<dyn SymmetricCipher>,
    agreement: Arc<dyn KeyAgreement>,
    config: LoaderConfig,
}

/// Permission intent whose pointer opened.
struct PendingPermission {
    intent: ParsedIntent,
    secret: SharedSecret,
    pointer: String,
}

/// Permission intent whose record was recovered.
struct RecoveredPermission {
    intent: ParsedIntent,
    record: PermissionRecord,
}

impl FileLoaderService {
    /// Create a service from its dependencies.
    ///
    /// # Errors
    /// * `LoaderError::InvalidConfig` - `config` does not validate
    pub fn new(deps: FileLoaderDependencies, config: LoaderConfig) -> Result<Self, LoaderError> {
        config.validate()?;
        Ok(Self {
            parser: TransactionParser::new(deps.decoder, &config),
            resolver: IdentityResolver::new(deps.identity),
            fetcher: BatchFetcher::new(deps.keeper),
            codec: deps.codec,
            cipher: deps.cipher,
            agreement: deps.agreement,
            config,
        })
    }

    /// Start building a service.
    pub fn builder() -> FileLoaderBuilder {
        FileLoaderBuilder::default()
    }

    /// Configuration in use.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    async fn run_batch(&self, batch: Vec<TransactionInput>) -> Result<LoadReport, LoaderError> {
        let ParsedBatch { intents, dropped } = self.parser.parse_batch(batch);
        let mut outcomes: Vec<LoadOutcome> =
            dropped.into_iter().map(LoadOutcome::Dropped).collect();
        let mut fetch_rounds = 0u8;

        // 1. Resolve identities for the whole batch at once.
        let parties = self.resolver.resolve(&intents).await;

        // 2. Classify; permission intents must yield a readable pointer.
        let mut public: Vec<(ParsedIntent, String)> = Vec::new();
        let mut pending: Vec<PendingPermission> = Vec::new();
        for (intent, parties) in intents.into_iter().zip(parties) {
            match intent.tx_type {
                TxType::Public => match String::from_utf8(intent.payload.clone()) {
                    Ok(key) => public.push((intent, key)),
                    Err(_) => outcomes.push(dropped_at(
                        &intent,
                        PipelineStage::DecryptPayload,
                        DropReason::MalformedPointer,
                    )),
                },
                TxType::Permission => match self.open_pointer(intent, &parties) {
                    Ok(p) => pending.push(p),
                    Err(item) => outcomes.push(LoadOutcome::Dropped(item)),
                },
            }
        }

        // 3. First round: public keys, then permission pointers.
        let primary_keys: Vec<String> = public
            .iter()
            .map(|(_, key)| key.clone())
            .chain(pending.iter().map(|p| p.pointer.clone()))
            .collect();
        let primary_results = if primary_keys.is_empty() {
            Vec::new()
        } else {
            fetch_rounds += 1;
            self.fetch_round(FetchRound::Primary, &primary_keys).await?
        };
        let mut primary = primary_results.into_iter();

        // 4. Public files.
        for ((intent, _), result) in public.into_iter().zip(primary.by_ref()) {
            match result.into_bytes() {
                Some(data) => outcomes.push(LoadOutcome::Loaded(LoadedFile {
                    original_index: intent.original_index,
                    kind: FileKind::Public,
                    data,
                    intent,
                    permission: None,
                })),
                None => outcomes.push(dropped_at(
                    &intent,
                    PipelineStage::FetchPrimary,
                    DropReason::NotFound,
                )),
            }
        }

        // 5. Permission records.
        let mut recovered: Vec<RecoveredPermission> = Vec::new();
        for (pending, result) in pending.into_iter().zip(primary) {
            let Some(sealed) = result.into_bytes() else {
                outcomes.push(dropped_at(
                    &pending.intent,
                    PipelineStage::FetchPrimary,
                    DropReason::NotFound,
                ));
                continue;
            };
            match self.codec.recover(&sealed, &pending.secret) {
                Ok(record) => {
                    outcomes.push(LoadOutcome::PermissionRecovered(LoadedFile {
                        original_index: pending.intent.original_index,
                        kind: FileKind::Permission,
                        data: sealed,
                        intent: pending.intent.clone(),
                        permission: Some(record.clone()),
                    }));
                    recovered.push(RecoveredPermission {
                        intent: pending.intent,
                        record,
                    });
                }
                Err(e) => {
                    debug!(index = pending.intent.original_index, error = %e, "Permission record rejected");
                    outcomes.push(dropped_at(
                        &pending.intent,
                        PipelineStage::Recover,
                        DropReason::PermissionRecoveryFailed,
                    ));
                }
            }
        }

        // 6. Second round, only when a record was recovered.
        if !recovered.is_empty() {
            let shared_keys: Vec<String> = recovered
                .iter()
                .map(|r| r.record.file_key().to_string())
                .collect();
            fetch_rounds += 1;
            let shared = self.fetch_round(FetchRound::Shared, &shared_keys).await?;

            // 7. Shared files.
            for (item, result) in recovered.into_iter().zip(shared) {
                outcomes.push(self.finish_shared(item, result.into_bytes()));
            }
        }

        // 8. Order by batch position.
        let report = LoadReport::new(outcomes, fetch_rounds);
        for item in report.dropped() {
            debug!(
                index = item.original_index,
                stage = %item.stage,
                reason = %item.reason,
                "Item dropped"
            );
        }
        Ok(report)
    }

    /// Derive the shared secret and open the pointer of a permission intent.
    fn open_pointer(
        &self,
        intent: ParsedIntent,
        parties: &ResolvedParties,
    ) -> Result<PendingPermission, DroppedItem> {
        let index = intent.original_index;
        let secret =
            derive_shared_secret(self.agreement.as_ref(), parties.sender(), parties.recipient())
                .ok_or_else(|| {
                    DroppedItem::new(index, PipelineStage::Resolve, DropReason::MissingSharedSecret)
                })?;

        let plain = self
            .cipher
            .decrypt(&intent.payload, secret.as_bytes())
            .map_err(|e| {
                debug!(index, error = %e, "Permission pointer did not decrypt");
                DroppedItem::new(
                    index,
                    PipelineStage::DecryptPayload,
                    DropReason::PayloadDecryptFailed,
                )
            })?;

        let pointer = String::from_utf8(plain).map_err(|_| {
            DroppedItem::new(
                index,
                PipelineStage::DecryptPayload,
                DropReason::MalformedPointer,
            )
        })?;

        Ok(PendingPermission {
            intent,
            secret,
            pointer,
        })
    }

    /// Decrypt (when keyed) and wrap a shared file.
    fn finish_shared(&self, item: RecoveredPermission, fetched: Option<Vec<u8>>) -> LoadOutcome {
        let RecoveredPermission { intent, record } = item;
        let Some(bytes) = fetched else {
            return dropped_at(&intent, PipelineStage::FetchShared, DropReason::NotFound);
        };

        let data = match record.decryption_key() {
            Some(key) => match self.cipher.decrypt(&bytes, key) {
                Ok(plain) => plain,
                Err(e) => {
                    debug!(index = intent.original_index, error = %e, "Shared file did not decrypt");
                    return dropped_at(
                        &intent,
                        PipelineStage::DecryptFile,
                        DropReason::FileDecryptFailed,
                    );
                }
            },
            None => bytes,
        };

        LoadOutcome::Loaded(LoadedFile {
            original_index: intent.original_index,
            kind: FileKind::SharedFile,
            data,
            intent,
            permission: Some(record),
        })
    }

    async fn fetch_round(
        &self,
        round: FetchRound,
        keys: &[String],
    ) -> Result<Vec<FetchResult>, LoaderError> {
        self.fetcher.fetch(round, keys).await.map_err(|e| {
            warn!(%round, keys = keys.len(), error = %e, "Keeper fetch failed, rejecting batch");
            e
        })
    }
}

fn dropped_at(intent: &ParsedIntent, stage: PipelineStage, reason: DropReason) -> LoadOutcome {
    LoadOutcome::Dropped(DroppedItem::new(intent.original_index, stage, reason))
}

#[async_trait]
impl FileLoaderApi for FileLoaderService {
    async fn run(&self, batch: Vec<TransactionInput>) -> Result<LoadReport, LoaderError> {
        let batch_id = Uuid::new_v4();
        let items = batch.len();
        let span = info_span!("load_batch", %batch_id, items);

        async move {
            let report = self.run_batch(batch).await?;
            info!(
                loaded = report.loaded_count(),
                dropped = report.dropped().count(),
                fetch_rounds = report.fetch_rounds(),
                "Batch loaded"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder that checks every required collaborator is present.
#[derive(Default)]
pub struct FileLoaderBuilder {
    decoder: Option<Arc<dyn TransactionDecoder>>,
    identity: Option<Arc<dyn IdentityLookup>>,
    keeper: Option<Arc<dyn KeeperClient>>,
    codec: Option<Arc<dyn PermissionCodec>>,
    cipher: Option<Arc<dyn SymmetricCipher>>,
    agreement: Option<Arc<dyn KeyAgreement>>,
    config: LoaderConfig,
}

impl FileLoaderBuilder {
    /// Set the directive decoder.
    pub fn decoder(mut self, decoder: Arc<dyn TransactionDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Set the identity directory (optional).
    pub fn identity(mut self, identity: Arc<dyn IdentityLookup>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the keeper client.
    pub fn keeper(mut self, keeper: Arc<dyn KeeperClient>) -> Self {
        self.keeper = Some(keeper);
        self
    }

    /// Set the permission codec.
    pub fn codec(mut self, codec: Arc<dyn PermissionCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set the symmetric cipher.
    pub fn cipher(mut self, cipher: Arc<dyn SymmetricCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Set the key agreement primitive.
    pub fn agreement(mut self, agreement: Arc<dyn KeyAgreement>) -> Self {
        self.agreement = Some(agreement);
        self
    }

    /// Set the decoder configuration.
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the service.
    ///
    /// # Errors
    /// * `LoaderError::MissingCollaborator` - a required collaborator is unset
    /// * `LoaderError::InvalidConfig` - the configuration does not validate
    pub fn build(self) -> Result<FileLoaderService, LoaderError> {
        let deps = FileLoaderDependencies {
            decoder: self
                .decoder
                .ok_or(LoaderError::MissingCollaborator("decoder"))?,
            identity: self.identity,
            keeper: self
                .keeper
                .ok_or(LoaderError::MissingCollaborator("keeper"))?,
            codec: self.codec.ok_or(LoaderError::MissingCollaborator("codec"))?,
            cipher: self
                .cipher
                .ok_or(LoaderError::MissingCollaborator("cipher"))?,
            agreement: self
                .agreement
                .ok_or(LoaderError::MissingCollaborator("agreement"))?,
        };
        FileLoaderService::new(deps, self.config)
    }
}
