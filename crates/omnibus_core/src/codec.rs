//! # Persistence Codec
//!
//! Bundles persist as a versioned record: an ordered list of channel
//! records, each a kind discriminator plus an opaque kind-specific payload,
//! and an optional facade reference by stable block name.
//!
//! Channel payloads are encoded and decoded by externally registered
//! [`ChannelCodec`]s, so new channel kinds register independently of the
//! core. Decoding is best-effort: a channel record that cannot be
//! reconstructed costs exactly that channel, an unresolvable facade decodes
//! as no facade, and nothing aborts the host simulation. A fully corrupted
//! record degrades to a channel-less bundle.

use crate::bundle::{Bundle, Facade};
use crate::channel::{Channel, ChannelKind};
use crate::error::{CodecError, CodecResult};
use omnibus_shared::constants::RECORD_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// One persisted channel: discriminator plus kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Kind discriminator, see [`ChannelKind::name`].
    pub kind: String,
    /// Payload in whatever encoding the kind's codec chose.
    pub payload: Vec<u8>,
}

/// Persisted facade reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeRecord {
    /// Stable block-type identifier.
    pub block_id: String,
    /// Variant index within the block type.
    pub variant: u16,
}

/// Versioned persisted form of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRecord {
    /// Format version, see [`RECORD_VERSION`].
    pub version: u16,
    /// Channel records in insertion order.
    pub channels: Vec<ChannelRecord>,
    /// Facade, if one was set.
    pub facade: Option<FacadeRecord>,
}

/// Encode/decode pair for one channel kind.
///
/// The record version is passed through on decode so a codec can keep
/// reading records written by earlier releases.
pub trait ChannelCodec: Send + Sync {
    /// Encodes a channel's state into its payload bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel's state cannot be represented; the
    /// caller skips the channel and keeps the rest of the record.
    fn encode(&self, channel: &dyn Channel) -> CodecResult<Vec<u8>>;

    /// Reconstructs a channel from payload bytes written under `version`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed payloads or unsupported versions; the
    /// caller skips the channel and keeps the rest of the record.
    fn decode(&self, payload: &[u8], version: u16) -> CodecResult<Box<dyn Channel>>;
}

/// Externally populated registry: per-kind channel codecs plus the stable
/// block-name table used to resolve facade identifiers.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<ChannelKind, Box<dyn ChannelCodec>>,
    blocks_by_name: HashMap<String, u16>,
    names_by_block: HashMap<u16, String>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the codec for one channel kind, replacing any previous one.
    pub fn register_channel(&mut self, kind: ChannelKind, codec: Box<dyn ChannelCodec>) {
        self.codecs.insert(kind, codec);
    }

    /// Registers a stable name for a block type.
    pub fn register_block(&mut self, name: impl Into<String>, block: u16) {
        let name = name.into();
        self.names_by_block.insert(block, name.clone());
        self.blocks_by_name.insert(name, block);
    }

    /// Resolves a stable block name, if registered.
    #[must_use]
    pub fn resolve_block(&self, name: &str) -> Option<u16> {
        self.blocks_by_name.get(name).copied()
    }

    /// The stable name of a block type, if registered.
    #[must_use]
    pub fn block_name(&self, block: u16) -> Option<&str> {
        self.names_by_block.get(&block).map(String::as_str)
    }

    fn codec(&self, kind: ChannelKind) -> Option<&dyn ChannelCodec> {
        self.codecs.get(&kind).map(Box::as_ref)
    }
}

/// Encodes a bundle into its persisted record.
///
/// Channels without a registered codec, or whose codec fails, are skipped
/// with a warning; likewise a facade whose block has no registered name is
/// persisted as no facade.
#[must_use]
pub fn encode_bundle(bundle: &Bundle, registry: &CodecRegistry) -> BundleRecord {
    let mut channels = Vec::with_capacity(bundle.channels().len());
    for channel in bundle.channels() {
        let kind = channel.kind();
        let Some(codec) = registry.codec(kind) else {
            warn!(kind = kind.name(), "no codec registered, channel not persisted");
            continue;
        };
        match codec.encode(channel.as_ref()) {
            Ok(payload) => channels.push(ChannelRecord {
                kind: kind.name().to_owned(),
                payload,
            }),
            Err(err) => warn!(kind = kind.name(), %err, "skipping unencodable channel"),
        }
    }

    let facade = bundle.facade().and_then(|f| match registry.block_name(f.block) {
        Some(name) => Some(FacadeRecord {
            block_id: name.to_owned(),
            variant: f.variant,
        }),
        None => {
            warn!(block = f.block, "facade block has no registered name, dropped");
            None
        }
    });

    BundleRecord {
        version: RECORD_VERSION,
        channels,
        facade,
    }
}

/// Reconstructs a bundle's channel set and facade from a record.
///
/// Best-effort: every channel record that fails to decode is skipped with a
/// warning, duplicate kinds keep the first occurrence, and an unresolvable
/// facade decodes as no facade. Runs on both sides; a replica accepts
/// replicated state even though it refuses local structural mutation.
pub fn decode_bundle(bundle: &mut Bundle, record: &BundleRecord, registry: &CodecRegistry) {
    let mut channels: Vec<Box<dyn Channel>> = Vec::new();
    let mut seen = [false; ChannelKind::ALL.len()];
    for channel_record in &record.channels {
        match decode_channel(channel_record, record.version, registry) {
            Ok(channel) => {
                let kind = channel.kind();
                if seen[kind.index()] {
                    warn!(kind = kind.name(), "duplicate channel kind in record, skipped");
                    continue;
                }
                seen[kind.index()] = true;
                channels.push(channel);
            }
            Err(err) => {
                warn!(
                    kind = channel_record.kind.as_str(),
                    %err,
                    "skipping malformed channel record"
                );
            }
        }
    }

    let facade = record.facade.as_ref().and_then(|f| {
        match registry.resolve_block(&f.block_id) {
            Some(block) => Some(Facade::new(block, f.variant)),
            None => {
                warn!(
                    block = f.block_id.as_str(),
                    "unresolved facade block, decoding without facade"
                );
                None
            }
        }
    });

    bundle.apply_decoded(channels, facade);
}

fn decode_channel(
    record: &ChannelRecord,
    version: u16,
    registry: &CodecRegistry,
) -> CodecResult<Box<dyn Channel>> {
    let kind = ChannelKind::from_name(&record.kind)
        .ok_or_else(|| CodecError::UnknownChannelKind(record.kind.clone()))?;
    let codec = registry
        .codec(kind)
        .ok_or_else(|| CodecError::UnknownChannelKind(record.kind.clone()))?;
    codec.decode(&record.payload, version)
}
