//! Creation requests: decoding and validation.
//!
//! A request arrives in its raw argument form: parallel token lists, share
//! strings and an amount string. [`validate`] turns it into a
//! [`CreationPlan`] or reports the first problem, in a fixed order:
//!
//! 1. decode every share, then the initial amount
//! 2. recipients present, assets present, token lists of equal length
//! 3. no asset configured twice
//! 4. shares valid (no zero share, total exactly 10000 bps)
//! 5. initial amount at or above the configured minimum
//!
//! Nothing here touches funds or tickets.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use fundsplit_ledger::{parse_share, validate_shares};
use fundsplit_tickets::EventMetadata;
use fundsplit_types::{Address, Amount, AssetDescriptor, ReceiverPath};

use crate::error::{SplitterError, ValidationError};

/// Arguments of a create-splitter call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSplitterRequest {
    #[serde(default)]
    pub token_addresses: Vec<Address>,
    #[serde(default)]
    pub token_names: Vec<String>,
    #[serde(default)]
    pub receiver_paths: Vec<ReceiverPath>,
    #[serde(default)]
    pub metadata: EventMetadata,
    /// Recipient → share in basis points, as text.
    #[serde(default)]
    pub recipients: BTreeMap<Address, String>,
    pub init_amount: String,
}

impl CreateSplitterRequest {
    pub fn new<'a>(
        assets: &[AssetDescriptor],
        recipients: impl IntoIterator<Item = (Address, &'a str)>,
        init_amount: &str,
    ) -> Self {
        Self {
            token_addresses: assets.iter().map(|a| a.contract_address).collect(),
            token_names: assets.iter().map(|a| a.contract_name.clone()).collect(),
            receiver_paths: assets.iter().map(|a| a.receiver_path.clone()).collect(),
            metadata: EventMetadata {
                name: "Splitter".to_string(),
                transferable: true,
                ..EventMetadata::default()
            },
            recipients: recipients
                .into_iter()
                .map(|(address, share)| (address, share.to_string()))
                .collect(),
            init_amount: init_amount.to_string(),
        }
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A validated request, ready to execute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreationPlan {
    pub assets: Vec<AssetDescriptor>,
    /// Recipients in serial order, each with its share in basis points.
    pub recipients: Vec<(Address, u16)>,
    pub init_amount: Amount,
    pub metadata: EventMetadata,
}

impl CreationPlan {
    /// The asset the initial funding is drawn in.
    pub fn funding_asset(&self) -> &AssetDescriptor {
        &self.assets[0]
    }
}

/// Decode and validate `request` against the minimum initial amount.
pub fn validate(request: &CreateSplitterRequest, min_init_amount: Amount) -> Result<CreationPlan, SplitterError> {
    let decoded: Vec<(Address, u64)> = request
        .recipients
        .iter()
        .map(|(address, share)| Ok((*address, parse_share(share)?)))
        .collect::<Result<_, SplitterError>>()?;
    let init_amount: Amount = request.init_amount.parse()?;

    if decoded.is_empty() {
        return Err(ValidationError::EmptyRecipients.into());
    }
    let (addresses, names, paths) = (
        request.token_addresses.len(),
        request.token_names.len(),
        request.receiver_paths.len(),
    );
    if addresses == 0 || names == 0 || paths == 0 {
        return Err(ValidationError::EmptyAssets.into());
    }
    if addresses != names || names != paths {
        return Err(ValidationError::InvalidTokens { addresses, names, paths }.into());
    }

    let assets: Vec<AssetDescriptor> = request
        .token_addresses
        .iter()
        .zip(&request.token_names)
        .zip(&request.receiver_paths)
        .map(|((address, name), path)| AssetDescriptor::new(*address, name.clone(), path.clone()))
        .collect();
    let mut seen_paths = HashSet::new();
    let mut seen_ids = HashSet::new();
    for asset in &assets {
        if !seen_paths.insert(&asset.receiver_path) {
            return Err(ValidationError::DuplicateAsset(asset.receiver_path.to_string()).into());
        }
        if !seen_ids.insert(asset.asset_id()) {
            return Err(ValidationError::DuplicateAsset(asset.asset_id().to_string()).into());
        }
    }

    validate_shares(decoded.iter().map(|(_, bps)| *bps)).map_err(ValidationError::from)?;
    if init_amount < min_init_amount {
        return Err(ValidationError::InitAmountTooSmall {
            amount: init_amount,
            minimum: min_init_amount,
        }
        .into());
    }

    // Shares are validated to sum to 10000, so each fits in u16.
    let recipients = decoded
        .into_iter()
        .map(|(address, bps)| (address, bps as u16))
        .collect();
    Ok(CreationPlan {
        assets,
        recipients,
        init_amount,
        metadata: request.metadata.clone(),
    })
}
