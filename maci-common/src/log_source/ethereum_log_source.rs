use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{BlockId, Filter, Log};
use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use slog::{Logger, debug};
use tokio::sync::RwLock;

use crate::StdResult;
use crate::entities::{
    BlockNumber, BlockRange, FieldElement, LogIndex, PollId, PollJoinedEvent, PublicKey,
    SignUpEvent, TreeDepth,
};
use crate::log_source::MaciLogSource;
use crate::logging::LoggerExtensions;

sol! {
    #[sol(rpc)]
    interface IMaci {
        struct PollContracts {
            address poll;
            address messageProcessor;
            address tally;
        }

        event SignUp(
            uint256 _stateIndex,
            uint256 _timestamp,
            uint256 indexed _userPublicKeyX,
            uint256 indexed _userPublicKeyY
        );

        function stateTreeDepth() external view returns (uint8);
        function getStateTreeRoot() external view returns (uint256);
        function getPoll(uint256 _pollId) external view returns (PollContracts memory);
    }

    #[sol(rpc)]
    interface IPoll {
        event PollJoined(
            uint256 indexed _pollPublicKeyX,
            uint256 indexed _pollPublicKeyY,
            uint256 _voiceCreditBalance,
            uint256 _timestamp,
            uint256 _nullifier,
            uint256 _pollStateIndex
        );
    }
}

/// Addresses of the already resolved polls, a deployed poll never moves.
#[derive(Default)]
struct PollAddressCache {
    addresses: RwLock<HashMap<PollId, Address>>,
}

impl PollAddressCache {
    async fn get_or_resolve<F, Fut>(&self, poll_id: PollId, resolve: F) -> StdResult<Address>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StdResult<Address>>,
    {
        if let Some(address) = self.addresses.read().await.get(&poll_id) {
            return Ok(*address);
        }

        let address = resolve().await?;
        self.addresses.write().await.insert(poll_id, address);

        Ok(address)
    }
}

/// [MaciLogSource] reading a MACI contract through an EVM JSON-RPC endpoint.
pub struct EthereumMaciLogSource {
    provider: DynProvider,
    maci_address: Address,
    poll_addresses: PollAddressCache,
    logger: Logger,
}

impl EthereumMaciLogSource {
    /// Connect to the JSON-RPC endpoint at `rpc_url`, no request is sent yet
    pub fn try_new(rpc_url: &str, maci_address: &str, logger: Logger) -> StdResult<Self> {
        let url = rpc_url
            .parse::<Url>()
            .with_context(|| format!("Invalid JSON-RPC url: '{rpc_url}'"))?;
        let maci_address = maci_address
            .parse::<Address>()
            .with_context(|| format!("Invalid MACI contract address: '{maci_address}'"))?;

        Ok(Self {
            provider: DynProvider::new(ProviderBuilder::new().connect_http(url)),
            maci_address,
            poll_addresses: PollAddressCache::default(),
            logger: logger.new_with_component_name::<Self>(),
        })
    }

    async fn get_poll_address(&self, poll_id: PollId) -> StdResult<Address> {
        self.poll_addresses
            .get_or_resolve(poll_id, || async {
                let maci = IMaci::new(self.maci_address, &self.provider);
                let contracts = maci
                    .getPoll(U256::from(u64::from(poll_id)))
                    .call()
                    .await
                    .with_context(|| format!("Could not read the contracts of poll {poll_id}"))?;
                debug!(
                    self.logger, "Poll address resolved";
                    "poll_id" => %poll_id, "address" => %contracts.poll
                );

                Ok(contracts.poll)
            })
            .await
    }

    async fn get_logs<E: SolEvent>(
        &self,
        address: Address,
        range: BlockRange,
    ) -> StdResult<Vec<Log>> {
        let filter = Filter::new()
            .address(address)
            .event_signature(E::SIGNATURE_HASH)
            .from_block(range.start)
            .to_block(range.end);
        let mut logs = self
            .provider
            .get_logs(&filter)
            .await
            .with_context(|| {
                format!("Could not read '{}' logs in window {range}", E::SIGNATURE)
            })?;
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        debug!(self.logger, "Read {} '{}' logs", logs.len(), E::SIGNATURE; "window" => %range);

        Ok(logs)
    }
}

fn field_element(value: U256) -> StdResult<FieldElement> {
    Ok(FieldElement::try_from_be_bytes(&value.to_be_bytes::<32>())?)
}

fn to_u64(value: U256, name: &str) -> StdResult<u64> {
    u64::try_from(value).map_err(|_| anyhow!("'{name}' value {value} does not fit in 64 bits"))
}

fn chain_position(log: &Log) -> StdResult<(BlockNumber, LogIndex)> {
    match (log.block_number, log.log_index) {
        (Some(block_number), Some(log_index)) => Ok((block_number, log_index)),
        _ => Err(anyhow!("Log without block number or log index, is it still pending?")),
    }
}

#[async_trait]
impl MaciLogSource for EthereumMaciLogSource {
    async fn get_current_block_number(&self) -> StdResult<BlockNumber> {
        self.provider
            .get_block_number()
            .await
            .with_context(|| "Could not read the current block number")
    }

    async fn get_signup_events(&self, range: BlockRange) -> StdResult<Vec<SignUpEvent>> {
        let logs = self.get_logs::<IMaci::SignUp>(self.maci_address, range).await?;

        logs.iter()
            .map(|log| {
                let decoded = log
                    .log_decode::<IMaci::SignUp>()
                    .with_context(|| "Could not decode a 'SignUp' log")?;
                let (block_number, log_index) = chain_position(log)?;
                let event = &decoded.inner;

                Ok(SignUpEvent::new(
                    PublicKey::new(
                        field_element(event._userPublicKeyX)?,
                        field_element(event._userPublicKeyY)?,
                    ),
                    to_u64(event._stateIndex, "_stateIndex")?,
                    to_u64(event._timestamp, "_timestamp")?,
                    block_number,
                    log_index,
                ))
            })
            .collect()
    }

    async fn get_poll_joined_events(
        &self,
        poll_id: PollId,
        range: BlockRange,
    ) -> StdResult<Vec<PollJoinedEvent>> {
        let poll_address = self.get_poll_address(poll_id).await?;
        let logs = self.get_logs::<IPoll::PollJoined>(poll_address, range).await?;

        logs.iter()
            .map(|log| {
                let decoded = log
                    .log_decode::<IPoll::PollJoined>()
                    .with_context(|| "Could not decode a 'PollJoined' log")?;
                let (block_number, log_index) = chain_position(log)?;
                let event = &decoded.inner;

                Ok(PollJoinedEvent {
                    poll_public_key: PublicKey::new(
                        field_element(event._pollPublicKeyX)?,
                        field_element(event._pollPublicKeyY)?,
                    ),
                    voice_credit_balance: field_element(event._voiceCreditBalance)?,
                    timestamp: to_u64(event._timestamp, "_timestamp")?,
                    nullifier: field_element(event._nullifier)?,
                    poll_state_index: to_u64(event._pollStateIndex, "_pollStateIndex")?,
                    block_number,
                    log_index,
                })
            })
            .collect()
    }

    async fn get_state_tree_depth(&self) -> StdResult<TreeDepth> {
        let maci = IMaci::new(self.maci_address, &self.provider);

        maci.stateTreeDepth()
            .call()
            .await
            .with_context(|| "Could not read the state tree depth")
    }

    async fn get_state_tree_root(&self, block_number: BlockNumber) -> StdResult<FieldElement> {
        let maci = IMaci::new(self.maci_address, &self.provider);
        let root = maci
            .getStateTreeRoot()
            .block(BlockId::number(block_number))
            .call()
            .await
            .with_context(|| {
                format!("Could not read the state tree root at block {block_number}")
            })?;

        field_element(root)
    }
}
