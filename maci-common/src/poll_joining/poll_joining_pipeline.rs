use std::path::PathBuf;
use std::sync::Arc;

use slog::{Logger, debug, info};
use thiserror::Error;

use crate::StdResult;
use crate::entities::{BlockNumber, FieldElement, PollId, PublicKey, StateIndex, TreeDepth};
use crate::event_fetcher::{EventBatchFetcher, EventFetcherConfig, FetchRequest};
use crate::local_state::LocalMaciState;
use crate::log_source::MaciLogSource;
use crate::logging::LoggerExtensions;
use crate::state_builder::{SignUpTree, SignUpTreeBuilder, SignUpTreeBuilderConfig};
use crate::witness::{
    PollJoiningWitness, PollJoiningWitnessDeriver, PollJoiningWitnessRequest, compute_nullifier,
};

/// [PollJoiningPipeline] related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PollJoiningError {
    /// The nullifier of the user was already used in the poll.
    #[error("the user already joined poll {poll_id} (nullifier {nullifier})")]
    AlreadyJoined {
        /// The poll
        poll_id: PollId,
        /// Nullifier of the user in the poll
        nullifier: FieldElement,
    },
}

/// Where the sign-up state is rebuilt from.
pub enum StateSource {
    /// Replay the sign-up logs of the chain
    Chain {
        /// Log source of the MACI contract
        log_source: Arc<dyn MaciLogSource>,
        /// First block to read
        from_block: BlockNumber,
        /// Last block to read, the chain head if not set
        end_block: Option<BlockNumber>,
        /// Stop the replay at the sign-up of the user instead of reading the whole range
        stop_at_user_sign_up: bool,
        /// Compare the rebuilt root with the contract one at the last read block, ignored when
        /// stopping early
        check_state_root: bool,
    },

    /// Load a state written by a previous local state generation
    StateFile(PathBuf),
}

/// A user asking for its poll joining circuit inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollJoiningRequest {
    /// Public key the user signed up with
    pub user_public_key: PublicKey,

    /// Circuit encoded private key of the user
    pub private_key: FieldElement,

    /// Key the user will vote with in the poll
    pub poll_public_key: PublicKey,

    /// The poll to join
    pub poll_id: PollId,

    /// Known state index of the user, skips the lookup by public key
    pub state_index: Option<StateIndex>,
}

/// Rebuild the sign-up state, locate the user and derive its poll joining witness.
pub struct PollJoiningPipeline {
    fetcher_config: EventFetcherConfig,
    logger: Logger,
}

impl PollJoiningPipeline {
    /// PollJoiningPipeline factory
    pub fn new(fetcher_config: EventFetcherConfig, logger: Logger) -> Self {
        Self {
            fetcher_config,
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    /// Derive the circuit inputs of `request` from the given state source
    pub async fn derive_inputs(
        &self,
        request: &PollJoiningRequest,
        source: StateSource,
    ) -> StdResult<PollJoiningWitness> {
        let (signup_tree, state_tree_depth) = match source {
            StateSource::Chain {
                log_source,
                from_block,
                end_block,
                stop_at_user_sign_up,
                check_state_root,
            } => {
                let fetch_request = FetchRequest {
                    from_block,
                    end_block,
                };
                self.state_from_chain(
                    log_source,
                    request,
                    fetch_request,
                    stop_at_user_sign_up,
                    check_state_root,
                )
                .await?
            }
            StateSource::StateFile(path) => {
                info!(self.logger, "Loading the local state"; "path" => %path.display());
                let state = LocalMaciState::load(&path)?;
                let nullifier = compute_nullifier(&request.private_key, request.poll_id)?;
                if state.has_joined(request.poll_id, &nullifier) {
                    return Err(PollJoiningError::AlreadyJoined {
                        poll_id: request.poll_id,
                        nullifier,
                    }
                    .into());
                }

                (state.signup_tree()?, state.state_tree_depth)
            }
        };

        let state_index = match request.state_index {
            Some(state_index) => state_index,
            None => signup_tree.state_index_of(&request.user_public_key)?,
        };
        debug!(self.logger, "User located in the state tree"; "state_index" => state_index);

        PollJoiningWitnessDeriver::new(self.logger.clone()).derive(
            signup_tree.tree(),
            &PollJoiningWitnessRequest {
                state_tree_depth,
                state_index,
                private_key: request.private_key,
                poll_public_key: request.poll_public_key,
                poll_id: request.poll_id,
            },
        )
    }

    async fn state_from_chain(
        &self,
        log_source: Arc<dyn MaciLogSource>,
        request: &PollJoiningRequest,
        fetch_request: FetchRequest,
        stop_at_user_sign_up: bool,
        check_state_root: bool,
    ) -> StdResult<(SignUpTree, TreeDepth)> {
        let fetcher = EventBatchFetcher::new(
            log_source.clone(),
            self.fetcher_config.clone(),
            self.logger.clone(),
        );

        let (fetched, builder_config) = if stop_at_user_sign_up {
            let fetched = fetcher
                .fetch_signups_until(fetch_request, &request.user_public_key)
                .await?;
            let builder_config = SignUpTreeBuilderConfig {
                target_key: Some(request.user_public_key),
                expected_root: None,
            };
            (fetched, builder_config)
        } else {
            let fetched = fetcher.fetch_signups(fetch_request).await?;
            let expected_root = if check_state_root {
                Some(
                    log_source
                        .get_state_tree_root(fetched.fetched_range.end)
                        .await?,
                )
            } else {
                None
            };
            let builder_config = SignUpTreeBuilderConfig {
                target_key: None,
                expected_root,
            };
            (fetched, builder_config)
        };

        let signup_tree =
            SignUpTreeBuilder::new(builder_config, self.logger.clone()).build(&fetched.events)?;
        let state_tree_depth = log_source.get_state_tree_depth().await?;

        Ok((signup_tree, state_tree_depth))
    }
}

#[cfg(test)]
mod tests {
    use crate::local_state::{LocalStateGenerator, LocalStateRequest};
    use crate::log_source::FakeMaciLogSource;
    use crate::state_builder::StateBuilderError;
    use crate::test_utils::{TempDir, TestLogger, fake_data};

    use super::*;

    const STATE_TREE_DEPTH: TreeDepth = 10;

    fn pipeline() -> PollJoiningPipeline {
        PollJoiningPipeline::new(EventFetcherConfig::default(), TestLogger::stdout())
    }

    fn user_request(seed: u64, poll_id: PollId) -> PollJoiningRequest {
        PollJoiningRequest {
            user_public_key: fake_data::public_key(seed),
            private_key: fake_data::private_key(seed),
            poll_public_key: fake_data::public_key(seed + 100),
            poll_id,
            state_index: None,
        }
    }

    fn chain_source(log_source: FakeMaciLogSource, stop_at_user_sign_up: bool) -> StateSource {
        StateSource::Chain {
            log_source: Arc::new(log_source),
            from_block: 0,
            end_block: None,
            stop_at_user_sign_up,
            check_state_root: true,
        }
    }

    fn log_source_with_signups(blocks: &[BlockNumber]) -> FakeMaciLogSource {
        FakeMaciLogSource::new(300, STATE_TREE_DEPTH)
            .with_signup_events(fake_data::signup_events(blocks))
    }

    #[tokio::test]
    async fn derive_inputs_from_the_chain() {
        let log_source = log_source_with_signups(&[10, 20, 90, 150]);

        let witness = pipeline()
            .derive_inputs(&user_request(3, PollId::new(0)), chain_source(log_source, false))
            .await
            .unwrap();

        assert_eq!(STATE_TREE_DEPTH as usize, witness.indices.len());
        assert_eq!(vec![1, 1, 0], witness.indices[..3].to_vec());
        assert_eq!(3, witness.actual_state_tree_depth);
        assert_eq!(
            compute_nullifier(&fake_data::private_key(3), PollId::new(0)).unwrap(),
            witness.nullifier
        );
    }

    #[tokio::test]
    async fn stop_at_the_user_sign_up_derives_against_the_state_at_that_point() {
        let log_source = log_source_with_signups(&[10, 20, 90, 150, 160]);

        let witness = pipeline()
            .derive_inputs(&user_request(2, PollId::new(0)), chain_source(log_source, true))
            .await
            .unwrap();

        let expected_tree = SignUpTree::from_public_keys(&[
            crate::crypto_helper::pad_key().unwrap(),
            fake_data::public_key(1),
            fake_data::public_key(2),
        ])
        .unwrap();
        assert_eq!(expected_tree.root(), witness.state_root);
        assert_eq!(2, witness.actual_state_tree_depth);
    }

    #[tokio::test]
    async fn check_the_root_at_the_end_block_when_it_is_behind_the_head() {
        let log_source = log_source_with_signups(&[10, 20, 250]);
        let source = StateSource::Chain {
            log_source: Arc::new(log_source),
            from_block: 0,
            end_block: Some(100),
            stop_at_user_sign_up: false,
            check_state_root: true,
        };

        let witness = pipeline()
            .derive_inputs(&user_request(2, PollId::new(0)), source)
            .await
            .unwrap();

        let expected_tree = SignUpTree::from_public_keys(&[
            crate::crypto_helper::pad_key().unwrap(),
            fake_data::public_key(1),
            fake_data::public_key(2),
        ])
        .unwrap();
        assert_eq!(expected_tree.root(), witness.state_root);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let log_source = log_source_with_signups(&[10, 20]);

        let error = pipeline()
            .derive_inputs(&user_request(9, PollId::new(0)), chain_source(log_source, false))
            .await
            .expect_err("user 9 never signed up");

        assert_eq!(
            Some(&StateBuilderError::PublicKeyNotFound(fake_data::public_key(9))),
            error.downcast_ref::<StateBuilderError>()
        );
    }

    #[tokio::test]
    async fn explicit_state_index_skips_the_lookup() {
        let log_source = log_source_with_signups(&[10, 20, 30]);
        let request = PollJoiningRequest {
            state_index: Some(1),
            ..user_request(3, PollId::new(0))
        };

        let witness = pipeline()
            .derive_inputs(&request, chain_source(log_source, false))
            .await
            .unwrap();

        assert_eq!(vec![1, 0], witness.indices[..2].to_vec());
    }

    #[tokio::test]
    async fn derive_inputs_from_a_state_file_like_from_the_chain() {
        let poll_id = PollId::new(1);
        let path = TempDir::create("poll_joining_pipeline", "derive_inputs_from_a_state_file")
            .join("state.json");
        let generated = LocalStateGenerator::new(
            Arc::new(log_source_with_signups(&[10, 20, 90])),
            EventFetcherConfig::default(),
            TestLogger::stdout(),
        )
        .generate(&LocalStateRequest {
            poll_id,
            from_block: 0,
            end_block: None,
            check_state_root: true,
        })
        .await
        .unwrap();
        generated.state.save(&path).unwrap();

        let from_file = pipeline()
            .derive_inputs(&user_request(2, poll_id), StateSource::StateFile(path))
            .await
            .unwrap();
        let from_chain = pipeline()
            .derive_inputs(
                &user_request(2, poll_id),
                chain_source(log_source_with_signups(&[10, 20, 90]), false),
            )
            .await
            .unwrap();

        assert_eq!(from_chain, from_file);
    }

    #[tokio::test]
    async fn reject_a_user_that_already_joined_the_poll() {
        let poll_id = PollId::new(1);
        let nullifier = compute_nullifier(&fake_data::private_key(2), poll_id).unwrap();
        let log_source = log_source_with_signups(&[10, 20]).with_poll_joined_events(
            poll_id,
            vec![fake_data::poll_joined_event(
                fake_data::public_key(102),
                nullifier,
                1,
                25,
            )],
        );
        let path = TempDir::create("poll_joining_pipeline", "reject_already_joined")
            .join("state.json");
        LocalStateGenerator::new(
            Arc::new(log_source),
            EventFetcherConfig::default(),
            TestLogger::stdout(),
        )
        .generate(&LocalStateRequest {
            poll_id,
            from_block: 0,
            end_block: None,
            check_state_root: false,
        })
        .await
        .unwrap()
        .state
        .save(&path)
        .unwrap();

        let error = pipeline()
            .derive_inputs(&user_request(2, poll_id), StateSource::StateFile(path))
            .await
            .expect_err("user 2 already joined poll 1");

        assert_eq!(
            Some(&PollJoiningError::AlreadyJoined { poll_id, nullifier }),
            error.downcast_ref::<PollJoiningError>()
        );
    }
}
