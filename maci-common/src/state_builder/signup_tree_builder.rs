use slog::{Logger, debug, info, warn};

use crate::StdResult;
use crate::entities::{FieldElement, PublicKey, SignUpEvent};
use crate::logging::LoggerExtensions;
use crate::state_builder::SignUpTree;

/// Options of a [SignUpTreeBuilder] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpTreeBuilderConfig {
    /// Stop right after inserting the sign-up of this key
    pub target_key: Option<PublicKey>,

    /// Root the built tree must have
    pub expected_root: Option<FieldElement>,
}

/// Replay sign-up events into a [SignUpTree].
///
/// Events are inserted in the order they are given, which must be the chain order.
/// With a target key the replay halts right after its sign-up, the tree then reflects the
/// state at that sign-up and an expected root must be the root at that point.
pub struct SignUpTreeBuilder {
    config: SignUpTreeBuilderConfig,
    logger: Logger,
}

impl SignUpTreeBuilder {
    /// SignUpTreeBuilder factory
    pub fn new(config: SignUpTreeBuilderConfig, logger: Logger) -> Self {
        Self {
            config,
            logger: logger.new_with_component_name::<Self>(),
        }
    }

    /// Build the tree from the ordered sign-up events
    pub fn build(&self, events: &[SignUpEvent]) -> StdResult<SignUpTree> {
        let mut signup_tree = SignUpTree::new()?;

        for event in events {
            let state_index = signup_tree.sign_up(event.public_key)?;
            if state_index != event.state_index {
                warn!(
                    self.logger, "A sign-up is missing, the leaf index differs";
                    "leaf_index" => state_index, "reported_state_index" => event.state_index
                );
            }

            if self.config.target_key.as_ref() == Some(&event.public_key) {
                debug!(self.logger, "Target key found, stop replay"; "state_index" => state_index);
                break;
            }
        }

        info!(
            self.logger, "Sign-up tree built";
            "leaves" => signup_tree.total_leaves(), "root" => %signup_tree.root()
        );

        if let Some(expected_root) = &self.config.expected_root {
            signup_tree.check_root(expected_root)?;
        }

        Ok(signup_tree)
    }
}

#[cfg(test)]
mod tests {
    use crate::state_builder::StateBuilderError;
    use crate::test_utils::{TempDir, TestLogger, fake_data};

    use super::*;

    fn build(config: SignUpTreeBuilderConfig, events: &[SignUpEvent]) -> StdResult<SignUpTree> {
        SignUpTreeBuilder::new(config, TestLogger::stdout()).build(events)
    }

    #[test]
    fn signups_get_their_leaf_in_chain_order() {
        let key_1 = fake_data::public_key(1);
        let key_2 = fake_data::public_key(2);
        let events = vec![
            fake_data::signup_event(key_1, 1, 10),
            fake_data::signup_event(key_2, 2, 20),
        ];

        let signup_tree = build(SignUpTreeBuilderConfig::default(), &events).unwrap();

        assert_eq!(Ok(1), signup_tree.state_index_of(&key_1));
        assert_eq!(Ok(2), signup_tree.state_index_of(&key_2));
        assert_eq!(3, signup_tree.total_leaves());
    }

    #[test]
    fn building_twice_yields_identical_trees() {
        let events = fake_data::signup_events(&[1, 2, 2, 5, 9, 9, 13]);

        let first = build(SignUpTreeBuilderConfig::default(), &events).unwrap();
        let second = build(SignUpTreeBuilderConfig::default(), &events).unwrap();

        assert_eq!(first.root(), second.root());
        assert_eq!(first.tree().leaves(), second.tree().leaves());
        assert_eq!(first.public_keys(), second.public_keys());
    }

    #[test]
    fn out_of_order_events_yield_another_root() {
        let events = fake_data::signup_events(&[1, 2, 3, 4]);
        let mut swapped = events.clone();
        swapped.swap(1, 2);

        let ordered = build(SignUpTreeBuilderConfig::default(), &events).unwrap();
        let unordered = build(SignUpTreeBuilderConfig::default(), &swapped).unwrap();

        assert_ne!(ordered.root(), unordered.root());
    }

    #[test]
    fn stop_right_after_the_target_key() {
        let events = fake_data::signup_events(&[1, 2, 3, 4, 5, 6]);
        let k = 3;
        let config = SignUpTreeBuilderConfig {
            target_key: Some(events[k - 1].public_key),
            expected_root: None,
        };

        let signup_tree = build(config, &events).unwrap();

        assert_eq!(k + 1, signup_tree.total_leaves());
        assert_eq!(k + 1, signup_tree.public_keys().len());
        assert_eq!(Ok(k as u64), signup_tree.state_index_of(&events[k - 1].public_key));
    }

    #[test]
    fn consume_every_event_when_the_target_key_is_absent() {
        let events = fake_data::signup_events(&[1, 2, 3]);
        let config = SignUpTreeBuilderConfig {
            target_key: Some(fake_data::public_key(999)),
            expected_root: None,
        };

        let signup_tree = build(config, &events).unwrap();

        assert_eq!(events.len() + 1, signup_tree.total_leaves());
    }

    #[test]
    fn accept_the_expected_root() {
        let events = fake_data::signup_events(&[1, 2, 3]);
        let root = build(SignUpTreeBuilderConfig::default(), &events)
            .unwrap()
            .root();
        let config = SignUpTreeBuilderConfig {
            target_key: None,
            expected_root: Some(root),
        };

        build(config, &events).expect("root should match");
    }

    #[test]
    fn fail_on_root_mismatch() {
        let events = fake_data::signup_events(&[1, 2, 3]);
        let actual = build(SignUpTreeBuilderConfig::default(), &events)
            .unwrap()
            .root();
        let expected = FieldElement::from(77);
        let config = SignUpTreeBuilderConfig {
            target_key: None,
            expected_root: Some(expected),
        };

        let error = build(config, &events).expect_err("root should not match");

        assert_eq!(
            Some(&StateBuilderError::RootMismatch { expected, actual }),
            error.downcast_ref::<StateBuilderError>()
        );
    }

    #[test]
    fn warn_when_a_sign_up_is_missing_before_the_replayed_ones() {
        let log_path = TempDir::create("signup_tree_builder", "warn_when_a_sign_up_is_missing")
            .join("test.log");
        // sign-ups of state indexes 1 and 2 were emitted before the replayed range
        let events = vec![fake_data::signup_event(fake_data::public_key(3), 3, 30)];
        {
            let logger = TestLogger::file(&log_path);
            SignUpTreeBuilder::new(SignUpTreeBuilderConfig::default(), logger)
                .build(&events)
                .unwrap();
        }

        let logs = std::fs::read_to_string(&log_path).unwrap();
        assert!(
            logs.contains("WARN") && logs.contains("reported_state_index: 3"),
            "logs should warn about the state index gap, logs:\n{logs}"
        );
    }
}
