use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdPrefix {
    Node,
    Edge,
}

impl IdPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Node => "node",
            IdPrefix::Edge => "edge",
        }
    }
}

/// Where id entropy comes from. `Random` draws a v4 UUID from the OS CSPRNG;
/// `Timestamped` uses a v7 UUID (millisecond timestamp plus random bits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Random,
    Timestamped,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IdGenerator {
    strategy: IdStrategy,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub fn new_id(&self, prefix: IdPrefix) -> String {
        let uuid = match self.strategy {
            IdStrategy::Random => Uuid::new_v4(),
            IdStrategy::Timestamped => Uuid::now_v7(),
        };
        format!("{}-{}", prefix.as_str(), uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn ids_carry_their_prefix() {
        let ids = IdGenerator::default();
        assert!(ids.new_id(IdPrefix::Node).starts_with("node-"));
        assert!(ids.new_id(IdPrefix::Edge).starts_with("edge-"));
    }

    proptest! {
        #[test]
        fn ids_are_pairwise_distinct(count in 1usize..512, timestamped in any::<bool>()) {
            let strategy = if timestamped { IdStrategy::Timestamped } else { IdStrategy::Random };
            let ids = IdGenerator::new(strategy);
            let seen: HashSet<String> = (0..count).map(|_| ids.new_id(IdPrefix::Node)).collect();
            prop_assert_eq!(seen.len(), count);
        }
    }
}
