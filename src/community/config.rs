//! Optimizer configuration.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How the next move is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selector {
    /// Move each node in sweep order to its best group; stop after a sweep with no move.
    #[default]
    Sequential,
    /// Perform only the single best move of a full scan, then rescan.
    Priority,
}

/// Whether the optimizer recurses on the aggregated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionMode {
    /// Local moving on the input graph only.
    Single,
    /// Aggregate and optimize again until nothing merges.
    #[default]
    Multiple,
}

/// Local-moving optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OptimizerConfig {
    /// Move selection strategy.
    pub selector: Selector,
    /// Single or multiple resolution.
    pub resolution_mode: ResolutionMode,
    /// Visit nodes in a uniformly random order on every sweep.
    pub shuffle: bool,
}

impl OptimizerConfig {
    /// Defaults: sequential selector, multiple resolution, no shuffle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Set the resolution mode.
    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.resolution_mode = mode;
        self
    }

    /// Enable or disable shuffling.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Apply one option.
    pub fn apply(&mut self, option: OptimizerOption) {
        match option {
            OptimizerOption::SequentialSelector => self.selector = Selector::Sequential,
            OptimizerOption::PrioritySelector => self.selector = Selector::Priority,
            OptimizerOption::SingleResolution => self.resolution_mode = ResolutionMode::Single,
            OptimizerOption::MultipleResolution => {
                self.resolution_mode = ResolutionMode::Multiple
            }
            OptimizerOption::Shuffle => self.shuffle = true,
            OptimizerOption::NoShuffle => self.shuffle = false,
        }
    }

    /// Defaults overridden by option tokens, left to right.
    ///
    /// Unknown tokens are ignored.
    pub fn from_options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for token in options {
            match token.as_ref().parse::<OptimizerOption>() {
                Ok(option) => config.apply(option),
                Err(err) => log::debug!("ignoring option: {err}"),
            }
        }
        config
    }
}

/// One textual optimizer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerOption {
    /// `"sequential selector"`
    SequentialSelector,
    /// `"priority selector"`
    PrioritySelector,
    /// `"single resolution"`
    SingleResolution,
    /// `"multiple resolution"`
    MultipleResolution,
    /// `"shuffle"`
    Shuffle,
    /// `"no shuffle"`
    NoShuffle,
}

impl OptimizerOption {
    /// The token this option parses from.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SequentialSelector => "sequential selector",
            Self::PrioritySelector => "priority selector",
            Self::SingleResolution => "single resolution",
            Self::MultipleResolution => "multiple resolution",
            Self::Shuffle => "shuffle",
            Self::NoShuffle => "no shuffle",
        }
    }
}

impl FromStr for OptimizerOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sequential selector" => Ok(Self::SequentialSelector),
            "priority selector" => Ok(Self::PrioritySelector),
            "single resolution" => Ok(Self::SingleResolution),
            "multiple resolution" => Ok(Self::MultipleResolution),
            "shuffle" => Ok(Self::Shuffle),
            "no shuffle" => Ok(Self::NoShuffle),
            other => Err(Error::UnknownOption(other.to_string())),
        }
    }
}

impl fmt::Display for OptimizerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = OptimizerConfig::default();
        assert_eq!(c.selector, Selector::Sequential);
        assert_eq!(c.resolution_mode, ResolutionMode::Multiple);
        assert!(!c.shuffle);
    }

    #[test]
    fn test_from_options_later_wins_and_unknown_ignored() {
        let c = OptimizerConfig::from_options([
            "priority selector",
            "shuffle",
            "bogus",
            "single resolution",
            "no shuffle",
        ]);
        assert_eq!(c.selector, Selector::Priority);
        assert_eq!(c.resolution_mode, ResolutionMode::Single);
        assert!(!c.shuffle);
    }

    #[test]
    fn test_option_tokens() {
        for opt in [
            OptimizerOption::SequentialSelector,
            OptimizerOption::PrioritySelector,
            OptimizerOption::SingleResolution,
            OptimizerOption::MultipleResolution,
            OptimizerOption::Shuffle,
            OptimizerOption::NoShuffle,
        ] {
            assert_eq!(opt.to_string().parse::<OptimizerOption>(), Ok(opt));
        }
        assert_eq!(
            "Shuffle".parse::<OptimizerOption>(),
            Err(Error::UnknownOption("Shuffle".into()))
        );
    }
}
