//! The supported verification tasks and the pipelines that verify them.

use crate::{
    coherence::{map_filter, reco_filter},
    config::VerifierConfig,
    evaluation::DimensionMap,
    handlers::{infreco::InfrecoCheck, Handler},
    request::DataFilter,
    Error,
};
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Arganno,
    Argmap,
    Infreco,
    Logreco,
    ArgannoArgmap,
    ArgannoInfreco,
    ArgannoLogreco,
    ArgmapInfreco,
    ArgmapLogreco,
    ArgannoArgmapLogreco,
}

impl Suite {
    pub const ALL: [Suite; 10] = [
        Suite::Arganno,
        Suite::Argmap,
        Suite::Infreco,
        Suite::Logreco,
        Suite::ArgannoArgmap,
        Suite::ArgannoInfreco,
        Suite::ArgannoLogreco,
        Suite::ArgmapInfreco,
        Suite::ArgmapLogreco,
        Suite::ArgannoArgmapLogreco,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Suite::Arganno => "arganno",
            Suite::Argmap => "argmap",
            Suite::Infreco => "infreco",
            Suite::Logreco => "logreco",
            Suite::ArgannoArgmap => "arganno-argmap",
            Suite::ArgannoInfreco => "arganno-infreco",
            Suite::ArgannoLogreco => "arganno-logreco",
            Suite::ArgmapInfreco => "argmap-infreco",
            Suite::ArgmapLogreco => "argmap-logreco",
            Suite::ArgannoArgmapLogreco => "arganno-argmap-logreco",
        }
    }

    /// How the results of this suite are rolled up into metrics.
    pub fn dimensions(self) -> DimensionMap {
        match self {
            Suite::Infreco => DimensionMap::infreco(),
            Suite::Logreco => DimensionMap::logreco(),
            _ => DimensionMap::new(),
        }
    }

    /// The full pipeline: processing, content checks, structural checks, then coherence.
    pub fn handler(self, config: &VerifierConfig) -> Handler {
        let config = Arc::new(config.clone());
        let any = DataFilter::Any;
        let (map, reco) = (map_filter(), reco_filter());
        let logical = &InfrecoCheck::LOGRECO_SUITE;
        let paired = &InfrecoCheck::COHERENCE_SUITE;
        let whole_map = &InfrecoCheck::MAP_COHERENCE_SUITE;

        let stages = match self {
            Suite::Arganno => vec![
                Handler::has_annotations(&config, any.clone()),
                Handler::arganno(&config, any),
            ],
            Suite::Argmap => vec![
                Handler::has_argdown(&config, any.clone()),
                Handler::argmap(&config, any),
            ],
            Suite::Infreco => vec![
                Handler::has_argdown(&config, any.clone()),
                Handler::infreco(&config, any),
            ],
            Suite::Logreco => vec![
                Handler::has_argdown(&config, any.clone()),
                Handler::infreco_with(&config, any.clone(), logical),
                Handler::logreco(&config, any),
            ],
            Suite::ArgannoArgmap => vec![
                Handler::has_annotations(&config, any.clone()),
                Handler::has_argdown(&config, any.clone()),
                Handler::arganno(&config, any.clone()),
                Handler::argmap(&config, any.clone()),
                Handler::arganno_argmap(&config, any.clone(), any),
            ],
            Suite::ArgannoInfreco => vec![
                Handler::has_annotations(&config, any.clone()),
                Handler::has_argdown(&config, any.clone()),
                Handler::arganno(&config, any.clone()),
                Handler::infreco_with(&config, any.clone(), paired),
                Handler::arganno_infreco(&config, any.clone(), any),
            ],
            Suite::ArgannoLogreco => vec![
                Handler::has_annotations(&config, any.clone()),
                Handler::has_argdown(&config, any.clone()),
                Handler::arganno(&config, any.clone()),
                Handler::infreco_with(&config, any.clone(), paired),
                Handler::logreco(&config, any.clone()),
                Handler::arganno_logreco(&config, any.clone(), any),
            ],
            Suite::ArgmapInfreco => vec![
                Handler::has_argdown_as(&config, "map", map.clone()),
                Handler::has_argdown_as(&config, "reco", reco.clone()),
                Handler::argmap(&config, map.clone()),
                Handler::infreco_with(&config, reco.clone(), paired),
                Handler::argmap_infreco(&config, map, reco),
            ],
            Suite::ArgmapLogreco => vec![
                Handler::has_argdown_as(&config, "map", map.clone()),
                Handler::has_argdown_as(&config, "reco", reco.clone()),
                Handler::argmap(&config, map.clone()),
                Handler::infreco_with(&config, reco.clone(), whole_map),
                Handler::logreco(&config, reco.clone()),
                Handler::argmap_infreco(&config, map.clone(), reco.clone()),
                Handler::argmap_logreco(&config, map, reco),
            ],
            Suite::ArgannoArgmapLogreco => vec![
                Handler::has_annotations(&config, any.clone()),
                Handler::has_argdown_as(&config, "map", map.clone()),
                Handler::has_argdown_as(&config, "reco", reco.clone()),
                Handler::arganno(&config, any.clone()),
                Handler::argmap(&config, map.clone()),
                Handler::infreco_with(&config, reco.clone(), whole_map),
                Handler::logreco(&config, reco.clone()),
                Handler::arganno_argmap_logreco(&config, map, reco, any),
            ],
        };

        let mut pipeline = vec![Handler::processing()];
        pipeline.extend(stages);
        Handler::composite(&format!("{}.Pipeline", self.name()), pipeline)
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Suite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suite::ALL
            .into_iter()
            .find(|suite| suite.name() == s)
            .ok_or_else(|| Error::UnknownSuite(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        for suite in Suite::ALL {
            assert_eq!(suite.name().parse::<Suite>().unwrap(), suite);
        }
        assert!(matches!("argmap-xml".parse::<Suite>(), Err(Error::UnknownSuite(_))));
    }

    #[test]
    fn test_pipeline_order() {
        let handler = Suite::ArgmapLogreco.handler(&VerifierConfig::default());
        let leaves: Vec<_> = handler.leaves().into_iter().map(Handler::name).collect();
        assert_eq!(leaves[..3], ["FencedCodeBlockExtractor", "ArgdownParser", "XMLParser"]);
        assert_eq!(leaves[3..5], ["HasArgdownHandler.map", "HasArgdownHandler.reco"]);
        assert!(!leaves.contains(&"InfReco.HasUniqueArgumentHandler"));
        assert_eq!(leaves.last(), Some(&"ArgmapLogrecoRelationCohereHandler"));
    }
}
