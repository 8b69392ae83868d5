//! Boilerplate and domain-generic phrases excluded from keyword results.

use paperpulse_core::Conference;

/// Generic phrases dropped for every conference.
pub const GLOBAL_BLACKLIST: &[&str] = &[
    "language model",
    "large language",
    "time series",
    "diffusion model",
    "point cloud",
    "radiance field",
    "neural network",
    "learning representation",
    "foundation model",
    "offline reinforcement",
    "graph neural",
    "generative model",
    "deep reinforcement",
    "gradient descent",
    "gradient policy",
    "vision language",
    "anomaly detection",
];

const CVPR: &[&str] = &["a single", "a large-scale", "a unified", "single image"];

const ICLR: &[&str] = &[
    "a simple",
    "a general",
    "the role",
    "and efficient",
    "an efficient",
];

const ICML: &[&str] = &["a simple", "a single", "a unified", "differentially private"];

const KDD: &[&str] = &[
    "a fast",
    "a novel",
    "an efficient",
    "fast and",
    "and accurate",
    "fast and accurate",
    "a survey",
    "efficient and",
    "large scale",
    "case study",
    "and efficient",
    "and interpretable",
    "learning framework",
    "novel approach",
];

/// Boilerplate phrases specific to one conference. Conferences outside the
/// built-in set have none.
pub fn conference_blacklist(conference: &Conference) -> &'static [&'static str] {
    match conference {
        Conference::Cvpr => CVPR,
        Conference::Iclr => ICLR,
        Conference::Icml => ICML,
        Conference::Kdd => KDD,
        Conference::Other(_) => &[],
    }
}

/// Whether a canonical phrase survives filtering for `conference`: at least
/// two whitespace-separated words and on neither blacklist.
pub fn is_informative(phrase: &str, conference: &Conference) -> bool {
    phrase.split_whitespace().count() >= 2
        && !GLOBAL_BLACKLIST.contains(&phrase)
        && !conference_blacklist(conference).contains(&phrase)
}
