//! model — hierarchical character model on top of a primitive library.
//!
//! Purpose
//! -------
//! Represent a character *type* (strokes, sub-strokes, relations), sample it
//! from the library prior, score its continuous parameters differentiably,
//! and turn it into renderable *tokens* with a Bernoulli image likelihood.
//!
//! Key behaviors
//! -------------
//! - [`type_dist::TypeDistribution`]: prior sampling and per-stroke scoring
//!   with analytic gradients.
//! - [`character::CharacterType`]: owns every continuous parameter and
//!   exposes it to the optimizer through `ParameterOwner`.
//! - [`objective::PriorObjective`]: the type's prior log-probability as an
//!   ascent objective.
//! - [`token_dist::TokenSampler`] and [`image_dist::CharacterImageDist`]:
//!   token sampling, image sampling and exact image scoring.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stroke `i`'s relation refers only to strokes `< i`; stroke 0 is
//!   independent.
//! - Ids and sub-stroke counts are fixed once a type is built; only shapes,
//!   inverse scales and relation eval spots are continuous.
//!
//! Conventions
//! -----------
//! - Shapes are `[nsub, ncpt, 2]`, inverse scales `[nsub]`.
//! - Pixel-space sub-strokes are `(cpts − cpts[0]) · invscale`, chained end
//!   to start and anchored at the relation position.
//! - All errors are reported as [`errors::ModelError`].
pub mod character;
pub mod errors;
pub mod image_dist;
pub mod objective;
pub mod params;
pub mod relations;
pub mod token_dist;
pub mod type_dist;

pub mod prelude {
    pub use super::character::{CharacterToken, CharacterType, StrokePart};
    pub use super::errors::{ModelError, ModelResult};
    pub use super::image_dist::{BinaryImage, CharacterImageDist, ImageDistribution, neg_entropy};
    pub use super::objective::PriorObjective;
    pub use super::params::StrokeParams;
    pub use super::relations::Relation;
    pub use super::token_dist::{TokenParams, TokenSampler};
    pub use super::type_dist::TypeDistribution;
}
