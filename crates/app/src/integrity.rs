//! Association-integrity layer.
//!
//! Every catalog write passes through these components: references are
//! resolved by [`KeyResolver`], drafts become resolved graphs through
//! [`GraphAttacher`], store name collisions are translated by
//! [`collision`], profile command lists are checked by [`command_names`],
//! and deletes/renames are cleared by [`AssociationGuard`].
//!
//! None of them write. Checks are check-then-act: the store offers no
//! cross-document transactions, so a dependent created between a guard
//! check and the write it gates is not prevented, only detected.

pub mod attacher;
pub mod collision;
pub mod command_names;
pub mod guard;
pub mod resolver;

pub use attacher::GraphAttacher;
pub use guard::{AssociationGuard, Dependent, Guarded};
pub use resolver::KeyResolver;
